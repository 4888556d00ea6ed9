//! Dry-run preview and end-of-run statistics.

use crate::convert::Transcode;
use crate::post::RunOptions;
use crate::post::plan::{PlanEntry, PostPlan};
use crate::utils::{format_size, plural_count, plural_s};
use owo_colors::OwoColorize;
use std::fs;
use std::path::Path;

/// Outcome of one transcode attempt.
#[derive(Debug)]
pub enum FileOutcome {
    Converted(Transcode),
    Failed(String),
}

/// Per-file result, kept for the statistics block.
#[derive(Debug)]
pub struct FileResult {
    pub source_name: String,
    pub output_name: String,
    pub outcome: FileOutcome,
}

/// Aggregated outcome of the execute phase.
#[derive(Debug, Default)]
pub struct RunStats {
    pub results: Vec<FileResult>,
    pub total_original: u64,
    pub total_new: u64,
}

impl RunStats {
    pub fn converted_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::Converted(_)))
            .count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::Failed(_)))
    }
}

/// Print the planned mapping and configuration without touching disk.
pub fn print_dry_run(plan: &PostPlan, options: &RunOptions) {
    println!();
    println!(
        "{}",
        "dry-run: preview only, nothing will be written".yellow().bold()
    );
    println!();

    for entry in &plan.entries {
        println!("{}", dry_run_line(entry));
    }

    println!();
    println!(
        "{} {}",
        "files to process:".dimmed(),
        plan.entries.len()
    );
    println!(
        "{} {}",
        "output directory:".dimmed(),
        options.output_dir.display()
    );
    println!("{} {}", "webp quality:".dimmed(), options.transcode.quality);
    println!(
        "{} {}px",
        "max dimension:".dimmed(),
        options.transcode.max_dimension
    );
    if let Some(hugo) = &options.hugo_path {
        println!("{} {}", "hugo path:".dimmed(), hugo.display());
    }
}

/// Print the statistics block: totals, savings, and the observation
/// lists collected during planning.
pub fn print_stats(plan: &PostPlan, stats: &RunStats, attachments_dir: &Path) {
    println!();
    println!("{}", "processing statistics".bold());
    println!(
        "converted {} of {}",
        stats.converted_count(),
        plural_count(plan.entries.len(), "file")
    );
    println!("size before: {}", format_size(stats.total_original));
    println!("size after:  {}", format_size(stats.total_new));

    if stats.total_original > 0 {
        let saved = stats.total_original.saturating_sub(stats.total_new);
        let percent = (1.0 - stats.total_new as f64 / stats.total_original as f64) * 100.0;
        println!("saved: {} ({percent:.1}%)", format_size(saved));
    }

    let failed: Vec<_> = stats.failed().collect();
    if !failed.is_empty() {
        print_header("failed conversions", failed.len());
        for result in failed {
            if let FileOutcome::Failed(error) = &result.outcome {
                println!("{} {}: {}", "→".red(), result.source_name, error);
            }
        }
    }

    if !plan.missing.is_empty() {
        print_header("referenced but missing", plan.missing.len());
        for name in &plan.missing {
            println!("{} {}", "→".red(), name);
        }
    }

    if !plan.unused.is_empty() {
        println!();
        println!(
            "{} {}",
            "unused attachments".yellow().bold(),
            format!(
                "({})",
                plural_count(plan.unused.len(), "file")
            )
            .dimmed()
        );
        for name in &plan.unused {
            let size = fs::metadata(attachments_dir.join(name))
                .map(|m| m.len())
                .unwrap_or(0);
            println!(
                "{} {:<40} {}",
                "→".yellow(),
                name,
                format!("({})", format_size(size)).dimmed()
            );
        }
    }

    if !plan.skipped_videos.is_empty() {
        print_header("skipped videos", plan.skipped_videos.len());
        for name in &plan.skipped_videos {
            println!("{} {}", "→".yellow(), name);
        }
    }

    if !plan.unknown_types.is_empty() {
        print_header("unknown file types", plan.unknown_types.len());
        for name in &plan.unknown_types {
            println!("{} {}", "→".yellow(), name);
        }
    }
}

/// One preview line: `NN  source → target`. The sequence index shown is
/// the one that drives `img_NN` numbering.
fn dry_run_line(entry: &PlanEntry) -> String {
    let source = entry
        .source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "{:>2}  {:<38} {} {}",
        entry.index,
        source,
        "→".dimmed(),
        entry.output_name
    )
}

fn print_header(name: &str, count: usize) {
    println!();
    println!(
        "{} {}",
        name.red().bold(),
        format!("({count} file{})", plural_s(count)).dimmed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::ImageReference;
    use std::path::PathBuf;

    #[test]
    fn test_dry_run_line_shows_sequence_index() {
        let entry = PlanEntry {
            source: PathBuf::from("Attachments/photo.jpeg"),
            output_name: "img_03.webp".to_string(),
            index: 3,
            reference: ImageReference {
                raw: "![p](Attachments/photo.jpg)".to_string(),
                alt: "p".to_string(),
                path: "Attachments/photo.jpg".to_string(),
            },
        };
        let line = dry_run_line(&entry);
        assert!(line.contains(" 3 "));
        assert!(line.contains("photo.jpeg"));
        assert!(line.contains("img_03.webp"));
    }

    #[test]
    fn test_run_stats_counts() {
        let mut stats = RunStats::default();
        stats.results.push(FileResult {
            source_name: "a.jpg".into(),
            output_name: "img_01.webp".into(),
            outcome: FileOutcome::Converted(Transcode {
                original_size: 100,
                new_size: 40,
            }),
        });
        stats.results.push(FileResult {
            source_name: "b.jpg".into(),
            output_name: "img_02.webp".into(),
            outcome: FileOutcome::Failed("decode error".into()),
        });

        assert_eq!(stats.converted_count(), 1);
        assert_eq!(stats.failed().count(), 1);
    }
}
