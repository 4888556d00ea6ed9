//! Post processing orchestration.
//!
//! A single linear run: validate -> load -> plan -> (dry-run |
//! execute -> rewrite -> publish -> report). Validation failures halt
//! before any mutation; per-file transcode failures never abort the
//! batch.

pub mod plan;
mod report;
mod validate;

pub use validate::ValidateError;

use crate::cli::Cli;
use crate::convert::{self, TranscodeConfig};
use crate::markdown::{self, ImageReference};
use crate::utils::path::expand_path;
use crate::utils::{format_size, plural_count};
use crate::{debug, log};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use plan::PostPlan;
use report::{FileOutcome, FileResult, RunStats};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything one run needs, resolved from the CLI.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub hugo_path: Option<PathBuf>,
    pub transcode: TranscodeConfig,
    pub dry_run: bool,
    /// Rename outputs to `img_NN` (true unless `--no-rename`).
    pub rename: bool,
    /// Print the statistics block (true unless `--no-stats`).
    pub stats: bool,
}

impl RunOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        let source_dir = expand_path(&cli.source);
        let output_dir = cli
            .output
            .as_ref()
            .map_or_else(|| source_dir.join("processed"), |p| expand_path(p));

        Self {
            source_dir,
            output_dir,
            hugo_path: cli.hugo_path.as_ref().map(|p| expand_path(p)),
            transcode: TranscodeConfig {
                max_dimension: cli.max_width,
                quality: cli.quality,
            },
            dry_run: cli.dry_run,
            rename: !cli.no_rename,
            stats: !cli.no_stats,
        }
    }
}

/// Process one post directory end to end.
pub fn process_post(options: &RunOptions) -> Result<()> {
    validate::validate_source_dir(&options.source_dir)?;

    let markdown_file = validate::find_markdown_file(&options.source_dir)
        .context("markdown file disappeared after validation")?;
    let markdown_name = markdown_file
        .file_name()
        .context("markdown path has no file name")?
        .to_owned();
    log!("post"; "processing `{}`", markdown_name.to_string_lossy());

    let content = fs::read_to_string(&markdown_file)
        .with_context(|| format!("failed to read `{}`", markdown_file.display()))?;

    let references = markdown::extract_image_references(&content);
    log!("post"; "found {}", plural_count(references.len(), "image reference"));

    let attachments_dir = options.source_dir.join(validate::ATTACHMENTS_DIR);
    let plan = plan::build_plan(&references, &attachments_dir, options.rename);

    if !plan.missing.is_empty() {
        log!("warning"; "{} referenced but missing", plural_count(plan.missing.len(), "file"));
    }
    if !plan.unused.is_empty() {
        log!("warning"; "{} unused", plural_count(plan.unused.len(), "attachment"));
    }

    if options.dry_run {
        report::print_dry_run(&plan, options);
        return Ok(());
    }

    fs::create_dir_all(&options.output_dir)
        .with_context(|| format!("failed to create `{}`", options.output_dir.display()))?;
    log!("post"; "output directory: `{}`", options.output_dir.display());

    let stats = execute_plan(&plan, options);

    // Rewrite every planned reference; unresolved ones stay untouched.
    let replacements: Vec<(&ImageReference, &str)> = plan
        .entries
        .iter()
        .map(|e| (&e.reference, e.output_name.as_str()))
        .collect();
    let rewritten = markdown::rewrite_references(&content, &replacements);

    let output_markdown = options.output_dir.join(&markdown_name);
    fs::write(&output_markdown, &rewritten)
        .with_context(|| format!("failed to write `{}`", output_markdown.display()))?;
    log!("post"; "markdown written: `{}`", output_markdown.display());

    if let Some(hugo_path) = &options.hugo_path {
        publish(&plan, &output_markdown, &options.output_dir, hugo_path)?;
    }

    if options.stats {
        report::print_stats(&plan, &stats, &attachments_dir);
    }

    log!("post"; "done");
    Ok(())
}

/// Transcode each planned file sequentially, printing per-file progress.
fn execute_plan(plan: &PostPlan, options: &RunOptions) -> RunStats {
    let mut stats = RunStats::default();

    for entry in &plan.entries {
        let source_name = entry
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let target = options.output_dir.join(&entry.output_name);
        debug!("convert"; "{} -> {}", entry.source.display(), entry.output_name);

        let outcome = match convert::transcode(&options.transcode, &entry.source, &target) {
            Ok(result) => {
                stats.total_original += result.original_size;
                stats.total_new += result.new_size;
                println!(
                    "{} {:<24} {:>9} {} {:>9}  ({}% saved)",
                    "✓".green(),
                    entry.output_name,
                    format_size(result.original_size),
                    "→".dimmed(),
                    format_size(result.new_size),
                    result.compression_percent()
                );
                FileOutcome::Converted(result)
            }
            Err(error) => {
                println!("{} {}: {error:#}", "✗".red(), source_name);
                FileOutcome::Failed(format!("{error:#}"))
            }
        };

        stats.results.push(FileResult {
            source_name,
            output_name: entry.output_name.clone(),
            outcome,
        });
    }

    stats
}

/// Copy the rewritten markdown and every produced image into the Hugo
/// content directory. Failed transcodes left no file and are skipped.
fn publish(
    plan: &PostPlan,
    output_markdown: &Path,
    output_dir: &Path,
    hugo_path: &Path,
) -> Result<()> {
    fs::create_dir_all(hugo_path)
        .with_context(|| format!("failed to create `{}`", hugo_path.display()))?;

    let markdown_name = output_markdown
        .file_name()
        .context("markdown path has no file name")?;
    fs::copy(output_markdown, hugo_path.join(markdown_name))
        .with_context(|| format!("failed to copy markdown to `{}`", hugo_path.display()))?;

    let mut copied = 1usize;
    for entry in &plan.entries {
        let produced = output_dir.join(&entry.output_name);
        if produced.exists() {
            fs::copy(&produced, hugo_path.join(&entry.output_name)).with_context(|| {
                format!("failed to copy `{}` to `{}`", entry.output_name, hugo_path.display())
            })?;
            copied += 1;
        }
    }

    log!("publish"; "copied {} to `{}`", plural_count(copied, "file"), hugo_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    /// Build a post directory with a markdown file and attachments.
    fn post_dir(markdown: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.md"), markdown).unwrap();
        fs::create_dir(dir.path().join(validate::ATTACHMENTS_DIR)).unwrap();
        dir
    }

    fn write_image(dir: &TempDir, name: &str, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 0])
        });
        img.save(dir.path().join(validate::ATTACHMENTS_DIR).join(name))
            .unwrap();
    }

    fn options_for(dir: &TempDir) -> RunOptions {
        RunOptions {
            source_dir: dir.path().to_path_buf(),
            output_dir: dir.path().join("processed"),
            hugo_path: None,
            transcode: TranscodeConfig {
                max_dimension: 100,
                quality: 80,
            },
            dry_run: false,
            rename: true,
            stats: false,
        }
    }

    #[test]
    fn test_validation_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.md"), "no attachments folder").unwrap();
        let options = RunOptions {
            source_dir: dir.path().to_path_buf(),
            output_dir: dir.path().join("processed"),
            hugo_path: None,
            transcode: TranscodeConfig {
                max_dimension: 1600,
                quality: 95,
            },
            dry_run: false,
            rename: true,
            stats: false,
        };
        assert!(process_post(&options).is_err());
        assert!(!options.output_dir.exists());
    }

    #[test]
    fn test_full_run_converts_and_rewrites() {
        let dir = post_dir(
            "# Trip\n\n![First](Attachments/photo.jpg)\n\n![Gone](Attachments/absent.png)\n",
        );
        // Extension mismatch on purpose: markdown says .jpg, disk has .jpeg.
        write_image(&dir, "photo.jpeg", 300, 200);

        let options = options_for(&dir);
        process_post(&options).unwrap();

        let output_image = options.output_dir.join("img_01.webp");
        assert!(output_image.exists());
        assert_eq!(image::image_dimensions(&output_image).unwrap(), (100, 67));

        let rewritten = fs::read_to_string(options.output_dir.join("index.md")).unwrap();
        assert!(rewritten.contains("![First](img_01.webp)"));
        // Unresolved references stay untouched.
        assert!(rewritten.contains("![Gone](Attachments/absent.png)"));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = post_dir("![x](Attachments/photo.png)\n");
        write_image(&dir, "photo.png", 50, 50);

        let mut options = options_for(&dir);
        options.dry_run = true;
        process_post(&options).unwrap();

        assert!(!options.output_dir.exists());
    }

    #[test]
    fn test_video_and_unknown_excluded_from_output() {
        let dir = post_dir(
            "![v](Attachments/clip.mp4)\n![n](Attachments/notes.txt)\n![p](Attachments/pic.png)\n",
        );
        let attachments = dir.path().join(validate::ATTACHMENTS_DIR);
        fs::write(attachments.join("clip.mp4"), b"not really a video").unwrap();
        fs::write(attachments.join("notes.txt"), b"text").unwrap();
        write_image(&dir, "pic.png", 40, 40);

        let options = options_for(&dir);
        process_post(&options).unwrap();

        // Only the image was planned; it kept its document position.
        assert!(options.output_dir.join("img_03.webp").exists());
        assert!(!options.output_dir.join("img_01.webp").exists());

        let rewritten = fs::read_to_string(options.output_dir.join("index.md")).unwrap();
        assert!(rewritten.contains("![p](img_03.webp)"));
        assert!(rewritten.contains("![v](Attachments/clip.mp4)"));
        assert!(rewritten.contains("![n](Attachments/notes.txt)"));
    }

    #[test]
    fn test_corrupt_image_does_not_abort_batch() {
        let dir = post_dir("![bad](Attachments/bad.jpg)\n![good](Attachments/good.png)\n");
        let attachments = dir.path().join(validate::ATTACHMENTS_DIR);
        fs::write(attachments.join("bad.jpg"), b"garbage bytes").unwrap();
        write_image(&dir, "good.png", 30, 30);

        let options = options_for(&dir);
        process_post(&options).unwrap();

        assert!(!options.output_dir.join("img_01.webp").exists());
        assert!(options.output_dir.join("img_02.webp").exists());
    }

    #[test]
    fn test_no_rename_uses_original_stem() {
        let dir = post_dir("![x](Attachments/sunset.png)\n");
        write_image(&dir, "sunset.png", 30, 30);

        let mut options = options_for(&dir);
        options.rename = false;
        process_post(&options).unwrap();

        assert!(options.output_dir.join("sunset.webp").exists());
        let rewritten = fs::read_to_string(options.output_dir.join("index.md")).unwrap();
        assert!(rewritten.contains("![x](sunset.webp)"));
    }

    #[test]
    fn test_publish_copies_artifacts() {
        let dir = post_dir("![x](Attachments/pic.png)\n");
        write_image(&dir, "pic.png", 30, 30);
        let hugo = TempDir::new().unwrap();

        let mut options = options_for(&dir);
        options.hugo_path = Some(hugo.path().join("posts/trip"));
        process_post(&options).unwrap();

        let target = hugo.path().join("posts/trip");
        assert!(target.join("index.md").exists());
        assert!(target.join("img_01.webp").exists());
    }
}
