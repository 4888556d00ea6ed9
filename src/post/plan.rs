//! Processing plan construction.
//!
//! Walks the markdown references in document order, resolves each one
//! against the attachments folder, and classifies the outcome. The
//! 1-based position in the reference list drives `img_NN` numbering.

use crate::debug;
use crate::markdown::ImageReference;
use crate::resolve::{self, MediaType};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// One reference that resolved to a processable attachment.
#[derive(Debug, Clone)]
pub struct PlanEntry {
    /// Resolved source file on disk.
    pub source: PathBuf,
    /// Output filename, always `*.webp`, no directory component.
    pub output_name: String,
    /// 1-based position of the reference in the markdown.
    pub index: usize,
    /// The markdown reference this entry came from. Kept so rewriting
    /// pairs each entry with its own reference even when earlier
    /// references were skipped.
    pub reference: ImageReference,
}

/// The full plan plus everything observed while building it.
///
/// The classification lists are observations, not state: missing and
/// skipped names in document order, unused attachments sorted.
#[derive(Debug, Default)]
pub struct PostPlan {
    pub entries: Vec<PlanEntry>,
    /// Referenced in markdown, no matching attachment.
    pub missing: Vec<String>,
    /// Resolved to a video file, excluded from processing.
    pub skipped_videos: Vec<String>,
    /// Resolved to an unrecognized extension, excluded.
    pub unknown_types: Vec<String>,
    /// Present in attachments, never referenced.
    pub unused: Vec<String>,
}

/// Build the processing plan for one post.
pub fn build_plan(
    references: &[ImageReference],
    attachments_dir: &Path,
    rename: bool,
) -> PostPlan {
    let mut plan = PostPlan::default();
    let mut resolved_sources: BTreeSet<String> = BTreeSet::new();

    for (position, reference) in references.iter().enumerate() {
        let index = position + 1;
        let requested = requested_filename(&reference.path);

        let Some(source) = resolve::find_attachment(attachments_dir, &requested) else {
            debug!("plan"; "no attachment found for `{requested}`");
            plan.missing.push(requested);
            continue;
        };

        // Classify by the resolved file's real extension; it can
        // legitimately differ from the extension in markdown.
        match resolve::classify(&source) {
            Some(MediaType::Video) => {
                debug!("plan"; "skipping video `{requested}`");
                plan.skipped_videos.push(requested);
                continue;
            }
            None => {
                debug!("plan"; "unknown file type `{requested}`");
                plan.unknown_types.push(requested);
                continue;
            }
            Some(_) => {}
        }

        let output_name = if rename {
            format!("img_{index:02}.webp")
        } else {
            format!("{}.webp", requested_stem(&requested))
        };

        if let Some(name) = source.file_name() {
            resolved_sources.insert(name.to_string_lossy().into_owned());
        }
        debug!("plan"; "{} -> {}", source.display(), output_name);

        plan.entries.push(PlanEntry {
            source,
            output_name,
            index,
            reference: reference.clone(),
        });
    }

    // Attachments never referenced by any resolved link, sorted.
    plan.unused = resolve::sorted_files(attachments_dir)
        .into_iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .filter(|name| !resolved_sources.contains(name))
        .collect();

    plan
}

/// Last path component of a markdown reference; output layout is flat,
/// so any `Attachments/` prefix is irrelevant.
fn requested_filename(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

/// Stem of the requested filename, used by `--no-rename`.
fn requested_stem(requested: &str) -> String {
    Path::new(requested)
        .file_stem()
        .map_or_else(|| requested.to_string(), |s| s.to_string_lossy().into_owned())
}
