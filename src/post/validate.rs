//! Source directory validation.
//!
//! Hard pre-flight checks: every failure here halts the run before any
//! file is touched.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the attachments subfolder inside a post directory.
pub const ATTACHMENTS_DIR: &str = "Attachments";

/// Fatal validation failures, reported once.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("source directory does not exist: `{0}`")]
    Missing(PathBuf),

    #[error("source path is not a directory: `{0}`")]
    NotADirectory(PathBuf),

    #[error("no markdown file found in `{0}`")]
    NoMarkdown(PathBuf),

    #[error("no `Attachments/` folder found in `{0}`")]
    NoAttachments(PathBuf),
}

/// Locate the post's markdown file.
///
/// `index.md` is preferred; otherwise the first `*.md` in sorted order.
pub fn find_markdown_file(source_dir: &Path) -> Option<PathBuf> {
    let index = source_dir.join("index.md");
    if index.is_file() {
        return Some(index);
    }

    let mut candidates: Vec<PathBuf> = fs::read_dir(source_dir)
        .ok()?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "md"))
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// Check that the source directory is a processable post directory.
pub fn validate_source_dir(source_dir: &Path) -> Result<(), ValidateError> {
    if !source_dir.exists() {
        return Err(ValidateError::Missing(source_dir.to_path_buf()));
    }
    if !source_dir.is_dir() {
        return Err(ValidateError::NotADirectory(source_dir.to_path_buf()));
    }
    if find_markdown_file(source_dir).is_none() {
        return Err(ValidateError::NoMarkdown(source_dir.to_path_buf()));
    }
    if !source_dir.join(ATTACHMENTS_DIR).is_dir() {
        return Err(ValidateError::NoAttachments(source_dir.to_path_buf()));
    }
    Ok(())
}
