//! Attachment filename resolution and media type classification.
//!
//! Markdown references and on-disk attachments can disagree on the
//! extension (`photo.jpg` vs `photo.jpeg`, HEIC exports renamed to
//! `.jpg`, ...), so resolution falls back from exact names to stems.

use crate::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Media type of an attachment, classified by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Jpeg,
    Heic,
    Tiff,
    Png,
    WebP,
    Video,
}

/// Classify a file by its extension, case-insensitive.
///
/// Returns `None` for unrecognized extensions. Callers must classify the
/// *resolved* file, not the name the markdown asked for.
pub fn classify(path: &Path) -> Option<MediaType> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some(MediaType::Jpeg),
        "heic" => Some(MediaType::Heic),
        "tif" | "tiff" => Some(MediaType::Tiff),
        "png" => Some(MediaType::Png),
        "webp" => Some(MediaType::WebP),
        "mov" | "mp4" | "avi" => Some(MediaType::Video),
        _ => None,
    }
}

/// Find the attachment a requested filename points at.
///
/// Tier order is significant; later tiers are strictly weaker and must
/// never override earlier matches:
/// 1. exact filename
/// 2. equal stem (name without extension)
/// 3. name contains the requested stem (compound extensions like
///    `name.jpeg.jpg`)
///
/// Directory entries are visited in sorted order so the fallback tiers
/// are deterministic.
pub fn find_attachment(attachments_dir: &Path, requested: &str) -> Option<PathBuf> {
    let exact = attachments_dir.join(requested);
    if exact.is_file() {
        return Some(exact);
    }

    let stem = Path::new(requested).file_stem()?.to_string_lossy().into_owned();
    let files = sorted_files(attachments_dir);

    for file in &files {
        if file
            .file_stem()
            .is_some_and(|s| s.to_string_lossy() == stem)
        {
            debug!("resolve"; "`{}` matched by stem: `{}`", requested, file.display());
            return Some(file.clone());
        }
    }

    for file in &files {
        if file
            .file_name()
            .is_some_and(|n| n.to_string_lossy().contains(&stem))
        {
            debug!("resolve"; "`{}` matched by substring: `{}`", requested, file.display());
            return Some(file.clone());
        }
    }

    None
}

/// All regular files in a directory, sorted by path.
pub fn sorted_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn dir_with(names: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in names {
            File::create(dir.path().join(name)).unwrap();
        }
        dir
    }

    #[test]
    fn test_classify_by_extension() {
        assert_eq!(classify(Path::new("a.jpg")), Some(MediaType::Jpeg));
        assert_eq!(classify(Path::new("a.JPEG")), Some(MediaType::Jpeg));
        assert_eq!(classify(Path::new("a.heic")), Some(MediaType::Heic));
        assert_eq!(classify(Path::new("a.tif")), Some(MediaType::Tiff));
        assert_eq!(classify(Path::new("a.TIFF")), Some(MediaType::Tiff));
        assert_eq!(classify(Path::new("a.png")), Some(MediaType::Png));
        assert_eq!(classify(Path::new("a.webp")), Some(MediaType::WebP));
        assert_eq!(classify(Path::new("a.MOV")), Some(MediaType::Video));
        assert_eq!(classify(Path::new("a.mp4")), Some(MediaType::Video));
        assert_eq!(classify(Path::new("a.xcf")), None);
        assert_eq!(classify(Path::new("noext")), None);
    }

    #[test]
    fn test_exact_match_wins() {
        let dir = dir_with(&["photo.jpg", "photo.jpeg"]);
        let found = find_attachment(dir.path(), "photo.jpg").unwrap();
        assert_eq!(found.file_name().unwrap(), "photo.jpg");
    }

    #[test]
    fn test_stem_fallback() {
        let dir = dir_with(&["photo.jpeg"]);
        let found = find_attachment(dir.path(), "photo.jpg").unwrap();
        assert_eq!(found.file_name().unwrap(), "photo.jpeg");
    }

    #[test]
    fn test_substring_fallback_for_compound_extension() {
        let dir = dir_with(&["scan.jpeg.jpg"]);
        let found = find_attachment(dir.path(), "scan.jpeg").unwrap();
        assert_eq!(found.file_name().unwrap(), "scan.jpeg.jpg");
    }

    #[test]
    fn test_no_match() {
        let dir = dir_with(&["other.png"]);
        assert!(find_attachment(dir.path(), "photo.jpg").is_none());
    }

    #[test]
    fn test_fallback_is_deterministic() {
        // Both files share the requested stem; sorted order picks the first.
        let dir = dir_with(&["photo.jpeg", "photo.png"]);
        let found = find_attachment(dir.path(), "photo.jpg").unwrap();
        assert_eq!(found.file_name().unwrap(), "photo.jpeg");
    }
}
