//! Markdown image reference extraction and rewriting.
//!
//! Only inline image syntax `![alt](path)` is recognized. Nested and
//! reference-style links are out of scope.

use regex::Regex;
use std::sync::LazyLock;

/// Matches `![alt](path)`: no `]` inside alt, no `)` inside path.
static IMAGE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());

/// A single image link extracted from markdown, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Full matched text, e.g. `![photo](Attachments/a.jpg)`.
    pub raw: String,
    /// Alt text, may be empty.
    pub alt: String,
    /// Referenced path, verbatim.
    pub path: String,
}

/// Extract all image references in document order.
///
/// Duplicate occurrences of an identical reference are each returned
/// separately; position in this list drives the `img_NN` numbering.
pub fn extract_image_references(text: &str) -> Vec<ImageReference> {
    IMAGE_REF
        .captures_iter(text)
        .map(|cap| ImageReference {
            raw: cap[0].to_string(),
            alt: cap[1].to_string(),
            path: cap[2].to_string(),
        })
        .collect()
}

/// Rewrite resolved references to point at their new bare filenames.
///
/// Every literal occurrence of each reference's matched text is replaced
/// with `![<same alt>](<new name>)`. References with no replacement pair
/// stay untouched.
pub fn rewrite_references(text: &str, replacements: &[(&ImageReference, &str)]) -> String {
    let mut out = text.to_string();
    for (reference, new_name) in replacements {
        let new_ref = format!("![{}]({})", reference.alt, new_name);
        out = out.replace(&reference.raw, &new_ref);
    }
    out
}
