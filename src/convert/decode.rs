//! Image decoding, including HEIC through an external converter.
//!
//! The `image` crate covers JPEG/PNG/TIFF/WebP. HEIC has no in-process
//! decoder here; it is piped through ImageMagick or FFmpeg as PNG,
//! whichever is installed. Backend detection runs exactly once, before
//! any decode.

use crate::resolve::{self, MediaType};
use crate::utils::exec::Cmd;
use anyhow::{Context, Result};
use image::DynamicImage;
use std::path::Path;
use std::sync::OnceLock;

/// External tool used to decode HEIC files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeicBackend {
    Magick,
    Ffmpeg,
}

static HEIC_BACKEND: OnceLock<Option<HeicBackend>> = OnceLock::new();

/// Detect the HEIC converter. Idempotent; call before any decode.
pub fn init_heic_support() {
    heic_backend();
}

/// The detected HEIC backend, if any.
pub fn heic_backend() -> Option<HeicBackend> {
    *HEIC_BACKEND.get_or_init(|| {
        if which::which("magick").is_ok() {
            Some(HeicBackend::Magick)
        } else if which::which("ffmpeg").is_ok() {
            Some(HeicBackend::Ffmpeg)
        } else {
            None
        }
    })
}

/// Open a source image in any supported format.
pub fn open_image(path: &Path) -> Result<DynamicImage> {
    if resolve::classify(path) == Some(MediaType::Heic) {
        return decode_heic(path);
    }
    image::open(path).with_context(|| format!("failed to decode `{}`", path.display()))
}

/// Decode HEIC by converting to PNG via the external backend.
fn decode_heic(path: &Path) -> Result<DynamicImage> {
    let backend = heic_backend()
        .context("no HEIC converter found (install ImageMagick or FFmpeg)")?;

    let output = match backend {
        HeicBackend::Magick => Cmd::new("magick").arg(path).arg("png:-").run(),
        HeicBackend::Ffmpeg => Cmd::new("ffmpeg")
            .args(["-v", "error", "-i"])
            .arg(path)
            .args(["-f", "image2pipe", "-c:v", "png", "pipe:1"])
            .run(),
    }
    .with_context(|| format!("HEIC conversion failed for `{}`", path.display()))?;

    image::load_from_memory(&output.stdout)
        .with_context(|| format!("failed to decode converted HEIC `{}`", path.display()))
}
