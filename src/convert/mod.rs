//! Image transcoding to WebP.
//!
//! One stateless function drives the whole pipeline: decode, normalize
//! the pixel mode, downscale when oversized, encode lossy WebP at the
//! slowest/best compression effort.

mod decode;

pub use decode::init_heic_support;

use anyhow::{Context, Result, anyhow};
use image::DynamicImage;
use image::imageops::FilterType;
use std::fs;
use std::path::Path;

/// Transcode parameters. Pure configuration, no per-run state.
#[derive(Debug, Clone, Copy)]
pub struct TranscodeConfig {
    /// Cap on the longer image dimension, pixels.
    pub max_dimension: u32,
    /// WebP encode quality, 1-100.
    pub quality: u8,
}

/// Byte sizes before and after one transcode.
#[derive(Debug, Clone, Copy)]
pub struct Transcode {
    pub original_size: u64,
    pub new_size: u64,
}

impl Transcode {
    /// Percent saved, rounded. 0 when the original was empty.
    pub fn compression_percent(&self) -> i64 {
        if self.original_size == 0 {
            return 0;
        }
        let ratio = self.new_size as f64 / self.original_size as f64;
        ((1.0 - ratio) * 100.0).round() as i64
    }
}

/// Transcode one source image into a WebP file at `target`.
pub fn transcode(config: &TranscodeConfig, source: &Path, target: &Path) -> Result<Transcode> {
    let original_size = fs::metadata(source)
        .with_context(|| format!("failed to stat `{}`", source.display()))?
        .len();

    let img = decode::open_image(source)?;
    let img = normalize_mode(img);
    let img = downscale(img, config.max_dimension);

    let encoded = encode_webp(&img, config.quality)?;
    fs::write(target, &*encoded)
        .with_context(|| format!("failed to write `{}`", target.display()))?;

    Ok(Transcode {
        original_size,
        new_size: encoded.len() as u64,
    })
}

/// Force 8-bit RGB/RGBA; the WebP encoder accepts nothing else.
///
/// Alpha-carrying modes (including luminance-alpha) land in RGBA,
/// everything else in RGB. Palette sources are already expanded by the
/// decoder.
fn normalize_mode(img: DynamicImage) -> DynamicImage {
    if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    }
}

/// Downscale proportionally when the longer side exceeds `max_dimension`.
/// Images already within bounds pass through untouched; never upscales.
fn downscale(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    if width.max(height) <= max_dimension {
        return img;
    }
    let (new_width, new_height) = fit_dimensions(width, height, max_dimension);
    img.resize_exact(new_width, new_height, FilterType::Lanczos3)
}

/// Longer side pinned to `max`, shorter side derived from the aspect
/// ratio and rounded to nearest.
fn fit_dimensions(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width > height {
        let scaled = (f64::from(height) * f64::from(max) / f64::from(width)).round() as u32;
        (max, scaled.max(1))
    } else {
        let scaled = (f64::from(width) * f64::from(max) / f64::from(height)).round() as u32;
        (scaled.max(1), max)
    }
}

/// Lossy WebP at the given quality, libwebp method 6 (slowest, best).
fn encode_webp(img: &DynamicImage, quality: u8) -> Result<webp::WebPMemory> {
    let encoder =
        webp::Encoder::from_image(img).map_err(|e| anyhow!("webp encoder rejected image: {e}"))?;

    let mut config =
        webp::WebPConfig::new().map_err(|()| anyhow!("webp config initialization failed"))?;
    config.quality = f32::from(quality);
    config.method = 6;

    encoder
        .encode_advanced(&config)
        .map_err(|e| anyhow!("webp encoding failed: {e:?}"))
}
