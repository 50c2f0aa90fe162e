//! Dark/light theme detection and correction.
//!
//! Editor screenshots taken in a dark theme (light text on a dark
//! background) are inverted so the OCR engine always sees dark text on a
//! light background.

use std::path::Path;

use anyhow::{Context, Result};
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader};
use tracing::{debug, info};

/// Mean brightness below which an image is treated as dark mode.
pub const DEFAULT_DARK_THRESHOLD: f64 = 128.0;

/// Output of polarity normalization.
#[derive(Debug, Clone)]
pub struct Polarity {
    /// Image ready for binarization (inverted when `dark_mode` is set)
    pub image: DynamicImage,
    /// Mean of every sample of the oriented input, 0.0 - 255.0
    pub brightness: f64,
    /// True when the input was classified as light-text-on-dark
    pub dark_mode: bool,
}

/// Decodes an image file and applies its EXIF orientation.
///
/// Decode failures are fatal for the run and carry the file path.
pub fn load_oriented(path: &Path) -> Result<DynamicImage> {
    let mut decoder = ImageReader::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to detect image format of {}", path.display()))?
        .into_decoder()
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    // Missing or malformed EXIF is treated as "no transform"
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let img = DynamicImage::from_decoder(decoder)
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    info!(
        "Loaded {} ({}x{}, orientation {:?})",
        path.display(),
        img.width(),
        img.height(),
        orientation
    );

    Ok(orient(img, orientation))
}

/// Rotates/flips the image so rows and columns match the intended viewing orientation.
pub fn orient(mut img: DynamicImage, orientation: Orientation) -> DynamicImage {
    img.apply_orientation(orientation);
    img
}

/// Reduces wide sample types to 8 bits while keeping the channel layout.
fn to_eight_bit(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => img,
        DynamicImage::ImageLuma16(_) => DynamicImage::ImageLuma8(img.to_luma8()),
        DynamicImage::ImageLumaA16(_) => DynamicImage::ImageLumaA8(img.to_luma_alpha8()),
        DynamicImage::ImageRgb16(_) | DynamicImage::ImageRgb32F(_) => {
            DynamicImage::ImageRgb8(img.to_rgb8())
        }
        _ => DynamicImage::ImageRgba8(img.to_rgba8()),
    }
}

/// Calculates the arithmetic mean over all samples of all channels.
///
/// Alpha counts like any other channel. Returns 0.0 for an empty image.
pub fn mean_brightness(img: &DynamicImage) -> f64 {
    let samples = img.as_bytes();
    if samples.is_empty() {
        return 0.0;
    }

    let total: u64 = samples.iter().map(|&v| v as u64).sum();
    total as f64 / samples.len() as f64
}

/// Classifies the image and inverts it when it is dark.
///
/// Dark images are converted to 3-channel RGB before every channel value
/// `v` becomes `255 - v`. Light images pass through untouched.
pub fn normalize_polarity(img: DynamicImage, dark_threshold: f64) -> Polarity {
    let img = to_eight_bit(img);
    let brightness = mean_brightness(&img);
    let dark_mode = brightness < dark_threshold;

    debug!(brightness, dark_threshold, "Polarity analysis");

    if !dark_mode {
        info!("Light mode detected (brightness {:.1})", brightness);
        return Polarity {
            image: img,
            brightness,
            dark_mode,
        };
    }

    info!(
        "Dark mode detected (brightness {:.1}), inverting colors",
        brightness
    );
    let mut rgb = img.to_rgb8();
    image::imageops::invert(&mut rgb);

    Polarity {
        image: DynamicImage::ImageRgb8(rgb),
        brightness,
        dark_mode,
    }
}
