use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use tracing::debug;

/// ITU-R 601-2 luma in 16-bit fixed point: `(R*19595 + G*38470 + B*7471 + 0x8000) >> 16`.
fn luma_601(r: u8, g: u8, b: u8) -> u8 {
    let y = (r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16;
    y.min(255) as u8
}

/// Converts to single-channel luminance. Alpha is ignored.
pub fn to_luminance(img: &DynamicImage) -> GrayImage {
    if !img.color().has_color() {
        return img.to_luma8();
    }

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let mut output = ImageBuffer::new(width, height);

    for (x, y, pixel) in rgb.enumerate_pixels() {
        output.put_pixel(x, y, Luma([luma_601(pixel[0], pixel[1], pixel[2])]));
    }

    output
}

/// Converts the normalized image to a two-level luminance image.
///
/// The threshold is picked automatically from the luminance histogram with
/// Otsu's method. Pixels brighter than the threshold become white (255),
/// everything else becomes black (0). Dimensions are preserved.
pub fn binarize(img: &DynamicImage) -> GrayImage {
    let gray = to_luminance(img);
    if gray.width() == 0 || gray.height() == 0 {
        return gray;
    }

    let level = otsu_level(&gray);
    debug!(level, "Otsu threshold computed");

    threshold(&gray, level, ThresholdType::Binary)
}
