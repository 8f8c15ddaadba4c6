use roofsight_image::{Image, ImageError, PixelBuffer};

use crate::parallel;

/// Unweighted brightness of an RGB(A) pixel, `(r + g + b) / 3`.
#[inline]
pub fn mean_brightness(px: &[u8]) -> f32 {
    (px[0] as f32 + px[1] as f32 + px[2] as f32) / 3.0
}

/// Perceptual luminance of an RGB(A) pixel.
///
/// Y = 0.299 * R + 0.587 * G + 0.114 * B
#[inline]
pub fn luma(px: &[u8]) -> f32 {
    0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32
}

/// Spread between the brightest and darkest color channel of a pixel.
#[inline]
pub fn channel_spread(px: &[u8]) -> u8 {
    let max = px[0].max(px[1]).max(px[2]);
    let min = px[0].min(px[1]).min(px[2]);
    max - min
}

/// Convert an RGBA image to a floating point luminance image.
///
/// # Arguments
///
/// * `src` - The input RGBA image.
/// * `dst` - The output grayscale image.
///
/// # Errors
///
/// Returns an error if the sizes of `src` and `dst` do not match.
pub fn gray_from_rgba(src: &PixelBuffer, dst: &mut Image<f32, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        dst_pixel[0] = luma(src_pixel);
    });

    Ok(())
}

/// Convert an HSL color to 8-bit RGB.
///
/// # Arguments
///
/// * `hue` - Hue in degrees, `[0, 360]`.
/// * `saturation` - Saturation in `[0, 1]`.
/// * `lightness` - Lightness in `[0, 1]`.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [u8; 3] {
    let hue = hue.rem_euclid(360.0);
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = lightness - c / 2.0;

    let (r, g, b) = match hue {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_u8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_u8(r), to_u8(g), to_u8(b)]
}
