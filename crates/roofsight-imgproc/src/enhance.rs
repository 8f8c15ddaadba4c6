use rayon::prelude::*;

use roofsight_image::{Image, ImageError, PixelBuffer};

use crate::color::{channel_spread, mean_brightness};
use crate::parallel;

/// Brightness below which a pixel may be treated as shadow.
pub const SHADOW_BRIGHTNESS: f32 = 90.0;

/// Channel spread below which a dark pixel is treated as shadow.
pub const SHADOW_MAX_SPREAD: u8 = 40;

/// Lift dark, unsaturated pixels in place.
///
/// A pixel is shadow when its brightness is below [`SHADOW_BRIGHTNESS`] and
/// the spread between its color channels is below [`SHADOW_MAX_SPREAD`]. Its
/// color channels are scaled by `1.3 + (90 - brightness) / 200` and clamped
/// to 255. Darker shadows are lifted more.
///
/// Returns the number of lifted pixels.
pub fn compensate_shadows(img: &mut PixelBuffer) -> usize {
    img.as_slice_mut()
        .par_chunks_exact_mut(4)
        .filter_map(|px| {
            let brightness = mean_brightness(px);
            if brightness >= SHADOW_BRIGHTNESS || channel_spread(px) >= SHADOW_MAX_SPREAD {
                return None;
            }
            let factor = 1.3 + (SHADOW_BRIGHTNESS - brightness) / 200.0;
            for v in px[..3].iter_mut() {
                *v = (*v as f32 * factor).round().min(255.0) as u8;
            }
            Some(())
        })
        .count()
}

/// Population standard deviation of the pixel brightness.
pub fn brightness_std_dev(img: &PixelBuffer) -> f64 {
    let n = img.size().area();
    if n == 0 {
        return 0.0;
    }

    let (sum, sum_sq) = img.as_slice().chunks_exact(4).fold((0f64, 0f64), |(s, sq), px| {
        let b = mean_brightness(px) as f64;
        (s + b, sq + b * b)
    });

    let mean = sum / n as f64;
    (sum_sq / n as f64 - mean * mean).max(0.0).sqrt()
}

/// Contrast boost chosen from the brightness spread of an image.
///
/// Flat images get the largest boost:
///
/// | std dev | boost |
/// |---|---|
/// | < 30 | 15 |
/// | < 50 | 10 |
/// | < 70 | 6 |
/// | otherwise | 3 |
pub fn contrast_boost(img: &PixelBuffer) -> f32 {
    match brightness_std_dev(img) {
        s if s < 30.0 => 15.0,
        s if s < 50.0 => 10.0,
        s if s < 70.0 => 6.0,
        _ => 3.0,
    }
}

/// Apply the linear contrast curve to the color channels in place.
///
/// `factor = 259 * (c + 255) / (255 * (259 - c))` and every sample becomes
/// `clamp(factor * (v - 128) + 128, 0, 255)`. The contrast is clamped to
/// `[-255, 258]` so the factor stays finite.
pub fn adjust_contrast(img: &mut PixelBuffer, contrast: f32) {
    let c = contrast.clamp(-255.0, 258.0);
    let factor = (259.0 * (c + 255.0)) / (255.0 * (259.0 - c));

    parallel::par_pixels_mut(img, |px| {
        for v in px[..3].iter_mut() {
            *v = (factor * (*v as f32 - 128.0) + 128.0).round().clamp(0.0, 255.0) as u8;
        }
    });
}

/// Boost contrast by [`contrast_boost`] scaled by `gain`.
///
/// Returns the contrast that was applied.
pub fn adaptive_contrast(img: &mut PixelBuffer, gain: f32) -> f32 {
    let contrast = contrast_boost(img) * gain;
    adjust_contrast(img, contrast);
    contrast
}

/// Add an edge mask onto the color channels of an image.
///
/// Every color sample becomes `min(255, v + edge * intensity)`, so edges
/// highlight structure without replacing it.
///
/// # Errors
///
/// Returns an error if the sizes of `img` and `edges` do not match.
pub fn blend_edges(
    img: &mut PixelBuffer,
    edges: &Image<u8, 1>,
    intensity: f32,
) -> Result<(), ImageError> {
    if img.size() != edges.size() {
        return Err(ImageError::InvalidImageSize(
            img.width(),
            img.height(),
            edges.width(),
            edges.height(),
        ));
    }

    img.as_slice_mut()
        .par_chunks_exact_mut(4)
        .zip(edges.as_slice().par_iter())
        .filter(|(_, &edge)| edge > 0)
        .for_each(|(px, &edge)| {
            let add = edge as f32 * intensity;
            for v in px[..3].iter_mut() {
                *v = (*v as f32 + add).round().min(255.0) as u8;
            }
        });

    Ok(())
}
