use rayon::prelude::*;

use roofsight_image::PixelBuffer;

/// Blur the color channels of an image in place with a square box kernel.
///
/// Every pixel at least `radius` pixels away from the border is replaced by
/// the mean of the `(2 * radius + 1)²` window around it, read from an
/// unmodified copy of the input. Border pixels and the alpha channel are left
/// untouched, so a uniform buffer is a fixed point.
///
/// Images too small to have a non-border pixel are returned unchanged.
///
/// # Arguments
///
/// * `img` - The image to blur.
/// * `radius` - Half the kernel size; 0 is a no-op.
pub fn box_blur(img: &mut PixelBuffer, radius: usize) {
    let (width, height) = (img.width(), img.height());
    if radius == 0 || width <= 2 * radius || height <= 2 * radius {
        return;
    }

    let src = img.as_slice().to_vec();
    let stride = width * 4;
    let count = ((2 * radius + 1) * (2 * radius + 1)) as f32;

    img.as_slice_mut()
        .par_chunks_exact_mut(stride)
        .enumerate()
        .skip(radius)
        .take(height - 2 * radius)
        .for_each(|(y, row)| {
            for x in radius..width - radius {
                let mut sum = [0u32; 3];
                for wy in y - radius..=y + radius {
                    let base = wy * stride;
                    for wx in x - radius..=x + radius {
                        let idx = base + wx * 4;
                        sum[0] += src[idx] as u32;
                        sum[1] += src[idx + 1] as u32;
                        sum[2] += src[idx + 2] as u32;
                    }
                }
                let px = &mut row[x * 4..x * 4 + 3];
                for (dst, s) in px.iter_mut().zip(sum) {
                    *dst = (s as f32 / count).round() as u8;
                }
            }
        });
}

/// Sharpen an image in place with an unsharp mask.
///
/// A copy is blurred with [`box_blur`] and every color sample becomes
/// `clamp(original + amount * (original - blurred), 0, 255)`.
///
/// # Arguments
///
/// * `img` - The image to sharpen.
/// * `radius` - Radius of the low-pass box blur.
/// * `amount` - Strength of the high-pass boost.
pub fn unsharp_mask(img: &mut PixelBuffer, radius: usize, amount: f32) {
    let mut blurred = img.clone();
    box_blur(&mut blurred, radius);

    img.as_slice_mut()
        .par_chunks_exact_mut(4)
        .zip(blurred.as_slice().par_chunks_exact(4))
        .for_each(|(px, low)| {
            for c in 0..3 {
                let original = px[c] as f32;
                let v = original + amount * (original - low[c] as f32);
                px[c] = v.round().clamp(0.0, 255.0) as u8;
            }
        });
}
