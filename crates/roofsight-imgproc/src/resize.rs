use roofsight_image::{ImageError, PixelBuffer};

use crate::parallel;

/// Bilinear sample of an RGBA image at a continuous position, clamped to the borders.
fn bilinear_interpolation(image: &PixelBuffer, u: f32, v: f32) -> [f32; 4] {
    let (rows, cols) = (image.rows(), image.cols());

    let u = u.clamp(0.0, (cols - 1) as f32);
    let v = v.clamp(0.0, (rows - 1) as f32);

    let iu0 = u.trunc() as usize;
    let iv0 = v.trunc() as usize;
    let iu1 = (iu0 + 1).min(cols - 1);
    let iv1 = (iv0 + 1).min(rows - 1);

    let frac_u = u - iu0 as f32;
    let frac_v = v - iv0 as f32;

    let w00 = (1.0 - frac_u) * (1.0 - frac_v);
    let w01 = frac_u * (1.0 - frac_v);
    let w10 = (1.0 - frac_u) * frac_v;
    let w11 = frac_u * frac_v;

    let data = image.as_slice();
    let at = |row: usize, col: usize| (row * cols + col) * 4;
    let (b00, b01, b10, b11) = (at(iv0, iu0), at(iv0, iu1), at(iv1, iu0), at(iv1, iu1));

    let mut pixel = [0.0; 4];
    for (k, p) in pixel.iter_mut().enumerate() {
        *p = data[b00 + k] as f32 * w00
            + data[b01 + k] as f32 * w01
            + data[b10 + k] as f32 * w10
            + data[b11 + k] as f32 * w11;
    }
    pixel
}

/// Resize an RGBA image into `dst` with bilinear interpolation.
///
/// Pixel centers are aligned, so a same-size resize is an exact copy.
///
/// # Errors
///
/// Returns an error if `src` is empty while `dst` is not.
pub fn resize_bilinear(src: &PixelBuffer, dst: &mut PixelBuffer) -> Result<(), ImageError> {
    if dst.size().is_empty() {
        return Ok(());
    }
    if src.size().is_empty() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }
    if src.size() == dst.size() {
        dst.as_slice_mut().copy_from_slice(src.as_slice());
        return Ok(());
    }

    let scale_x = src.width() as f32 / dst.width() as f32;
    let scale_y = src.height() as f32 / dst.height() as f32;

    parallel::par_rows_indexed_mut(dst, |y, row| {
        let v = (y as f32 + 0.5) * scale_y - 0.5;
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let u = (x as f32 + 0.5) * scale_x - 0.5;
            let sample = bilinear_interpolation(src, u, v);
            for (d, s) in px.iter_mut().zip(sample) {
                *d = s.round().clamp(0.0, 255.0) as u8;
            }
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roofsight_image::ImageSize;

    #[test]
    fn same_size_is_copy() -> Result<(), ImageError> {
        let src = PixelBuffer::new([2, 1].into(), vec![1, 2, 3, 4, 5, 6, 7, 8])?;
        let mut dst = PixelBuffer::from_size_val(src.size(), 0)?;
        resize_bilinear(&src, &mut dst)?;
        assert_eq!(dst, src);
        Ok(())
    }

    #[test]
    fn upscale_interpolates() -> Result<(), ImageError> {
        let src = PixelBuffer::new([2, 1].into(), vec![0, 0, 0, 255, 200, 200, 200, 255])?;
        let mut dst = PixelBuffer::from_size_val(
            ImageSize {
                width: 4,
                height: 2,
            },
            0,
        )?;
        resize_bilinear(&src, &mut dst)?;
        let red: Vec<u8> = dst.as_slice().chunks_exact(4).map(|p| p[0]).collect();
        assert_eq!(red, vec![0, 50, 150, 200, 0, 50, 150, 200]);
        assert!(dst.as_slice().chunks_exact(4).all(|p| p[3] == 255));
        Ok(())
    }

    #[test]
    fn downscale_uniform() -> Result<(), ImageError> {
        let src = PixelBuffer::from_size_val([64, 48].into(), 77)?;
        let mut dst = PixelBuffer::from_size_val([10, 7].into(), 0)?;
        resize_bilinear(&src, &mut dst)?;
        assert!(dst.as_slice().iter().all(|&v| v == 77));
        Ok(())
    }

    #[test]
    fn empty_source_is_an_error() -> Result<(), ImageError> {
        let src = PixelBuffer::new([0, 0].into(), vec![])?;
        let mut dst = PixelBuffer::from_size_val([3, 3].into(), 0)?;
        assert!(resize_bilinear(&src, &mut dst).is_err());
        Ok(())
    }
}
