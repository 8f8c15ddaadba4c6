use roofsight_image::{Image, ImageError, PixelBuffer};

use crate::color::{gray_from_rgba, hsl_to_rgb};
use crate::draw::{DrawingContext, RasterCanvas, Rgba, TextStyle};
use crate::parallel;

/// Gradient magnitude that maps to full saturation.
const FULL_SATURATION_GRADIENT: f32 = 50.0;

/// Legend swatches and the roof pitch each color stands for.
pub const PITCH_LEGEND: [(Rgba, &str); 6] = [
    (Rgba::rgb(255, 0, 0), "1/12"),
    (Rgba::rgb(255, 255, 0), "3/12"),
    (Rgba::rgb(0, 255, 0), "5/12"),
    (Rgba::rgb(0, 255, 255), "7/12"),
    (Rgba::rgb(0, 0, 255), "9/12"),
    (Rgba::rgb(255, 0, 255), "12/12"),
];

/// Color every pixel by the direction and strength of its brightness gradient.
///
/// The gradient is a central difference on a grayscale copy of `src`. The
/// direction maps to hue over the full circle, the magnitude to saturation
/// (full at 50), and lightness is fixed at 50%. Border pixels are written as
/// their gray level. Alpha is kept.
///
/// # Errors
///
/// Returns an error if `src` and `dst` differ in size.
pub fn pitch_false_color(src: &PixelBuffer, dst: &mut PixelBuffer) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    let mut gray = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
    gray_from_rgba(src, &mut gray)?;

    let (width, height) = (src.width(), src.height());
    let g = gray.as_slice();
    let alpha = src.as_slice();

    parallel::par_rows_indexed_mut(dst, |y, row| {
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let idx = y * width + x;
            let a = alpha[idx * 4 + 3];

            if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                let v = g[idx].round().clamp(0.0, 255.0) as u8;
                px.copy_from_slice(&[v, v, v, a]);
                continue;
            }

            let grad_x = g[idx + 1] - g[idx - 1];
            let grad_y = g[idx + width] - g[idx - width];
            let magnitude = (grad_x * grad_x + grad_y * grad_y).sqrt();
            let angle = grad_y.atan2(grad_x);

            let hue = (angle + std::f32::consts::PI) / (2.0 * std::f32::consts::PI) * 360.0;
            let saturation = (magnitude / FULL_SATURATION_GRADIENT).min(1.0);
            let [r, gg, b] = hsl_to_rgb(hue, saturation, 0.5);
            px.copy_from_slice(&[r, gg, b, a]);
        }
    });

    Ok(())
}

/// Draw the pitch color legend in the bottom-left corner.
pub fn draw_pitch_legend(ctx: &mut impl DrawingContext) {
    let height = ctx.size().height as i64;

    ctx.fill_rect(10, height - 100, 130, 90, Rgba::BLACK.with_alpha(0.7));
    ctx.draw_text(
        "Pitch Reference",
        (20, height - 80),
        &TextStyle {
            color: Rgba::WHITE,
            ..Default::default()
        },
    );

    let label = TextStyle::default();
    for (i, (color, pitch)) in PITCH_LEGEND.iter().enumerate() {
        let offset = i as i64 * 10;
        ctx.fill_rect(20, height - 65 + offset, 10, 8, *color);
        ctx.draw_text(pitch, (35, height - 58 + offset), &label);
    }
}

/// False-color an image by surface slope direction and add the legend.
///
/// A visualization aid for reading roof facets, not a measurement.
///
/// # Errors
///
/// Propagates allocation errors of the intermediate grayscale image.
pub fn enhance_roof_pitch(src: &PixelBuffer) -> Result<PixelBuffer, ImageError> {
    let mut dst = src.clone();
    pitch_false_color(src, &mut dst)?;
    draw_pitch_legend(&mut RasterCanvas::new(&mut dst));
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::RecordingCanvas;
    use roofsight_image::ImageSize;

    fn horizontal_ramp(width: usize, height: usize, step: u8) -> Result<PixelBuffer, ImageError> {
        let data = (0..width * height)
            .flat_map(|i| {
                let v = (i % width) as u8 * step;
                [v, v, v, 200]
            })
            .collect();
        PixelBuffer::new(ImageSize { width, height }, data)
    }

    #[test]
    fn flat_image_turns_gray() -> Result<(), ImageError> {
        let src = PixelBuffer::from_size_val([6, 6].into(), 90)?;
        let mut dst = src.clone();
        pitch_false_color(&src, &mut dst)?;
        // no gradient: zero saturation at 50% lightness
        assert_eq!(dst.pixel(3, 3), Some(&[128u8, 128, 128, 90][..]));
        assert_eq!(dst.pixel(0, 0), Some(&[90u8, 90, 90, 90][..]));
        Ok(())
    }

    #[test]
    fn rightward_slope_is_cyan() -> Result<(), ImageError> {
        // gradient pointing +x: atan2(0, g) = 0, hue 180
        let src = horizontal_ramp(8, 5, 30)?;
        let mut dst = src.clone();
        pitch_false_color(&src, &mut dst)?;
        assert_eq!(dst.pixel(4, 2), Some(&[0u8, 255, 255, 200][..]));
        Ok(())
    }

    #[test]
    fn false_color_reads_original_gray() -> Result<(), ImageError> {
        let src = horizontal_ramp(16, 8, 15)?;
        let mut dst = src.clone();
        pitch_false_color(&src, &mut dst)?;
        // a uniform ramp gives one color everywhere inside
        let inner = dst.pixel(1, 1).map(|p| p.to_vec());
        for y in 1..7 {
            for x in 1..15 {
                assert_eq!(dst.pixel(x, y).map(|p| p.to_vec()), inner);
            }
        }
        Ok(())
    }

    #[test]
    fn legend_layout() {
        let mut rec = RecordingCanvas::new([400, 300].into());
        draw_pitch_legend(&mut rec);
        let texts: Vec<_> = rec.texts().collect();
        assert_eq!(
            texts,
            vec!["Pitch Reference", "1/12", "3/12", "5/12", "7/12", "9/12", "12/12"]
        );
        assert_eq!(rec.commands().len(), 14);
    }

    #[test]
    fn pitch_keeps_size() -> Result<(), ImageError> {
        for (w, h) in [(64, 48), (2, 2), (1, 9), (0, 0)] {
            let src = PixelBuffer::from_size_val([w, h].into(), 10)?;
            let out = enhance_roof_pitch(&src)?;
            assert_eq!(out.size(), src.size());
        }
        Ok(())
    }
}
