use serde::{Deserialize, Serialize};

use roofsight_image::{ImageSize, PixelBuffer};

use crate::font;

/// A drawing color with a fractional opacity, like a CSS `rgba()`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Opacity in `[0, 1]`.
    pub a: f32,
}

impl Rgba {
    /// Opaque white.
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    /// Opaque yellow.
    pub const YELLOW: Rgba = Rgba::rgb(255, 255, 0);

    /// A color with the given opacity.
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// The same color with another opacity.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }
}

/// Horizontal anchoring of text relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    /// The position is the left edge of the text.
    #[default]
    Left,
    /// The position is the horizontal center of the text.
    Center,
}

/// How text is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Fill color of the glyphs.
    pub color: Rgba,
    /// Integer magnification of the 5x7 font.
    pub scale: u32,
    /// Horizontal anchoring.
    pub align: TextAlign,
    /// Color of a drop shadow offset by one pixel, if any.
    pub shadow: Option<Rgba>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Rgba::WHITE,
            scale: 1,
            align: TextAlign::Left,
            shadow: None,
        }
    }
}

/// Minimal vector drawing interface used by the overlays.
///
/// Coordinates are in pixels with the origin at the top-left corner. Text is
/// positioned by its baseline.
pub trait DrawingContext {
    /// Size of the drawing surface.
    fn size(&self) -> ImageSize;

    /// Draw a line segment of the given stroke width.
    fn draw_line(&mut self, from: (i64, i64), to: (i64, i64), color: Rgba, width: u32);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, x: i64, y: i64, width: i64, height: i64, color: Rgba);

    /// Outline an axis-aligned rectangle.
    fn stroke_rect(&mut self, x: i64, y: i64, width: i64, height: i64, color: Rgba, line_width: u32) {
        let (x1, y1) = (x + width, y + height);
        self.draw_line((x, y), (x1, y), color, line_width);
        self.draw_line((x, y1), (x1, y1), color, line_width);
        self.draw_line((x, y), (x, y1), color, line_width);
        self.draw_line((x1, y), (x1, y1), color, line_width);
    }

    /// Fill a closed polygon with the even-odd rule.
    fn fill_polygon(&mut self, points: &[(i64, i64)], color: Rgba);

    /// Draw a line of text with its baseline at `position.1`.
    fn draw_text(&mut self, text: &str, position: (i64, i64), style: &TextStyle);
}

/// A [`DrawingContext`] compositing onto an RGBA buffer with source-over blending.
pub struct RasterCanvas<'a> {
    img: &'a mut PixelBuffer,
}

impl<'a> RasterCanvas<'a> {
    /// Draw onto `img` in place.
    pub fn new(img: &'a mut PixelBuffer) -> Self {
        Self { img }
    }

    fn blend(&mut self, x: i64, y: i64, color: Rgba) {
        let (width, height) = (self.img.width() as i64, self.img.height() as i64);
        if x < 0 || y < 0 || x >= width || y >= height {
            return;
        }

        let a = color.a.clamp(0.0, 1.0);
        if a == 0.0 {
            return;
        }

        let start = ((y * width + x) * 4) as usize;
        let px = &mut self.img.as_slice_mut()[start..start + 4];
        if a >= 1.0 {
            px.copy_from_slice(&[color.r, color.g, color.b, 255]);
            return;
        }

        let mix = |src: u8, dst: u8| (src as f32 * a + dst as f32 * (1.0 - a)).round() as u8;
        px[0] = mix(color.r, px[0]);
        px[1] = mix(color.g, px[1]);
        px[2] = mix(color.b, px[2]);
        px[3] = mix(255, px[3]);
    }

    fn draw_glyphs(&mut self, text: &str, left: i64, top: i64, scale: i64, color: Rgba) {
        let advance = font::GLYPH_ADVANCE as i64 * scale;
        for (i, c) in text.chars().enumerate() {
            let x0 = left + i as i64 * advance;
            for (col, row) in font::glyph_pixels(c) {
                self.fill_rect(
                    x0 + col as i64 * scale,
                    top + row as i64 * scale,
                    scale,
                    scale,
                    color,
                );
            }
        }
    }
}

/// Clip a segment to the rectangle spanned by `min` and `max`, both inclusive.
///
/// Segments already inside come back untouched; others are cut with
/// Liang-Barsky and their new endpoints rounded. Returns `None` when the
/// segment misses the rectangle.
fn clip_segment(
    from: (i64, i64),
    to: (i64, i64),
    min: (i64, i64),
    max: (i64, i64),
) -> Option<((i64, i64), (i64, i64))> {
    let inside = |(x, y): (i64, i64)| x >= min.0 && x <= max.0 && y >= min.1 && y <= max.1;
    if inside(from) && inside(to) {
        return Some((from, to));
    }

    let (x0, y0) = (from.0 as f64, from.1 as f64);
    let (dx, dy) = (to.0 as f64 - x0, to.1 as f64 - y0);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [
        (-dx, x0 - min.0 as f64),
        (dx, max.0 as f64 - x0),
        (-dy, y0 - min.1 as f64),
        (dy, max.1 as f64 - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else if p < 0.0 {
            t0 = t0.max(q / p);
        } else {
            t1 = t1.min(q / p);
        }
    }
    if t0 > t1 {
        return None;
    }

    let at = |t: f64| ((x0 + t * dx).round() as i64, (y0 + t * dy).round() as i64);
    Some((at(t0), at(t1)))
}

/// Pixels of a Bresenham line, each stamped with a square brush of side `width`.
fn line_pixels(from: (i64, i64), to: (i64, i64), width: u32) -> Vec<(i64, i64)> {
    let (mut x0, mut y0) = from;
    let (x1, y1) = to;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    let width = width.max(1) as i64;
    let lo = -(width / 2);
    let hi = lo + width - 1;

    let mut pixels = Vec::new();
    loop {
        for i in lo..=hi {
            for j in lo..=hi {
                pixels.push((x0 + i, y0 + j));
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }

    // overlapping stamps would blend translucent strokes twice
    pixels.sort_unstable();
    pixels.dedup();
    pixels
}

impl DrawingContext for RasterCanvas<'_> {
    fn size(&self) -> ImageSize {
        self.img.size()
    }

    fn draw_line(&mut self, from: (i64, i64), to: (i64, i64), color: Rgba, width: u32) {
        // keep a brush width of margin so stamps centered off-surface still land
        let margin = width.max(1) as i64;
        let max = (
            self.img.width() as i64 - 1 + margin,
            self.img.height() as i64 - 1 + margin,
        );
        let Some((from, to)) = clip_segment(from, to, (-margin, -margin), max) else {
            return;
        };
        for (x, y) in line_pixels(from, to, width) {
            self.blend(x, y, color);
        }
    }

    fn fill_rect(&mut self, x: i64, y: i64, width: i64, height: i64, color: Rgba) {
        let x_min = x.max(0);
        let y_min = y.max(0);
        let x_max = (x + width).min(self.img.width() as i64);
        let y_max = (y + height).min(self.img.height() as i64);

        for py in y_min..y_max {
            for px in x_min..x_max {
                self.blend(px, py, color);
            }
        }
    }

    fn fill_polygon(&mut self, points: &[(i64, i64)], color: Rgba) {
        if points.len() < 3 {
            return;
        }

        let y_min = points.iter().map(|p| p.1).min().unwrap_or(0).max(0);
        let y_max = points
            .iter()
            .map(|p| p.1)
            .max()
            .unwrap_or(0)
            .min(self.img.height() as i64 - 1);

        let mut crossings = Vec::with_capacity(points.len());
        for y in y_min..=y_max {
            let sy = y as f64 + 0.5;
            crossings.clear();
            for (i, &(ax, ay)) in points.iter().enumerate() {
                let (bx, by) = points[(i + 1) % points.len()];
                let (ay, by) = (ay as f64, by as f64);
                if (ay <= sy && by > sy) || (by <= sy && ay > sy) {
                    let t = (sy - ay) / (by - ay);
                    crossings.push(ax as f64 + t * (bx - ax) as f64);
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));

            for span in crossings.chunks_exact(2) {
                let x_start = (span[0] - 0.5).ceil() as i64;
                let x_end = (span[1] - 0.5).ceil() as i64;
                for x in x_start..x_end {
                    self.blend(x, y, color);
                }
            }
        }
    }

    fn draw_text(&mut self, text: &str, position: (i64, i64), style: &TextStyle) {
        let scale = style.scale.max(1) as i64;
        let width = font::text_width(text, scale as usize) as i64;
        let left = match style.align {
            TextAlign::Left => position.0,
            TextAlign::Center => position.0 - width / 2,
        };
        let top = position.1 - font::GLYPH_HEIGHT as i64 * scale;

        if let Some(shadow) = style.shadow {
            self.draw_glyphs(text, left + 1, top + 1, scale, shadow);
        }
        self.draw_glyphs(text, left, top, scale, style.color);
    }
}

/// A drawing call captured by [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    /// A line segment.
    Line {
        /// Start point.
        from: (i64, i64),
        /// End point.
        to: (i64, i64),
        /// Stroke color.
        color: Rgba,
        /// Stroke width.
        width: u32,
    },
    /// A filled rectangle.
    FillRect {
        /// Left edge.
        x: i64,
        /// Top edge.
        y: i64,
        /// Width.
        width: i64,
        /// Height.
        height: i64,
        /// Fill color.
        color: Rgba,
    },
    /// A rectangle outline.
    StrokeRect {
        /// Left edge.
        x: i64,
        /// Top edge.
        y: i64,
        /// Width.
        width: i64,
        /// Height.
        height: i64,
        /// Stroke color.
        color: Rgba,
        /// Stroke width.
        line_width: u32,
    },
    /// A filled polygon.
    FillPolygon {
        /// Vertices in order.
        points: Vec<(i64, i64)>,
        /// Fill color.
        color: Rgba,
    },
    /// A line of text.
    Text {
        /// The text.
        text: String,
        /// Anchor point on the baseline.
        position: (i64, i64),
        /// Rendering style.
        style: TextStyle,
    },
}

/// A [`DrawingContext`] that records calls instead of rasterizing them.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingCanvas {
    size: ImageSize,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    /// An empty recording for a surface of the given size.
    pub fn new(size: ImageSize) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    /// Recorded calls in order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Texts drawn so far, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Play the recorded calls back onto another context.
    pub fn replay(&self, ctx: &mut impl DrawingContext) {
        for cmd in &self.commands {
            match cmd {
                DrawCommand::Line {
                    from,
                    to,
                    color,
                    width,
                } => ctx.draw_line(*from, *to, *color, *width),
                DrawCommand::FillRect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => ctx.fill_rect(*x, *y, *width, *height, *color),
                DrawCommand::StrokeRect {
                    x,
                    y,
                    width,
                    height,
                    color,
                    line_width,
                } => ctx.stroke_rect(*x, *y, *width, *height, *color, *line_width),
                DrawCommand::FillPolygon { points, color } => ctx.fill_polygon(points, *color),
                DrawCommand::Text {
                    text,
                    position,
                    style,
                } => ctx.draw_text(text, *position, style),
            }
        }
    }
}

impl DrawingContext for RecordingCanvas {
    fn size(&self) -> ImageSize {
        self.size
    }

    fn draw_line(&mut self, from: (i64, i64), to: (i64, i64), color: Rgba, width: u32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn fill_rect(&mut self, x: i64, y: i64, width: i64, height: i64, color: Rgba) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn stroke_rect(&mut self, x: i64, y: i64, width: i64, height: i64, color: Rgba, line_width: u32) {
        self.commands.push(DrawCommand::StrokeRect {
            x,
            y,
            width,
            height,
            color,
            line_width,
        });
    }

    fn fill_polygon(&mut self, points: &[(i64, i64)], color: Rgba) {
        self.commands.push(DrawCommand::FillPolygon {
            points: points.to_vec(),
            color,
        });
    }

    fn draw_text(&mut self, text: &str, position: (i64, i64), style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            position,
            style: *style,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roofsight_image::ImageError;

    fn canvas_red(img: &PixelBuffer) -> Vec<u8> {
        img.as_slice().chunks_exact(4).map(|px| px[0]).collect()
    }

    #[rustfmt::skip]
    #[test]
    fn line_diagonal() -> Result<(), ImageError> {
        let mut img = PixelBuffer::from_size_val([5, 5].into(), 0)?;
        RasterCanvas::new(&mut img).draw_line((0, 0), (4, 4), Rgba::WHITE, 1);
        assert_eq!(
            canvas_red(&img),
            vec![
                255,   0,   0,   0,   0,
                  0, 255,   0,   0,   0,
                  0,   0, 255,   0,   0,
                  0,   0,   0, 255,   0,
                  0,   0,   0,   0, 255,
            ]
        );
        Ok(())
    }

    #[rustfmt::skip]
    #[test]
    fn line_far_off_surface_is_clipped() -> Result<(), ImageError> {
        let mut img = PixelBuffer::from_size_val([6, 5].into(), 0)?;
        let mut canvas = RasterCanvas::new(&mut img);
        canvas.draw_line((-2_000_000_000, 2), (2_000_000_000, 2), Rgba::WHITE, 3);
        // misses the surface entirely
        canvas.draw_line((-50, -40), (-40, -50), Rgba::WHITE, 3);
        assert_eq!(
            canvas_red(&img),
            vec![
                  0,   0,   0,   0,   0,   0,
                255, 255, 255, 255, 255, 255,
                255, 255, 255, 255, 255, 255,
                255, 255, 255, 255, 255, 255,
                  0,   0,   0,   0,   0,   0,
            ]
        );

        // a diagonal entering from far outside follows the unclipped path
        let mut clipped = PixelBuffer::from_size_val([5, 5].into(), 0)?;
        RasterCanvas::new(&mut clipped).draw_line((-10, -10), (4, 4), Rgba::WHITE, 1);
        let mut direct = PixelBuffer::from_size_val([5, 5].into(), 0)?;
        RasterCanvas::new(&mut direct).draw_line((0, 0), (4, 4), Rgba::WHITE, 1);
        assert_eq!(clipped, direct);
        Ok(())
    }

    #[rustfmt::skip]
    #[test]
    fn rect_outline() -> Result<(), ImageError> {
        let mut img = PixelBuffer::from_size_val([5, 5].into(), 0)?;
        RasterCanvas::new(&mut img).stroke_rect(1, 1, 2, 2, Rgba::rgb(128, 0, 0), 1);
        assert_eq!(
            canvas_red(&img),
            vec![
                0,   0,   0,   0, 0,
                0, 128, 128, 128, 0,
                0, 128,   0, 128, 0,
                0, 128, 128, 128, 0,
                0,   0,   0,   0, 0,
            ]
        );
        Ok(())
    }

    #[test]
    fn translucent_fill_blends_once() -> Result<(), ImageError> {
        let mut img = PixelBuffer::from_size_val([4, 4].into(), 100)?;
        let mut canvas = RasterCanvas::new(&mut img);
        canvas.fill_rect(-2, -2, 4, 4, Rgba::new(200, 0, 0, 0.5));
        // a thick translucent line overlaps its own stamps
        canvas.draw_line((0, 3), (3, 3), Rgba::new(0, 0, 200, 0.5), 3);

        assert_eq!(img.pixel(0, 0), Some(&[150u8, 50, 50, 178][..]));
        assert_eq!(img.pixel(2, 0), Some(&[100u8, 100, 100, 100][..]));
        assert_eq!(img.pixel(3, 3), Some(&[50u8, 50, 150, 178][..]));
        Ok(())
    }

    #[rustfmt::skip]
    #[test]
    fn polygon_triangle() -> Result<(), ImageError> {
        let mut img = PixelBuffer::from_size_val([5, 4].into(), 0)?;
        RasterCanvas::new(&mut img).fill_polygon(&[(0, 4), (5, 4), (5, 0)], Rgba::WHITE);
        assert_eq!(
            canvas_red(&img),
            vec![
                0,   0,   0,   0, 255,
                0,   0,   0, 255, 255,
                0,   0, 255, 255, 255,
                0, 255, 255, 255, 255,
            ]
        );
        Ok(())
    }

    #[test]
    fn text_draws_glyphs_above_baseline() -> Result<(), ImageError> {
        let mut img = PixelBuffer::from_size_val([12, 10].into(), 0)?;
        let style = TextStyle {
            shadow: Some(Rgba::rgb(60, 60, 60)),
            ..Default::default()
        };
        RasterCanvas::new(&mut img).draw_text("-", (1, 8), &style);

        // '-' lights row 3 of the glyph, which starts 7 rows above the baseline
        for x in 1..6 {
            assert_eq!(img.pixel(x, 4), Some(&[255u8, 255, 255, 255][..]));
        }
        assert_eq!(img.pixel(6, 5), Some(&[60u8, 60, 60, 255][..]));
        assert_eq!(img.pixel(0, 4), Some(&[0u8, 0, 0, 0][..]));
        Ok(())
    }

    #[test]
    fn recording_replays_onto_raster() -> Result<(), ImageError> {
        let size = [16, 12].into();
        let mut recording = RecordingCanvas::new(size);
        recording.fill_rect(2, 2, 6, 4, Rgba::YELLOW);
        recording.stroke_rect(0, 0, 15, 11, Rgba::WHITE, 1);
        recording.draw_text("N", (8, 10), &TextStyle::default());
        assert_eq!(recording.commands().len(), 3);
        assert_eq!(recording.texts().collect::<Vec<_>>(), vec!["N"]);

        let mut direct = PixelBuffer::from_size_val(size, 0)?;
        {
            let mut canvas = RasterCanvas::new(&mut direct);
            canvas.fill_rect(2, 2, 6, 4, Rgba::YELLOW);
            canvas.stroke_rect(0, 0, 15, 11, Rgba::WHITE, 1);
            canvas.draw_text("N", (8, 10), &TextStyle::default());
        }

        let mut replayed = PixelBuffer::from_size_val(size, 0)?;
        recording.replay(&mut RasterCanvas::new(&mut replayed));
        assert_eq!(replayed, direct);
        Ok(())
    }
}
