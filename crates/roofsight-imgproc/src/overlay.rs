use serde::{Deserialize, Serialize};

use roofsight_framing::ScaleInfo;

use crate::draw::{DrawingContext, Rgba, TextAlign, TextStyle};

/// Number of grid cells along each axis.
pub const GRID_DIVISIONS: usize = 10;

/// Ground length of the scale bar in meters.
pub const SCALE_BAR_METERS: u32 = 20;

const GRID_COLOR: Rgba = Rgba::new(0, 255, 26, 0.95);
const LABEL_COLOR: Rgba = Rgba::WHITE.with_alpha(0.9);
const SHADOW_COLOR: Rgba = Rgba::BLACK.with_alpha(0.8);
const PANEL_COLOR: Rgba = Rgba::BLACK.with_alpha(0.9);
const COMPASS_PANEL_COLOR: Rgba = Rgba::BLACK.with_alpha(0.7);

const COLUMN_LABELS: [&str; GRID_DIVISIONS] = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"];
const IMPERIAL_LABELS: [&str; 4] = ["(16ft)", "(33ft)", "(49ft)", "(66ft)"];

/// Where the overlay elements ended up on the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayLayout {
    /// Width and height of a grid cell in pixels, or `None` if the surface
    /// is too small for a grid.
    pub grid_cell: Option<(usize, usize)>,
    /// Left end of the scale bar.
    pub scale_bar_origin: (i64, i64),
    /// Horizontal positions of the 0, 5, 10, 15 and 20 m ticks.
    pub scale_ticks: Vec<i64>,
    /// Center of the compass glyph.
    pub compass_center: (i64, i64),
}

impl OverlayLayout {
    /// Distance in pixels from the scale bar origin to its last tick.
    pub fn scale_bar_length(&self) -> i64 {
        self.scale_ticks
            .last()
            .map(|x| x - self.scale_bar_origin.0)
            .unwrap_or(0)
    }
}

fn label_style(scale: u32) -> TextStyle {
    TextStyle {
        color: LABEL_COLOR,
        scale,
        align: TextAlign::Center,
        shadow: Some(SHADOW_COLOR),
    }
}

/// Draw a 10x10 reference grid with lettered columns and numbered rows.
///
/// Returns the cell size, or `None` when the surface is smaller than 10
/// pixels along an axis and no grid is drawn.
pub fn draw_grid(ctx: &mut impl DrawingContext) -> Option<(usize, usize)> {
    let size = ctx.size();
    let cell_w = size.width / GRID_DIVISIONS;
    let cell_h = size.height / GRID_DIVISIONS;
    if cell_w == 0 || cell_h == 0 {
        return None;
    }

    let (width, height) = (size.width as i64, size.height as i64);

    for x in (0..=size.width).step_by(cell_w) {
        ctx.draw_line((x as i64, 0), (x as i64, height), GRID_COLOR, 2);
    }
    for y in (0..=size.height).step_by(cell_h) {
        ctx.draw_line((0, y as i64), (width, y as i64), GRID_COLOR, 2);
    }

    let style = label_style(2);
    let (cw, ch) = (cell_w as i64, cell_h as i64);
    for (i, label) in COLUMN_LABELS.iter().enumerate() {
        ctx.draw_text(label, (i as i64 * cw + cw / 2, 15), &style);
    }
    for i in 0..GRID_DIVISIONS as i64 {
        ctx.draw_text(&(i + 1).to_string(), (12, i * ch + ch / 2 + 5), &style);
    }

    Some((cell_w, cell_h))
}

/// Draw a 20 m scale bar with ticks every 5 m near the bottom-left corner.
///
/// The bar starts at `(50, height - 50)` and the tick for `5 * i` meters
/// sits `round(pixels_for_10m / 2 * i)` pixels to the right, so the 20 m
/// tick is exactly `2 * pixels_for_10m` from the origin.
///
/// Returns the origin and the tick positions.
pub fn draw_scale_bar(
    ctx: &mut impl DrawingContext,
    scale: &ScaleInfo,
    zoom: f64,
) -> ((i64, i64), Vec<i64>) {
    let size = ctx.size();
    let origin = (50, size.height as i64 - 50);
    let (sx, sy) = origin;
    let p10 = scale.pixels_for_reference as i64;
    let bar_length = p10 * 2;

    let panel_width = (bar_length + 40).max(320);
    ctx.fill_rect(35, sy - 50, panel_width, 80, PANEL_COLOR);
    ctx.stroke_rect(35, sy - 50, panel_width, 80, Rgba::YELLOW, 3);

    ctx.draw_line((sx, sy), (sx + bar_length, sy), Rgba::YELLOW, 6);

    let ticks: Vec<i64> = (0..=4)
        .map(|i| sx + (p10 as f64 / 2.0 * i as f64).round() as i64)
        .collect();

    let metric = label_style(1);
    for (i, &tx) in ticks.iter().enumerate() {
        ctx.draw_line((tx, sy - 8), (tx, sy + 8), Rgba::YELLOW, 3);
        ctx.draw_text(&format!("{}m", i * 5), (tx, sy + 20), &metric);
        if i > 0 {
            ctx.draw_text(IMPERIAL_LABELS[i - 1], (tx, sy + 32), &metric);
        }
    }

    let title = TextStyle {
        color: Rgba::YELLOW,
        scale: 2,
        align: TextAlign::Left,
        shadow: None,
    };
    ctx.draw_text("MEASUREMENT SCALE", (sx, sy - 35), &title);

    let grid_meters = (size.width / GRID_DIVISIONS) as f64 * scale.meters_per_pixel;
    let info = format!(
        "Zoom: {} | Scale: {:.3}m/px | Grid: ~{:.1}m",
        zoom, scale.meters_per_pixel, grid_meters
    );
    let info_style = TextStyle {
        color: Rgba::WHITE,
        scale: 1,
        align: TextAlign::Left,
        shadow: None,
    };
    ctx.draw_text(&info, (sx, sy - 17), &info_style);

    (origin, ticks)
}

/// Draw a north arrow near the top-right corner and return its center.
pub fn draw_compass(ctx: &mut impl DrawingContext) -> (i64, i64) {
    let size = ctx.size();
    let (cx, cy) = (size.width as i64 - 60, 60);
    let arrow = 20;

    ctx.fill_rect(cx - 25, cy - 35, 50, 60, COMPASS_PANEL_COLOR);
    ctx.draw_line((cx, cy + arrow), (cx, cy - arrow), Rgba::WHITE, 3);
    ctx.fill_polygon(
        &[(cx - 10, cy - 10), (cx, cy - arrow), (cx + 10, cy - 10)],
        Rgba::WHITE,
    );
    ctx.draw_text(
        "N",
        (cx, cy - 25),
        &TextStyle {
            color: Rgba::WHITE,
            scale: 1,
            align: TextAlign::Center,
            shadow: None,
        },
    );

    (cx, cy)
}

/// Draw the reference grid, scale bar and compass.
///
/// The overlay goes on last; nothing filters the buffer after it.
pub fn render_measurement_overlay(
    ctx: &mut impl DrawingContext,
    scale: &ScaleInfo,
    zoom: f64,
) -> OverlayLayout {
    let grid_cell = draw_grid(ctx);
    let (scale_bar_origin, scale_ticks) = draw_scale_bar(ctx, scale, zoom);
    let compass_center = draw_compass(ctx);

    log::debug!(
        "overlay drawn: grid {:?}, 20m = {} px",
        grid_cell,
        scale_ticks.last().map(|x| x - scale_bar_origin.0).unwrap_or(0)
    );

    OverlayLayout {
        grid_cell,
        scale_bar_origin,
        scale_ticks,
        compass_center,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{DrawCommand, RasterCanvas, RecordingCanvas};
    use roofsight_framing::scale_for;
    use roofsight_framing::FramingError;
    use roofsight_image::{ImageSize, PixelBuffer};

    fn size(width: usize, height: usize) -> ImageSize {
        ImageSize { width, height }
    }

    #[test]
    fn grid_lines_and_labels() {
        let mut rec = RecordingCanvas::new(size(800, 600));
        assert_eq!(draw_grid(&mut rec), Some((80, 60)));

        let lines = rec
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count();
        assert_eq!(lines, 22);

        let texts: Vec<_> = rec.texts().collect();
        assert_eq!(texts.len(), 20);
        assert_eq!(texts[0], "A");
        assert_eq!(texts[9], "J");
        assert_eq!(texts[19], "10");
    }

    #[test]
    fn grid_skipped_on_tiny_surface() {
        let mut rec = RecordingCanvas::new(size(9, 600));
        assert_eq!(draw_grid(&mut rec), None);
        assert!(rec.commands().is_empty());
    }

    #[test]
    fn scale_bar_ticks_follow_scale() -> Result<(), FramingError> {
        let scale = scale_for(20.0, 35.0)?;
        let mut rec = RecordingCanvas::new(size(800, 600));
        let layout = render_measurement_overlay(&mut rec, &scale, 20.0);

        assert_eq!(layout.scale_bar_origin, (50, 550));
        assert_eq!(layout.scale_ticks.len(), 5);
        assert_eq!(layout.scale_ticks[0], 50);
        assert_eq!(
            layout.scale_bar_length(),
            2 * scale.pixels_for_reference as i64
        );
        assert_eq!(layout.compass_center, (740, 60));

        let texts: Vec<_> = rec.texts().collect();
        for label in ["0m", "5m", "10m", "15m", "20m", "(66ft)", "MEASUREMENT SCALE", "N"] {
            assert!(texts.contains(&label), "missing {label}");
        }
        assert!(texts.iter().any(|t| t.starts_with("Zoom: 20 | Scale: 0.122m/px")));
        Ok(())
    }

    #[test]
    fn overlay_rasterizes_without_panicking() -> Result<(), Box<dyn std::error::Error>> {
        let scale = scale_for(22.0, 0.0)?;
        for (w, h) in [(800, 600), (40, 30), (1, 1), (0, 0)] {
            let mut img = PixelBuffer::from_size_val(size(w, h), 90)?;
            let layout = render_measurement_overlay(&mut RasterCanvas::new(&mut img), &scale, 22.0);
            assert_eq!(layout.scale_ticks.len(), 5);
        }

        let mut img = PixelBuffer::from_size_val(size(800, 600), 90)?;
        render_measurement_overlay(&mut RasterCanvas::new(&mut img), &scale, 22.0);
        // compass arrow shaft is opaque white
        assert_eq!(img.pixel(740, 65), Some(&[255u8, 255, 255, 255][..]));
        Ok(())
    }

    #[test]
    fn oversized_scale_bar_is_clipped() -> Result<(), Box<dyn std::error::Error>> {
        let scale = ScaleInfo {
            meters_per_pixel: 1e-6,
            pixels_for_reference: i32::MAX,
        };
        let mut img = PixelBuffer::from_size_val(size(64, 64), 90)?;
        let layout = render_measurement_overlay(&mut RasterCanvas::new(&mut img), &scale, 30.0);
        assert_eq!(layout.scale_bar_length(), 2 * i32::MAX as i64);
        assert_eq!(img.size(), size(64, 64));
        Ok(())
    }
}
