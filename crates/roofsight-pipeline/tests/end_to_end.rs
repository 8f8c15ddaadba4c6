use approx::assert_relative_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};

use roofsight_framing::{scale_for, validate_fit, zoom_for_angle};
use roofsight_image::{ImageSize, PixelBuffer};
use roofsight_imgproc::quality::assess_quality;
use roofsight_pipeline::{enhance, Dimensions, PipelineError, ProcessingOptions};

const WIDTH: usize = 800;
const HEIGHT: usize = 600;
const BOARD_X: (usize, usize) = (200, 600);
const BOARD_Y: (usize, usize) = (150, 450);
const SQUARE: usize = 20;

/// 800x600 mid-gray frame with a 400x300 black and white checkerboard in the middle.
fn checkerboard_frame() -> Result<PixelBuffer, PipelineError> {
    let mut data = Vec::with_capacity(WIDTH * HEIGHT * 4);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let inside = (BOARD_X.0..BOARD_X.1).contains(&x) && (BOARD_Y.0..BOARD_Y.1).contains(&y);
            let v = if !inside {
                128
            } else if ((x - BOARD_X.0) / SQUARE + (y - BOARD_Y.0) / SQUARE) % 2 == 0 {
                230
            } else {
                30
            };
            data.extend_from_slice(&[v, v, v, 255]);
        }
    }
    Ok(PixelBuffer::new(
        ImageSize {
            width: WIDTH,
            height: HEIGHT,
        },
        data,
    )?)
}

fn scenario_options() -> ProcessingOptions {
    ProcessingOptions {
        enhance_edges: true,
        enhance_contrast: true,
        add_measurement_grid: true,
        compensate_shadows: false,
        sharpen_image: false,
        zoom: 20.0,
        latitude: 35.0,
        ..Default::default()
    }
}

/// Whether a pixel lies within 3 px of a square boundary of the board.
fn near_board_boundary(x: usize, y: usize) -> bool {
    let (x, y) = (x as i64, y as i64);
    let within = |v: i64, (lo, hi): (usize, usize)| v >= lo as i64 - 3 && v < hi as i64 + 3;
    if !within(x, BOARD_X) || !within(y, BOARD_Y) {
        return false;
    }
    let near_line = |v: i64, origin: usize| {
        let d = (v - origin as i64).rem_euclid(SQUARE as i64);
        d <= 3 || d >= SQUARE as i64 - 3
    };
    near_line(x, BOARD_X.0) || near_line(y, BOARD_Y.0)
}

#[test]
fn checkerboard_scenario() -> Result<(), PipelineError> {
    let frame = checkerboard_frame()?;
    let options = scenario_options();

    let result = enhance(frame.clone(), &options);
    assert!(!result.is_degraded(), "{:?}", result.degraded);
    assert_eq!(result.initial_quality, assess_quality(&frame));
    assert!(
        result.quality_score > result.initial_quality,
        "quality {} -> {}",
        result.initial_quality,
        result.quality_score
    );
    assert!(result.edge_pixel_count.unwrap_or(0) > 0);
    assert_eq!(
        result.stages_applied,
        vec![
            "denoise",
            "adaptive_contrast",
            "edge_highlight",
            "measurement_overlay"
        ]
    );

    let scale = scale_for(20.0, 35.0)?;
    let overlay = result.overlay.as_ref().expect("overlay drawn");
    let expected = 2 * scale.pixels_for_reference as i64;
    assert!((overlay.scale_bar_length() - expected).abs() <= 1);
    assert_eq!(overlay.grid_cell, Some((80, 60)));
    assert_relative_eq!(result.metadata.meters_per_pixel, scale.meters_per_pixel);
    Ok(())
}

#[test]
fn edge_signal_sits_on_board_boundaries() -> Result<(), PipelineError> {
    let frame = checkerboard_frame()?;
    let with_edges = ProcessingOptions {
        add_measurement_grid: false,
        ..scenario_options()
    };
    let without_edges = ProcessingOptions {
        enhance_edges: false,
        ..with_edges.clone()
    };

    let a = enhance(frame.clone(), &with_edges);
    let b = enhance(frame, &without_edges);

    let mut changed = 0;
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            if a.buffer.pixel(x, y) != b.buffer.pixel(x, y) {
                changed += 1;
                assert!(near_board_boundary(x, y), "edge pixel at ({x}, {y})");
            }
        }
    }
    assert!(changed > 0);
    assert!(changed <= a.edge_pixel_count.unwrap_or(0));
    Ok(())
}

#[test]
fn framing_example_fits() -> Result<(), roofsight_framing::FramingError> {
    let zoom = zoom_for_angle(30.0, 20.0, 90.0, 45.0, 35.0, 1200, 800, 0.85)?;
    assert!((17..=22).contains(&zoom));
    assert!(validate_fit(30.0, 20.0, zoom, 35.0, 1200, 800)?.fits);
    Ok(())
}

#[test]
fn degraded_run_returns_input() -> Result<(), PipelineError> {
    let frame = checkerboard_frame()?;
    let options = ProcessingOptions {
        dimensions: Dimensions {
            width: 1 << 20,
            height: 600,
        },
        ..scenario_options()
    };
    let result = enhance(frame.clone(), &options);
    assert!(result.is_degraded());
    assert_eq!(result.quality_score, 0);
    assert_eq!(result.buffer, frame);
    Ok(())
}

#[test]
fn random_frames_run_clean() -> Result<(), PipelineError> {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..4 {
        let width = rng.random_range(1..64);
        let height = rng.random_range(1..64);
        let data = (0..width * height * 4).map(|_| rng.random::<u8>()).collect();
        let frame = PixelBuffer::new(ImageSize { width, height }, data)?;

        let options = ProcessingOptions {
            dimensions: Dimensions {
                width: rng.random_range(1..96),
                height: rng.random_range(1..96),
            },
            latitude: rng.random_range(-85.0..85.0),
            zoom: rng.random_range(17.0..22.0),
            ..Default::default()
        };
        let result = enhance(frame, &options);
        assert!(!result.is_degraded());
        assert!(result.quality_score <= 100);
        assert_eq!(
            result.buffer.size(),
            ImageSize {
                width: options.dimensions.width,
                height: options.dimensions.height
            }
        );
    }
    Ok(())
}
