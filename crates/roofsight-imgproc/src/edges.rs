use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use roofsight_image::{Image, ImageError, PixelBuffer};

use crate::{color, parallel};

/// Thresholds of the hysteresis step of [`canny`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CannyParams {
    /// Gradient magnitude above which a pixel is a weak edge.
    pub low: f32,
    /// Gradient magnitude above which a pixel is a strong edge.
    pub high: f32,
}

impl Default for CannyParams {
    fn default() -> Self {
        Self {
            low: 30.0,
            high: 80.0,
        }
    }
}

fn check_size<const C1: usize, const C2: usize>(
    a: &Image<impl Copy, C1>,
    b: &Image<impl Copy, C2>,
) -> Result<(), ImageError> {
    if a.size() != b.size() {
        return Err(ImageError::InvalidImageSize(
            a.width(),
            a.height(),
            b.width(),
            b.height(),
        ));
    }
    Ok(())
}

/// Compute the 3x3 Sobel gradient of a grayscale image.
///
/// The magnitude is `sqrt(gx² + gy²)` and the direction is `atan2(gy, gx)`
/// in degrees, in `(-180, 180]`. Border pixels are set to zero.
///
/// # Errors
///
/// Returns an error if the three images differ in size.
pub fn sobel(
    src: &Image<f32, 1>,
    magnitude: &mut Image<f32, 1>,
    direction: &mut Image<f32, 1>,
) -> Result<(), ImageError> {
    check_size(src, magnitude)?;
    check_size(src, direction)?;

    let (width, height) = (src.width(), src.height());
    magnitude.as_slice_mut().fill(0.0);
    direction.as_slice_mut().fill(0.0);
    if width < 3 || height < 3 {
        return Ok(());
    }

    let data = src.as_slice();
    let gradient = |x: usize, y: usize| {
        let at = |dx: usize, dy: usize| data[(y + dy - 1) * width + x + dx - 1];
        let gx = -at(0, 0) + at(2, 0) - 2.0 * at(0, 1) + 2.0 * at(2, 1) - at(0, 2) + at(2, 2);
        let gy = -at(0, 0) - 2.0 * at(1, 0) - at(2, 0) + at(0, 2) + 2.0 * at(1, 2) + at(2, 2);
        (gx, gy)
    };

    parallel::par_row_pairs_indexed_mut(magnitude, direction, |y, mag_row, dir_row| {
        if y == 0 || y == height - 1 {
            return;
        }
        for x in 1..width - 1 {
            let (gx, gy) = gradient(x, y);
            mag_row[x] = (gx * gx + gy * gy).sqrt();
            dir_row[x] = gy.atan2(gx).to_degrees();
        }
    });

    Ok(())
}

/// Offsets of the two neighbours lying along a gradient direction in degrees.
fn direction_neighbours(angle: f32, width: isize) -> (isize, isize) {
    if (-22.5..22.5).contains(&angle) || angle >= 157.5 || angle < -157.5 {
        (-1, 1)
    } else if (22.5..67.5).contains(&angle) || (-157.5..-112.5).contains(&angle) {
        (-width + 1, width - 1)
    } else if (67.5..112.5).contains(&angle) || (-112.5..-67.5).contains(&angle) {
        (-width, width)
    } else {
        (-width - 1, width + 1)
    }
}

/// Thin gradient ridges to one pixel by keeping only local maxima along the
/// gradient direction, quantized into 4 bins.
///
/// # Errors
///
/// Returns an error if the three images differ in size.
pub fn non_max_suppression(
    magnitude: &Image<f32, 1>,
    direction: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
) -> Result<(), ImageError> {
    check_size(magnitude, direction)?;
    check_size(magnitude, dst)?;

    let (width, height) = (magnitude.width(), magnitude.height());
    dst.as_slice_mut().fill(0.0);
    if width < 3 || height < 3 {
        return Ok(());
    }

    let mag = magnitude.as_slice();
    let dir = direction.as_slice();

    parallel::par_rows_indexed_mut(dst, |y, row| {
        if y == 0 || y == height - 1 {
            return;
        }
        for (x, out) in row.iter_mut().enumerate().take(width - 1).skip(1) {
            let idx = y * width + x;
            let m = mag[idx];
            if m == 0.0 {
                continue;
            }
            let (a, b) = direction_neighbours(dir[idx], width as isize);
            let n1 = mag[(idx as isize + a) as usize];
            let n2 = mag[(idx as isize + b) as usize];
            if m >= n1 && m >= n2 {
                *out = m;
            }
        }
    });

    Ok(())
}

/// Classify thinned gradients into a binary edge mask with double thresholds.
///
/// Pixels at or above `high` seed the mask; pixels at or above `low` join it
/// when they are 8-connected to a seed through other such pixels. Raising
/// `high` can only remove edges.
///
/// Returns the number of edge pixels.
///
/// # Errors
///
/// Returns an error if `src` and `dst` differ in size.
pub fn hysteresis(
    src: &Image<f32, 1>,
    dst: &mut Image<u8, 1>,
    params: &CannyParams,
) -> Result<usize, ImageError> {
    check_size(src, dst)?;

    let (width, height) = (src.width() as isize, src.height() as isize);
    let values = src.as_slice();
    let is_weak = |v: f32| v > 0.0 && v >= params.low;

    let out = dst.as_slice_mut();
    out.fill(0);

    let mut queue: VecDeque<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, &v)| v > 0.0 && v >= params.high)
        .map(|(i, _)| i)
        .collect();
    for &i in &queue {
        out[i] = 255;
    }

    let mut count = queue.len();
    while let Some(i) = queue.pop_front() {
        let (x, y) = ((i as isize) % width, (i as isize) / width);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= width || ny >= height {
                    continue;
                }
                let n = (ny * width + nx) as usize;
                if out[n] == 0 && is_weak(values[n]) {
                    out[n] = 255;
                    count += 1;
                    queue.push_back(n);
                }
            }
        }
    }

    Ok(count)
}

/// Detect edges with the Canny pipeline: luma, Sobel, non-maximum
/// suppression and hysteresis.
///
/// Returns the number of edge pixels written to `dst` as 255.
///
/// # Errors
///
/// Returns an error if `src` and `dst` differ in size.
pub fn canny(
    src: &PixelBuffer,
    dst: &mut Image<u8, 1>,
    params: &CannyParams,
) -> Result<usize, ImageError> {
    check_size(src, dst)?;

    let size = src.size();
    let mut gray = Image::<f32, 1>::from_size_val(size, 0.0)?;
    color::gray_from_rgba(src, &mut gray)?;

    let mut magnitude = Image::<f32, 1>::from_size_val(size, 0.0)?;
    let mut direction = Image::<f32, 1>::from_size_val(size, 0.0)?;
    sobel(&gray, &mut magnitude, &mut direction)?;

    let mut thin = Image::<f32, 1>::from_size_val(size, 0.0)?;
    non_max_suppression(&magnitude, &direction, &mut thin)?;

    let count = hysteresis(&thin, dst, params)?;
    log::debug!(
        "canny low={} high={}: {} edge pixels",
        params.low,
        params.high,
        count
    );

    Ok(count)
}

/// Broadcast an edge mask into an opaque grayscale RGBA image.
///
/// # Errors
///
/// Returns an error if `src` and `dst` differ in size.
pub fn edge_mask_to_rgba(src: &Image<u8, 1>, dst: &mut PixelBuffer) -> Result<(), ImageError> {
    check_size(src, dst)?;

    parallel::par_iter_rows(src, dst, |mask, px| {
        px.copy_from_slice(&[mask[0], mask[0], mask[0], 255]);
    });

    Ok(())
}
