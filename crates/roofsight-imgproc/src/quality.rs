use rayon::prelude::*;

use roofsight_image::PixelBuffer;

/// Local contrast above which a pixel counts as sharp.
pub const SHARP_CONTRAST: u32 = 10;

/// Brightness below which a pixel counts as dark.
pub const DARK_BRIGHTNESS: u32 = 80;

/// Average local contrast that maps to a full contrast score.
const FULL_CONTRAST: f64 = 50.0;

#[derive(Default, Clone, Copy)]
struct QualityStats {
    // sums are kept in units of r+g+b so the accumulation stays exact
    contrast: u64,
    sharp: u64,
    dark: u64,
}

impl std::ops::Add for QualityStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            contrast: self.contrast + rhs.contrast,
            sharp: self.sharp + rhs.sharp,
            dark: self.dark + rhs.dark,
        }
    }
}

/// Score a buffer from 0 to 100 for contrast, sharpness and brightness.
///
/// For every interior pixel the local contrast is the sum of absolute
/// brightness differences to its 4-neighbours. The score blends:
///
/// - 40% average local contrast, saturating at 50,
/// - 40% fraction of pixels whose local contrast exceeds [`SHARP_CONTRAST`],
/// - 20% fraction of pixels not darker than [`DARK_BRIGHTNESS`].
///
/// Buffers without interior pixels score 0.
pub fn assess_quality(img: &PixelBuffer) -> u8 {
    let (width, height) = (img.width(), img.height());
    if width < 3 || height < 3 {
        return 0;
    }

    let sums: Vec<u32> = img
        .as_slice()
        .chunks_exact(4)
        .map(|px| px[0] as u32 + px[1] as u32 + px[2] as u32)
        .collect();

    let stats = (1..height - 1)
        .into_par_iter()
        .map(|y| {
            let mut stats = QualityStats::default();
            for x in 1..width - 1 {
                let idx = y * width + x;
                let center = sums[idx];
                let contrast = center.abs_diff(sums[idx - width])
                    + center.abs_diff(sums[idx + width])
                    + center.abs_diff(sums[idx - 1])
                    + center.abs_diff(sums[idx + 1]);

                stats.contrast += contrast as u64;
                if contrast > SHARP_CONTRAST * 3 {
                    stats.sharp += 1;
                }
                if center < DARK_BRIGHTNESS * 3 {
                    stats.dark += 1;
                }
            }
            stats
        })
        .reduce(QualityStats::default, |a, b| a + b);

    let count = ((width - 2) * (height - 2)) as f64;
    let avg_contrast = stats.contrast as f64 / 3.0 / count;
    let sharp_ratio = stats.sharp as f64 / count;
    let dark_ratio = stats.dark as f64 / count;

    let contrast_score = (avg_contrast / FULL_CONTRAST * 100.0).min(100.0);
    let score = contrast_score * 0.4 + sharp_ratio * 100.0 * 0.4 + (1.0 - dark_ratio) * 100.0 * 0.2;

    score.round().clamp(0.0, 100.0) as u8
}
