use std::path::Path;

use serde::{Deserialize, Serialize};

use roofsight_imgproc::{edges::CannyParams, segmentation::KMeansParams};

use crate::error::PipelineError;

/// Tunables of the enhancement pipeline.
///
/// Loadable from a (partial) camelCase JSON file; missing fields keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Radius of the unconditional denoising box blur.
    pub denoise_radius: usize,
    /// Radius of the low-pass blur inside the unsharp mask.
    pub sharpen_radius: usize,
    /// Strength of the unsharp mask.
    pub sharpen_amount: f32,
    /// Multiplier on the adaptive contrast boost.
    pub contrast_gain: f32,
    /// Weak-edge threshold of the edge detector.
    pub canny_low: f32,
    /// Strong-edge threshold of the edge detector.
    pub canny_high: f32,
    /// Fraction of the edge mask added onto the image.
    pub edge_intensity: f32,
    /// Largest working surface side the pipeline will allocate.
    pub max_surface_dimension: usize,
    /// JPEG quality of enhanced output, 1 to 100.
    pub jpeg_quality: u8,
    /// JPEG quality of segmented output, 1 to 100.
    pub segmentation_jpeg_quality: u8,
    /// Parameters of the color segmentation.
    pub segmentation: KMeansParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            denoise_radius: 1,
            sharpen_radius: 2,
            sharpen_amount: 0.8,
            contrast_gain: 1.1,
            canny_low: 25.0,
            canny_high: 90.0,
            edge_intensity: 0.4,
            max_surface_dimension: 16384,
            jpeg_quality: 98,
            segmentation_jpeg_quality: 95,
            segmentation: KMeansParams::default(),
        }
    }
}

impl PipelineConfig {
    /// Read a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&contents)?;
        log::debug!("loaded pipeline config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid configuration.
    pub fn from_json_str(contents: &str) -> Result<Self, PipelineError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Thresholds of the edge detector.
    pub fn canny_params(&self) -> CannyParams {
        CannyParams {
            low: self.canny_low,
            high: self.canny_high,
        }
    }
}
