use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use roofsight_image::PixelBuffer;
use roofsight_imgproc::overlay::OverlayLayout;

use crate::options::ProcessingOptions;

/// Capture context attached to an enhanced image for downstream inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    /// Milliseconds since the Unix epoch when the run finished.
    pub timestamp: u64,
    /// Map zoom level.
    pub zoom: f64,
    /// Camera tilt in degrees.
    pub tilt: f64,
    /// Camera heading in degrees.
    pub heading: f64,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Ground resolution of the capture.
    pub meters_per_pixel: f64,
    /// Options the run was made with.
    pub processing_options: ProcessingOptions,
    /// Final quality score, 0 to 100.
    pub image_quality: u8,
}

impl ImageMetadata {
    pub(crate) fn new(options: &ProcessingOptions, meters_per_pixel: f64, image_quality: u8) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            timestamp,
            zoom: options.zoom,
            tilt: options.tilt,
            heading: options.heading,
            lat: options.latitude,
            lng: options.longitude,
            meters_per_pixel,
            processing_options: options.clone(),
            image_quality,
        }
    }
}

/// Output of one enhancement run.
#[derive(Debug, Clone)]
pub struct EnhancementResult {
    /// The enhanced image, or the untouched input when the run degraded.
    pub buffer: PixelBuffer,
    /// Capture context for the downstream consumer.
    pub metadata: ImageMetadata,
    /// Quality score after enhancement, 0 to 100.
    pub quality_score: u8,
    /// Quality score of the working surface before any stage ran.
    pub initial_quality: u8,
    /// Names of the stages that ran, in order.
    pub stages_applied: Vec<&'static str>,
    /// Number of edge pixels blended in, when edges were enhanced.
    pub edge_pixel_count: Option<usize>,
    /// Geometry of the measurement overlay, when drawn.
    pub overlay: Option<OverlayLayout>,
    /// Why the run fell back to returning its input, if it did.
    pub degraded: Option<String>,
}

impl EnhancementResult {
    pub(crate) fn degraded(
        buffer: PixelBuffer,
        options: &ProcessingOptions,
        meters_per_pixel: f64,
        reason: String,
    ) -> Self {
        log::warn!("enhancement degraded: {}", reason);
        Self {
            buffer,
            metadata: ImageMetadata::new(options, meters_per_pixel, 0),
            quality_score: 0,
            initial_quality: 0,
            stages_applied: Vec::new(),
            edge_pixel_count: None,
            overlay: None,
            degraded: Some(reason),
        }
    }

    /// Whether the run fell back to returning its input.
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_json_shape() -> Result<(), serde_json::Error> {
        let options = ProcessingOptions {
            latitude: 35.0,
            longitude: -97.5,
            heading: 90.0,
            ..Default::default()
        };
        let metadata = ImageMetadata::new(&options, 0.122, 77);
        assert!(metadata.timestamp > 0);

        let json = serde_json::to_value(&metadata)?;
        assert_eq!(json["lat"], 35.0);
        assert_eq!(json["lng"], -97.5);
        assert_eq!(json["heading"], 90.0);
        assert_eq!(json["imageQuality"], 77);
        assert_eq!(json["metersPerPixel"], 0.122);
        assert_eq!(json["processingOptions"]["enhanceEdges"], true);
        Ok(())
    }
}
