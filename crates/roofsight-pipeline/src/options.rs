use serde::{Deserialize, Serialize};

use roofsight_image::ImageSize;

/// Size of the working surface in pixels.
///
/// A component of 0 keeps the source image's size along that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Which stages run and the capture geometry of one enhancement call.
///
/// Deserializes from partial camelCase JSON; every missing field takes its
/// default. All five stage flags default to `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcessingOptions {
    /// Detect edges and blend them onto the image.
    pub enhance_edges: bool,
    /// Apply the adaptive contrast curve.
    pub enhance_contrast: bool,
    /// Draw the measurement grid, scale bar and compass.
    pub add_measurement_grid: bool,
    /// Lift dark, unsaturated regions.
    pub compensate_shadows: bool,
    /// Apply unsharp masking.
    pub sharpen_image: bool,
    /// Size of the working surface.
    pub dimensions: Dimensions,
    /// Map zoom level of the capture.
    pub zoom: f64,
    /// Latitude of the capture center in degrees.
    pub latitude: f64,
    /// Longitude of the capture center in degrees.
    pub longitude: f64,
    /// Camera heading in degrees.
    pub heading: f64,
    /// Camera tilt in degrees.
    pub tilt: f64,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            enhance_edges: true,
            enhance_contrast: true,
            add_measurement_grid: true,
            compensate_shadows: true,
            sharpen_image: true,
            dimensions: Dimensions::default(),
            zoom: 20.0,
            latitude: 0.0,
            longitude: 0.0,
            heading: 0.0,
            tilt: 0.0,
        }
    }
}

impl ProcessingOptions {
    /// Options with every optional stage disabled; only denoising runs.
    pub fn minimal() -> Self {
        Self {
            enhance_edges: false,
            enhance_contrast: false,
            add_measurement_grid: false,
            compensate_shadows: false,
            sharpen_image: false,
            ..Default::default()
        }
    }

    /// Size of the working surface for a source of size `source`.
    pub fn target_size(&self, source: ImageSize) -> ImageSize {
        let pick = |requested: usize, fallback: usize| {
            if requested == 0 {
                fallback
            } else {
                requested
            }
        };
        ImageSize {
            width: pick(self.dimensions.width, source.width),
            height: pick(self.dimensions.height, source.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() -> Result<(), serde_json::Error> {
        let options: ProcessingOptions =
            serde_json::from_str(r#"{"sharpenImage": false, "zoom": 19, "dimensions": {"width": 640}}"#)?;
        assert!(!options.sharpen_image);
        assert!(options.enhance_edges);
        assert_eq!(options.zoom, 19.0);
        assert_eq!(
            options.dimensions,
            Dimensions {
                width: 640,
                height: 600
            }
        );
        Ok(())
    }

    #[test]
    fn zero_dimension_keeps_source() {
        let options = ProcessingOptions {
            dimensions: Dimensions {
                width: 0,
                height: 300,
            },
            ..Default::default()
        };
        let target = options.target_size(ImageSize {
            width: 1024,
            height: 768,
        });
        assert_eq!(
            target,
            ImageSize {
                width: 1024,
                height: 300
            }
        );
    }

    #[test]
    fn serializes_camel_case() -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(ProcessingOptions::minimal())?;
        assert_eq!(json["addMeasurementGrid"], false);
        assert_eq!(json["dimensions"]["width"], 800);
        Ok(())
    }
}
