use serde::{Deserialize, Serialize};

use crate::error::FramingError;

/// Side length assumed when nothing is known about a property, in meters.
pub const DEFAULT_SIDE_M: f64 = 40.0;

/// Margin added around a footprint derived from a building area.
pub const AREA_MARGIN: f64 = 1.2;

/// Bounding box of a property footprint in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySize {
    /// East-west extent in meters.
    pub width_m: f64,
    /// North-south extent in meters.
    pub height_m: f64,
}

impl Default for PropertySize {
    fn default() -> Self {
        Self::default_estimate()
    }
}

impl PropertySize {
    /// Create a validated footprint.
    ///
    /// # Errors
    ///
    /// Returns an error if either side is not a positive finite number.
    pub fn new(width_m: f64, height_m: f64) -> Result<Self, FramingError> {
        let size = Self { width_m, height_m };
        size.validate()?;
        Ok(size)
    }

    /// Typical single-family lot used when no building data is available.
    pub fn default_estimate() -> Self {
        Self {
            width_m: DEFAULT_SIDE_M,
            height_m: DEFAULT_SIDE_M,
        }
    }

    /// Square footprint derived from a building's ground area in m².
    ///
    /// Each side is `ceil(sqrt(area) * 1.2)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the area is not a positive finite number.
    pub fn from_building_area(area_m2: f64) -> Result<Self, FramingError> {
        if !area_m2.is_finite() || area_m2 <= 0.0 {
            return Err(FramingError::InvalidDimension {
                name: "building area",
                value: area_m2,
            });
        }
        let side = (area_m2.sqrt() * AREA_MARGIN).ceil();
        Ok(Self {
            width_m: side,
            height_m: side,
        })
    }

    /// Check both sides are positive and finite.
    ///
    /// # Errors
    ///
    /// Returns the first offending side.
    pub fn validate(&self) -> Result<(), FramingError> {
        for (name, value) in [("property width", self.width_m), ("property height", self.height_m)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(FramingError::InvalidDimension { name, value });
            }
        }
        Ok(())
    }

    /// Longer of the two sides.
    pub fn longest_side(&self) -> f64 {
        self.width_m.max(self.height_m)
    }
}
