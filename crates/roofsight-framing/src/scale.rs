use serde::{Deserialize, Serialize};

use crate::error::FramingError;

/// Ground resolution of a 256 px Web-Mercator tile at zoom 0 on the equator, in meters per pixel.
pub const EQUATOR_METERS_PER_PIXEL: f64 = 156_543.033_92;

/// Distance used for the reference scale, in meters.
pub const REFERENCE_DISTANCE_M: f64 = 10.0;

/// Highest zoom level any tile provider serves.
pub const MAX_ZOOM: f64 = 30.0;

/// Largest absolute latitude accepted by callers that clamp instead of failing.
pub const MAX_LATITUDE: f64 = 89.9;

/// Real-world scale of a capture.
///
/// Derived once per run from `(zoom, latitude)` and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleInfo {
    /// Ground distance covered by one pixel.
    pub meters_per_pixel: f64,
    /// Pixels spanning [`REFERENCE_DISTANCE_M`], rounded to the nearest integer.
    #[serde(rename = "pixelsFor10m")]
    pub pixels_for_reference: i32,
}

impl ScaleInfo {
    /// Unrounded number of pixels covering `meters` of ground.
    pub fn pixels_for(&self, meters: f64) -> f64 {
        meters / self.meters_per_pixel
    }
}

/// Web-Mercator ground resolution without input validation.
///
/// `meters_per_pixel = 156543.03392 * cos(latitude) / 2^zoom`
///
/// Latitudes of ±90° produce a degenerate resolution; use [`scale_for`] to
/// reject them.
pub fn meters_per_pixel(zoom: f64, latitude: f64) -> f64 {
    EQUATOR_METERS_PER_PIXEL * latitude.to_radians().cos() / 2f64.powf(zoom)
}

/// Fractional zoom level at which one pixel covers `meters_per_pixel` of ground.
pub(crate) fn zoom_for_resolution(meters_per_pixel: f64, latitude: f64) -> f64 {
    (EQUATOR_METERS_PER_PIXEL * latitude.to_radians().cos() / meters_per_pixel).log2()
}

/// Clamp a latitude into `[-89.9, 89.9]`, mapping `NaN` to the equator.
pub fn clamp_latitude(latitude: f64) -> f64 {
    if latitude.is_nan() {
        return 0.0;
    }
    latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE)
}

pub(crate) fn check_latitude(latitude: f64) -> Result<(), FramingError> {
    if !latitude.is_finite() || latitude.abs() >= 90.0 {
        return Err(FramingError::InvalidLatitude(latitude));
    }
    Ok(())
}

/// Compute the scale of a capture at `zoom` and `latitude` (degrees).
///
/// # Errors
///
/// Returns an error when the latitude is not strictly inside (-90, 90) or the
/// zoom is outside `[0, 30]`.
///
/// # Example
///
/// ```
/// use roofsight_framing::scale_for;
///
/// let scale = scale_for(20.0, 0.0).unwrap();
/// assert!((scale.meters_per_pixel - 0.1493).abs() < 1e-4);
/// assert_eq!(scale.pixels_for_reference, 67);
/// ```
pub fn scale_for(zoom: f64, latitude: f64) -> Result<ScaleInfo, FramingError> {
    check_latitude(latitude)?;
    if !(0.0..=MAX_ZOOM).contains(&zoom) {
        return Err(FramingError::InvalidZoom(zoom));
    }

    let mut scale = ScaleInfo {
        meters_per_pixel: meters_per_pixel(zoom, latitude),
        pixels_for_reference: 0,
    };
    scale.pixels_for_reference = scale.pixels_for(REFERENCE_DISTANCE_M).round() as i32;
    Ok(scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn scale_at_equator() -> Result<(), FramingError> {
        let scale = scale_for(20.0, 0.0)?;
        assert_relative_eq!(
            scale.meters_per_pixel,
            EQUATOR_METERS_PER_PIXEL / 1_048_576.0,
            epsilon = 1e-12
        );
        assert_eq!(scale.pixels_for_reference, 67);
        Ok(())
    }

    #[test]
    fn scale_positive_and_decreasing_in_zoom() -> Result<(), FramingError> {
        let mut latitude = -84.5;
        while latitude < 85.0 {
            let mut previous = f64::INFINITY;
            for zoom in 17..=22 {
                let scale = scale_for(zoom as f64, latitude)?;
                assert!(scale.meters_per_pixel > 0.0);
                assert!(scale.meters_per_pixel < previous);
                previous = scale.meters_per_pixel;
            }
            latitude += 0.5;
        }
        Ok(())
    }

    #[test]
    fn scale_halves_per_zoom_level() -> Result<(), FramingError> {
        let a = scale_for(18.0, 35.0)?;
        let b = scale_for(19.0, 35.0)?;
        assert_relative_eq!(a.meters_per_pixel / b.meters_per_pixel, 2.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn scale_rejects_poles() {
        assert_eq!(scale_for(20.0, 90.0), Err(FramingError::InvalidLatitude(90.0)));
        assert_eq!(
            scale_for(20.0, -90.0),
            Err(FramingError::InvalidLatitude(-90.0))
        );
        assert!(scale_for(20.0, f64::NAN).is_err());
        assert!(scale_for(f64::INFINITY, 10.0).is_err());
    }

    #[test]
    fn scale_rejects_zoom_beyond_tiles() -> Result<(), FramingError> {
        assert_eq!(scale_for(40.0, 35.0), Err(FramingError::InvalidZoom(40.0)));
        assert_eq!(scale_for(1100.0, 35.0), Err(FramingError::InvalidZoom(1100.0)));
        assert_eq!(scale_for(-1.0, 35.0), Err(FramingError::InvalidZoom(-1.0)));

        // the bounds themselves are served
        let top = scale_for(MAX_ZOOM, 35.0)?;
        assert!(top.meters_per_pixel > 0.0);
        assert!(top.pixels_for_reference < i32::MAX);
        assert!(scale_for(0.0, 35.0)?.pixels_for_reference >= 0);
        Ok(())
    }

    #[test]
    fn pixels_for_scales_linearly() -> Result<(), FramingError> {
        let scale = scale_for(19.0, 35.0)?;
        assert_relative_eq!(scale.pixels_for(20.0), 2.0 * scale.pixels_for(10.0), epsilon = 1e-9);
        assert_eq!(scale.pixels_for(10.0).round() as i32, scale.pixels_for_reference);
        Ok(())
    }

    #[test]
    fn resolution_inverts_zoom() {
        let mpp = meters_per_pixel(19.25, 42.0);
        assert_relative_eq!(zoom_for_resolution(mpp, 42.0), 19.25, epsilon = 1e-9);
    }

    #[test]
    fn latitude_clamping() {
        assert_eq!(clamp_latitude(95.0), MAX_LATITUDE);
        assert_eq!(clamp_latitude(-90.0), -MAX_LATITUDE);
        assert_eq!(clamp_latitude(35.0), 35.0);
        assert_eq!(clamp_latitude(f64::NAN), 0.0);
    }

    #[test]
    fn scale_serializes_for_downstream() -> Result<(), Box<dyn std::error::Error>> {
        let scale = scale_for(20.0, 0.0)?;
        let json = serde_json::to_value(scale)?;
        assert_eq!(json["pixelsFor10m"], 67);
        assert!(json["metersPerPixel"].is_number());
        Ok(())
    }
}
