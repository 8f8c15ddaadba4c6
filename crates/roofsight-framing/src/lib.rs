#![deny(missing_docs)]
//! Web-Mercator ground resolution and zoom/tilt/heading framing for aerial
//! roof captures.
//!
//! Everything in this crate is pure math over primitive inputs. Invalid
//! inputs (latitudes at the poles, non-positive property sizes, empty
//! viewports) are rejected with a [`FramingError`] instead of leaking `NaN`.

/// Error types for the framing module.
pub mod error;

/// Ground resolution for a zoom level and latitude.
pub mod scale;

/// Zoom selection and fit validation.
pub mod framing;

/// Property footprint estimates.
pub mod property;

/// Multi-view capture planning.
pub mod capture;

pub use crate::capture::{CaptureMode, CapturePlan, CaptureView};
pub use crate::error::FramingError;
pub use crate::framing::{
    angle_footprint, optimal_zoom, validate_fit, zoom_for_angle, FitReport, FitWarning,
    Footprint, FramingCalculator, FramingConfig, Viewport, ZoomPlan, ZoomRange,
};
pub use crate::property::PropertySize;
pub use crate::scale::{clamp_latitude, meters_per_pixel, scale_for, ScaleInfo, MAX_ZOOM};
