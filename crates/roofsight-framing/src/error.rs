/// An error type for the framing module.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FramingError {
    /// The latitude is not finite or lies on or beyond a pole.
    #[error("Latitude {0} is outside the supported range (-90, 90)")]
    InvalidLatitude(f64),

    /// A property dimension is not a positive finite number of meters.
    #[error("{name} must be a positive finite number of meters, got {value}")]
    InvalidDimension {
        /// Name of the offending dimension.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The viewport has no pixels.
    #[error("Viewport must be at least 1x1 pixels, got {0}x{1}")]
    InvalidViewport(u32, u32),

    /// The target coverage is not a fraction in (0, 1].
    #[error("Target coverage must be in (0, 1], got {0}")]
    InvalidCoverage(f64),

    /// The zoom range is empty or beyond what tile providers serve.
    #[error("Invalid zoom range {min}..={max}")]
    InvalidZoomRange {
        /// Lower bound.
        min: u8,
        /// Upper bound.
        max: u8,
    },

    /// The zoom level is outside what tile providers serve.
    #[error("Zoom level must be in [0, 30], got {0}")]
    InvalidZoom(f64),

    /// The camera tilt would make the view parallel to the ground.
    #[error("Tilt must be in [0, 90) degrees, got {0}")]
    InvalidTilt(f64),
}
