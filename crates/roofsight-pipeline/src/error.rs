/// An error type for the pipeline module.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// No raster surface of the requested size can be allocated.
    #[error("Cannot acquire a {width}x{height} raster surface (limit {limit} px per side)")]
    SurfaceUnavailable {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
        /// Largest supported side.
        limit: usize,
    },

    /// Error to create or process an image.
    #[error("Failed to process the image. {0}")]
    ImageError(#[from] roofsight_image::ImageError),

    /// Invalid geometric input.
    #[error("Invalid framing input. {0}")]
    FramingError(#[from] roofsight_framing::FramingError),

    /// The payload is not valid base64.
    #[error("Failed to decode base64 payload. {0}")]
    Base64Error(#[from] base64::DecodeError),

    /// The payload is a data URL without a base64 body.
    #[error("Unsupported data URL: {0}")]
    UnsupportedDataUrl(String),

    /// Error to decode or encode an image file.
    #[error("Failed to decode or encode the image. {0}")]
    CodecError(#[from] image::ImageError),

    /// Error to parse or write configuration.
    #[error("Invalid configuration. {0}")]
    ConfigError(#[from] serde_json::Error),

    /// Error to read or write a file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),
}
