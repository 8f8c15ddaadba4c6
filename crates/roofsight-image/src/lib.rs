#![deny(missing_docs)]
//! Image types for the roofsight enhancement pipeline.

/// image representation for raster processing.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize, PixelBuffer};
