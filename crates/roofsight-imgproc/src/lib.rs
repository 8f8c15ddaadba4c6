#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color conversions and brightness helpers.
pub mod color;

/// drawing context abstraction and raster backend.
pub mod draw;

/// edge detection module.
pub mod edges;

/// image enhancement module.
pub mod enhance;

/// image filtering module.
pub mod filter;

/// bitmap font used for overlay text.
pub mod font;

/// measurement overlay rendering.
pub mod overlay;

/// module containing parallization utilities.
pub mod parallel;

/// roof pitch false coloring.
pub mod pitch;

/// image quality scoring.
pub mod quality;

/// utility functions for resizing images.
pub mod resize;

/// color segmentation module.
pub mod segmentation;
