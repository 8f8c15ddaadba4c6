#![deny(missing_docs)]
//! Sequences the roofsight filters into a best-effort enhancement pipeline.
//!
//! A run takes an owned [`PixelBuffer`](roofsight_image::PixelBuffer) and a
//! [`ProcessingOptions`] record and always produces an [`EnhancementResult`].
//! When no working surface can be acquired the input comes back untouched
//! with a zero score and a diagnostic, so a capture workflow is never blocked.

/// Base64, data URL and image file encoding.
pub mod codec;

/// Tunables of the pipeline.
pub mod config;

/// Entry points working on encoded images.
pub mod encoded;

/// The orchestrator.
pub mod enhancer;

/// Error types for the pipeline module.
pub mod error;

/// Metadata and results of a run.
pub mod metadata;

/// Per-run processing options.
pub mod options;

/// The individual enhancement stages.
pub mod stages;

pub use crate::config::PipelineConfig;
pub use crate::encoded::{
    enhance_encoded, enhance_pitch_encoded, segment_encoded, EncodedEnhancement,
};
pub use crate::enhancer::{enhance, enhance_roof_pitch, segment_roof_colors, Enhancer};
pub use crate::error::PipelineError;
pub use crate::metadata::{EnhancementResult, ImageMetadata};
pub use crate::options::{Dimensions, ProcessingOptions};
pub use crate::stages::{EnhancementStage, StageOutcome};
