use roofsight_framing::{clamp_latitude, scale_for};
use roofsight_image::{ImageSize, PixelBuffer};
use roofsight_imgproc::{
    draw::RasterCanvas, overlay, pitch, quality::assess_quality, resize::resize_bilinear,
    segmentation::{self, KMeansParams},
};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::metadata::{EnhancementResult, ImageMetadata};
use crate::options::ProcessingOptions;
use crate::stages::build_stages;

/// Runs the enhancement stages over captured frames.
#[derive(Debug, Clone, Default)]
pub struct Enhancer {
    config: PipelineConfig,
}

impl Enhancer {
    /// Create an enhancer with the given tunables.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The tunables in use.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Copy or resample `source` into a fresh working surface of size `target`.
    fn acquire_surface(
        &self,
        source: &PixelBuffer,
        target: ImageSize,
    ) -> Result<PixelBuffer, PipelineError> {
        let limit = self.config.max_surface_dimension;
        if target.width == 0 || target.height == 0 || target.width > limit || target.height > limit
        {
            return Err(PipelineError::SurfaceUnavailable {
                width: target.width,
                height: target.height,
                limit,
            });
        }

        let mut surface = PixelBuffer::from_size_val(target, 0)?;
        resize_bilinear(source, &mut surface)?;
        Ok(surface)
    }

    /// Enhance a captured frame.
    ///
    /// The source is copied into a working surface of the configured size,
    /// its quality is assessed, it is denoised, and the shadow, sharpen,
    /// contrast and edge stages run as the options request. The measurement
    /// overlay goes on last, then the quality is assessed again.
    ///
    /// Never fails: when no working surface can be acquired, or the scale is
    /// undefined, `buffer` comes back unmodified with a zero score and
    /// [`EnhancementResult::degraded`] set.
    pub fn enhance(&self, buffer: PixelBuffer, options: &ProcessingOptions) -> EnhancementResult {
        let latitude = clamp_latitude(options.latitude);
        let scale = match scale_for(options.zoom, latitude) {
            Ok(scale) => scale,
            Err(err) => return EnhancementResult::degraded(buffer, options, 0.0, err.to_string()),
        };

        let target = options.target_size(buffer.size());
        let mut surface = match self.acquire_surface(&buffer, target) {
            Ok(surface) => surface,
            Err(err) => {
                return EnhancementResult::degraded(
                    buffer,
                    options,
                    scale.meters_per_pixel,
                    err.to_string(),
                )
            }
        };

        let initial_quality = assess_quality(&surface);
        log::debug!("initial quality {} on {}", initial_quality, target);

        let mut stages_applied = Vec::new();
        let mut edge_pixel_count = None;
        for stage in build_stages(&self.config, options) {
            match stage.apply(&mut surface) {
                Ok(outcome) => {
                    log::debug!("stage {} done {:?}", stage.name(), outcome.pixels_affected);
                    if stage.name() == "edge_highlight" {
                        edge_pixel_count = outcome.pixels_affected;
                    }
                    stages_applied.push(stage.name());
                }
                Err(err) => {
                    return EnhancementResult::degraded(
                        buffer,
                        options,
                        scale.meters_per_pixel,
                        format!("stage {} failed: {}", stage.name(), err),
                    )
                }
            }
        }

        let overlay = options.add_measurement_grid.then(|| {
            stages_applied.push("measurement_overlay");
            overlay::render_measurement_overlay(
                &mut RasterCanvas::new(&mut surface),
                &scale,
                options.zoom,
            )
        });

        let quality_score = assess_quality(&surface);
        log::info!(
            "enhanced {} -> {}: quality {} -> {}",
            buffer.size(),
            target,
            initial_quality,
            quality_score
        );

        EnhancementResult {
            buffer: surface,
            metadata: ImageMetadata::new(options, scale.meters_per_pixel, quality_score),
            quality_score,
            initial_quality,
            stages_applied,
            edge_pixel_count,
            overlay,
            degraded: None,
        }
    }

    /// Posterize a frame into its dominant colors using the configured parameters.
    pub fn segment(&self, buffer: &PixelBuffer) -> PixelBuffer {
        segment_roof_colors(buffer, &self.config.segmentation)
    }
}

/// [`Enhancer::enhance`] with the default configuration.
pub fn enhance(buffer: PixelBuffer, options: &ProcessingOptions) -> EnhancementResult {
    Enhancer::default().enhance(buffer, options)
}

/// Posterize a frame into `params.k` colors with k-means.
///
/// Returns an unmodified copy if segmentation fails.
pub fn segment_roof_colors(buffer: &PixelBuffer, params: &KMeansParams) -> PixelBuffer {
    match segmentation::kmeans_segment(buffer, params) {
        Ok(out) => out,
        Err(err) => {
            log::warn!("segmentation failed: {}", err);
            buffer.clone()
        }
    }
}

/// False-color a frame by slope direction and add the pitch legend.
///
/// Returns an unmodified copy if the visualization fails.
pub fn enhance_roof_pitch(buffer: &PixelBuffer) -> PixelBuffer {
    match pitch::enhance_roof_pitch(buffer) {
        Ok(out) => out,
        Err(err) => {
            log::warn!("pitch visualization failed: {}", err);
            buffer.clone()
        }
    }
}
