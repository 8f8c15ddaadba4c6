use roofsight_image::{Image, PixelBuffer};
use roofsight_imgproc::{edges, enhance, filter};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::options::ProcessingOptions;

/// What a stage reported after running.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StageOutcome {
    /// Number of pixels the stage selected, for stages that select pixels.
    pub pixels_affected: Option<usize>,
}

/// One in-place transform of the working surface.
pub trait EnhancementStage: Send + Sync {
    /// Short name used in logs and results.
    fn name(&self) -> &'static str;

    /// Transform `img` in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage cannot allocate its intermediates.
    fn apply(&self, img: &mut PixelBuffer) -> Result<StageOutcome, PipelineError>;
}

/// Box blur against sensor and compression noise.
pub struct Denoise {
    /// Blur radius.
    pub radius: usize,
}

impl EnhancementStage for Denoise {
    fn name(&self) -> &'static str {
        "denoise"
    }

    fn apply(&self, img: &mut PixelBuffer) -> Result<StageOutcome, PipelineError> {
        filter::box_blur(img, self.radius);
        Ok(StageOutcome::default())
    }
}

/// Lifts dark, unsaturated pixels.
pub struct ShadowCompensation;

impl EnhancementStage for ShadowCompensation {
    fn name(&self) -> &'static str {
        "shadow_compensation"
    }

    fn apply(&self, img: &mut PixelBuffer) -> Result<StageOutcome, PipelineError> {
        let lifted = enhance::compensate_shadows(img);
        Ok(StageOutcome {
            pixels_affected: Some(lifted),
        })
    }
}

/// Unsharp masking.
pub struct Sharpen {
    /// Radius of the low-pass blur.
    pub radius: usize,
    /// Strength of the boost.
    pub amount: f32,
}

impl EnhancementStage for Sharpen {
    fn name(&self) -> &'static str {
        "sharpen"
    }

    fn apply(&self, img: &mut PixelBuffer) -> Result<StageOutcome, PipelineError> {
        filter::unsharp_mask(img, self.radius, self.amount);
        Ok(StageOutcome::default())
    }
}

/// Contrast curve chosen from the brightness spread.
pub struct AdaptiveContrast {
    /// Multiplier on the chosen boost.
    pub gain: f32,
}

impl EnhancementStage for AdaptiveContrast {
    fn name(&self) -> &'static str {
        "adaptive_contrast"
    }

    fn apply(&self, img: &mut PixelBuffer) -> Result<StageOutcome, PipelineError> {
        let contrast = enhance::adaptive_contrast(img, self.gain);
        log::debug!("applied contrast {:.1}", contrast);
        Ok(StageOutcome::default())
    }
}

/// Canny edges blended additively onto the image.
pub struct EdgeHighlight {
    /// Edge detector thresholds.
    pub params: edges::CannyParams,
    /// Fraction of the edge mask added.
    pub intensity: f32,
}

impl EnhancementStage for EdgeHighlight {
    fn name(&self) -> &'static str {
        "edge_highlight"
    }

    fn apply(&self, img: &mut PixelBuffer) -> Result<StageOutcome, PipelineError> {
        let mut mask = Image::<u8, 1>::from_size_val(img.size(), 0)?;
        let count = edges::canny(img, &mut mask, &self.params)?;
        enhance::blend_edges(img, &mask, self.intensity)?;
        Ok(StageOutcome {
            pixels_affected: Some(count),
        })
    }
}

/// The stages a run executes, in order.
///
/// Denoising always runs first; the others follow the option flags in the
/// order shadows, sharpening, contrast, edges.
pub fn build_stages(
    config: &PipelineConfig,
    options: &ProcessingOptions,
) -> Vec<Box<dyn EnhancementStage>> {
    let mut stages: Vec<Box<dyn EnhancementStage>> = vec![Box::new(Denoise {
        radius: config.denoise_radius,
    })];

    if options.compensate_shadows {
        stages.push(Box::new(ShadowCompensation));
    }
    if options.sharpen_image {
        stages.push(Box::new(Sharpen {
            radius: config.sharpen_radius,
            amount: config.sharpen_amount,
        }));
    }
    if options.enhance_contrast {
        stages.push(Box::new(AdaptiveContrast {
            gain: config.contrast_gain,
        }));
    }
    if options.enhance_edges {
        stages.push(Box::new(EdgeHighlight {
            params: config.canny_params(),
            intensity: config.edge_intensity,
        }));
    }

    stages
}
