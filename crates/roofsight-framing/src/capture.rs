use serde::{Deserialize, Serialize};

use crate::error::FramingError;
use crate::framing::{FramingCalculator, Viewport, ZoomPlan};
use crate::property::PropertySize;

/// Compass headings of the four side views, in degrees clockwise from north.
pub const CARDINAL_HEADINGS: [(&str, f64); 4] =
    [("north", 0.0), ("east", 90.0), ("south", 180.0), ("west", 270.0)];

/// Camera tilt of side views in perspective mode, in degrees.
pub const PERSPECTIVE_TILT: f64 = 60.0;

/// Coverage used when cropping tightly around the roof.
pub const TIGHT_CROP_COVERAGE: f64 = 0.95;

/// How side views are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureMode {
    /// Top-down imagery, every view untilted.
    #[default]
    Flat,
    /// 3D imagery, side views tilted towards the horizon.
    Perspective,
}

impl CaptureMode {
    /// Tilt applied to side views.
    pub fn side_tilt(&self) -> f64 {
        match self {
            CaptureMode::Flat => 0.0,
            CaptureMode::Perspective => PERSPECTIVE_TILT,
        }
    }
}

/// One camera position of a capture session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureView {
    /// Short name of the view, e.g. `overhead` or `north`.
    pub label: String,
    /// Compass heading in degrees.
    pub heading: f64,
    /// Tilt from vertical in degrees.
    pub tilt: f64,
    /// Map zoom level.
    pub zoom: u8,
}

/// Camera positions covering a property from above and from every side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturePlan {
    /// Zoom levels of the overhead view.
    pub zoom_plan: ZoomPlan,
    /// Overhead view followed by the cardinal side views.
    pub views: Vec<CaptureView>,
}

impl FramingCalculator {
    /// Plan an overhead view at the detail zoom plus four cardinal side views.
    ///
    /// Side views are cropped tightly and pushed one level closer than the
    /// angle-aware zoom, capped at the provider's maximum.
    ///
    /// # Errors
    ///
    /// Propagates invalid property, latitude or viewport errors.
    pub fn plan_capture(
        &self,
        property: &PropertySize,
        latitude: f64,
        viewport: Viewport,
        mode: CaptureMode,
    ) -> Result<CapturePlan, FramingError> {
        property.validate()?;

        let zoom_plan = self.optimal_zoom(
            property.width_m,
            property.height_m,
            latitude,
            viewport,
            TIGHT_CROP_COVERAGE,
        )?;

        let mut views = Vec::with_capacity(1 + CARDINAL_HEADINGS.len());
        views.push(CaptureView {
            label: "overhead".to_string(),
            heading: 0.0,
            tilt: 0.0,
            zoom: zoom_plan.detail_zoom(),
        });

        let tilt = mode.side_tilt();
        for (label, heading) in CARDINAL_HEADINGS {
            let zoom = self.zoom_for_angle(
                property.width_m,
                property.height_m,
                heading,
                tilt,
                latitude,
                viewport,
                TIGHT_CROP_COVERAGE,
            )?;
            views.push(CaptureView {
                label: label.to_string(),
                heading,
                tilt,
                zoom: zoom.saturating_add(1).min(self.config().zoom_range.max),
            });
        }

        log::debug!("capture plan with {} views ({:?})", views.len(), mode);

        Ok(CapturePlan { zoom_plan, views })
    }
}
