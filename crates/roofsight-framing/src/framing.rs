use serde::{Deserialize, Serialize};

use crate::error::FramingError;
use crate::scale::{check_latitude, meters_per_pixel, zoom_for_resolution, MAX_ZOOM};

/// Inclusive range of zoom levels served by the map provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomRange {
    /// Most zoomed-out level used for roof captures.
    pub min: u8,
    /// Most zoomed-in level the provider renders.
    pub max: u8,
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self { min: 17, max: 22 }
    }
}

impl ZoomRange {
    /// Create a validated zoom range.
    ///
    /// # Errors
    ///
    /// Returns an error if `min > max` or `max` exceeds 30.
    pub fn new(min: u8, max: u8) -> Result<Self, FramingError> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    fn validate(&self) -> Result<(), FramingError> {
        if self.min > self.max || self.max as f64 > MAX_ZOOM {
            return Err(FramingError::InvalidZoomRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Round a fractional zoom and clamp it into the range.
    pub fn clamp(&self, zoom: f64) -> u8 {
        if zoom.is_nan() {
            return self.min;
        }
        zoom.round().clamp(self.min as f64, self.max as f64) as u8
    }

    /// Whether `zoom` lies inside the range.
    pub fn contains(&self, zoom: u8) -> bool {
        (self.min..=self.max).contains(&zoom)
    }
}

/// Pixel extent of the map surface that renders the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
        }
    }
}

impl Viewport {
    /// Create a viewport of `width` x `height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Length of the shorter side in pixels.
    pub fn shorter_side(&self) -> u32 {
        self.width.min(self.height)
    }

    fn validate(&self) -> Result<(), FramingError> {
        if self.width == 0 || self.height == 0 {
            return Err(FramingError::InvalidViewport(self.width, self.height));
        }
        Ok(())
    }
}

/// Tunables of the framing calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FramingConfig {
    /// Zoom levels the provider can render.
    pub zoom_range: ZoomRange,
    /// Viewport used when the caller does not supply one.
    pub viewport: Viewport,
    /// Fraction of the frame the property should fill in [`FramingCalculator::optimal_zoom`].
    pub target_coverage: f64,
    /// Fraction of the frame the property should fill for angled views.
    pub angle_coverage: f64,
    /// Coverage below which a fit is reported as too loose.
    pub loose_coverage: f64,
    /// Coverage above which a fit is reported as too tight.
    pub tight_coverage: f64,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            zoom_range: ZoomRange::default(),
            viewport: Viewport::default(),
            target_coverage: 0.7,
            angle_coverage: 0.85,
            loose_coverage: 0.3,
            tight_coverage: 0.9,
        }
    }
}

/// Zoom levels chosen for a property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomPlan {
    /// Zoom at which the property fills the target coverage.
    pub optimal_zoom: u8,
    /// Widely spread `[context, detail]` levels around the optimum.
    pub zoom_levels: [u8; 2],
    /// Ground resolution at the optimal zoom.
    pub meters_per_pixel: f64,
}

impl ZoomPlan {
    /// Zoomed-out level showing the surroundings.
    pub fn context_zoom(&self) -> u8 {
        self.zoom_levels[0]
    }

    /// Zoomed-in level showing roof detail.
    pub fn detail_zoom(&self) -> u8 {
        self.zoom_levels[1]
    }
}

/// Advisory attached to a [`FitReport`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FitWarning {
    /// The footprint exceeds the visible ground extent.
    DoesNotFit {
        /// Footprint width in meters.
        property_width: f64,
        /// Footprint height in meters.
        property_height: f64,
        /// Zoom that was checked.
        zoom: u8,
        /// Visible ground width in meters.
        visible_width: f64,
        /// Visible ground height in meters.
        visible_height: f64,
    },
    /// The footprint fills too little of the frame.
    TooLoose {
        /// Coverage fraction.
        coverage: f64,
    },
    /// The footprint fills almost all of the frame.
    TooTight {
        /// Coverage fraction.
        coverage: f64,
    },
}

impl std::fmt::Display for FitWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitWarning::DoesNotFit {
                property_width,
                property_height,
                zoom,
                visible_width,
                visible_height,
            } => write!(
                f,
                "Property ({property_width}m x {property_height}m) won't fit in frame at zoom {zoom}. Visible area: {visible_width:.0}m x {visible_height:.0}m"
            ),
            FitWarning::TooLoose { coverage } => write!(
                f,
                "Property only fills {:.0}% of frame - consider zooming in",
                coverage * 100.0
            ),
            FitWarning::TooTight { coverage } => write!(
                f,
                "Property fills {:.0}% of frame - may be too tight, consider zooming out",
                coverage * 100.0
            ),
        }
    }
}

/// Result of checking a footprint against the visible ground extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitReport {
    /// Whether both footprint sides fit inside the visible extent.
    pub fits: bool,
    /// Largest of the width and height coverage fractions.
    pub coverage: f64,
    /// Advisory when the fit fails, is too loose or too tight.
    pub warning: Option<FitWarning>,
}

impl FitReport {
    /// Coverage expressed in percent.
    pub fn coverage_percent(&self) -> f64 {
        self.coverage * 100.0
    }
}

/// Footprint of a property as seen from a compass heading and camera tilt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    /// Extent across the view direction, in meters.
    pub apparent_width: f64,
    /// Extent along the view direction, in meters.
    pub apparent_depth: f64,
    /// Depth inflated by `1 / cos(tilt)` for perspective foreshortening.
    pub effective_depth: f64,
}

/// Rotate a `width` x `height` footprint by `heading_deg` and inflate its depth for `tilt_deg`.
pub fn angle_footprint(width: f64, height: f64, heading_deg: f64, tilt_deg: f64) -> Footprint {
    let (sin_h, cos_h) = heading_deg.to_radians().sin_cos();
    let apparent_width = (width * cos_h).abs() + (height * sin_h).abs();
    let apparent_depth = (width * sin_h).abs() + (height * cos_h).abs();

    let effective_depth = if tilt_deg > 0.0 {
        apparent_depth / tilt_deg.to_radians().cos()
    } else {
        apparent_depth
    };

    Footprint {
        apparent_width,
        apparent_depth,
        effective_depth,
    }
}

fn check_dimension(name: &'static str, value: f64) -> Result<(), FramingError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(FramingError::InvalidDimension { name, value });
    }
    Ok(())
}

fn check_coverage(coverage: f64) -> Result<(), FramingError> {
    if !(coverage > 0.0 && coverage <= 1.0) {
        return Err(FramingError::InvalidCoverage(coverage));
    }
    Ok(())
}

/// Chooses zoom levels that frame a property of known size.
#[derive(Debug, Clone, Default)]
pub struct FramingCalculator {
    config: FramingConfig,
}

impl FramingCalculator {
    /// Create a calculator with validated tunables.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid zoom range, viewport or coverage.
    pub fn new(config: FramingConfig) -> Result<Self, FramingError> {
        config.zoom_range.validate()?;
        config.viewport.validate()?;
        check_coverage(config.target_coverage)?;
        check_coverage(config.angle_coverage)?;
        check_coverage(config.loose_coverage)?;
        check_coverage(config.tight_coverage)?;
        Ok(Self { config })
    }

    /// The tunables in use.
    pub fn config(&self) -> &FramingConfig {
        &self.config
    }

    /// Zoom at which `required_meters` of ground span the viewport's shorter side.
    fn fitting_zoom(&self, required_meters: f64, latitude: f64, viewport: Viewport) -> u8 {
        let required_mpp = required_meters / viewport.shorter_side() as f64;
        self.config
            .zoom_range
            .clamp(zoom_for_resolution(required_mpp, latitude))
    }

    fn fit(&self, width: f64, height: f64, zoom: u8, latitude: f64, viewport: Viewport) -> FitReport {
        let mpp = meters_per_pixel(zoom as f64, latitude);
        let visible_width = viewport.width as f64 * mpp;
        let visible_height = viewport.height as f64 * mpp;

        let fits = width <= visible_width && height <= visible_height;
        let coverage = (width / visible_width).max(height / visible_height);

        let warning = if !fits {
            Some(FitWarning::DoesNotFit {
                property_width: width,
                property_height: height,
                zoom,
                visible_width,
                visible_height,
            })
        } else if coverage < self.config.loose_coverage {
            Some(FitWarning::TooLoose { coverage })
        } else if coverage > self.config.tight_coverage {
            Some(FitWarning::TooTight { coverage })
        } else {
            None
        };

        FitReport {
            fits,
            coverage,
            warning,
        }
    }

    /// Choose the zoom at which the property's bounding box fills about
    /// `coverage` of the viewport's shorter side.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive dimensions, an invalid latitude,
    /// an empty viewport or a coverage outside (0, 1].
    pub fn optimal_zoom(
        &self,
        width_m: f64,
        height_m: f64,
        latitude: f64,
        viewport: Viewport,
        coverage: f64,
    ) -> Result<ZoomPlan, FramingError> {
        check_dimension("property width", width_m)?;
        check_dimension("property height", height_m)?;
        check_latitude(latitude)?;
        viewport.validate()?;
        check_coverage(coverage)?;

        let range = self.config.zoom_range;
        let required_meters = width_m.max(height_m) / coverage;
        let optimal_zoom = self.fitting_zoom(required_meters, latitude, viewport);

        let zoom_levels = [
            optimal_zoom.saturating_sub(3).max(range.min),
            optimal_zoom.saturating_add(3).min(range.max),
        ];

        log::debug!(
            "optimal zoom {} for {}m x {}m at lat {:.5} (levels {:?})",
            optimal_zoom,
            width_m,
            height_m,
            latitude,
            zoom_levels
        );

        Ok(ZoomPlan {
            optimal_zoom,
            zoom_levels,
            meters_per_pixel: meters_per_pixel(optimal_zoom as f64, latitude),
        })
    }

    /// Check whether a `width_m` x `height_m` footprint fits the viewport at `zoom`.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive dimensions, an invalid latitude or an empty viewport.
    pub fn validate_fit(
        &self,
        width_m: f64,
        height_m: f64,
        zoom: u8,
        latitude: f64,
        viewport: Viewport,
    ) -> Result<FitReport, FramingError> {
        check_dimension("property width", width_m)?;
        check_dimension("property height", height_m)?;
        check_latitude(latitude)?;
        viewport.validate()?;

        let report = self.fit(width_m, height_m, zoom, latitude, viewport);
        if let Some(warning) = &report.warning {
            log::debug!("zoom {}: {}", zoom, warning);
        }
        Ok(report)
    }

    /// Choose the tightest zoom that still frames the property seen from
    /// `heading_deg` with the camera tilted by `tilt_deg`.
    ///
    /// The footprint is rotated by the heading, its depth inflated by the
    /// tilt, and the initial estimate is then walked down until the
    /// footprint fits and up while the coverage stays below the tight limit.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive dimensions, a tilt outside [0, 90),
    /// an invalid latitude, an empty viewport or a coverage outside (0, 1].
    #[allow(clippy::too_many_arguments)]
    pub fn zoom_for_angle(
        &self,
        width_m: f64,
        height_m: f64,
        heading_deg: f64,
        tilt_deg: f64,
        latitude: f64,
        viewport: Viewport,
        coverage: f64,
    ) -> Result<u8, FramingError> {
        check_dimension("property width", width_m)?;
        check_dimension("property height", height_m)?;
        if !heading_deg.is_finite() {
            return Err(FramingError::InvalidDimension {
                name: "heading",
                value: heading_deg,
            });
        }
        if !(0.0..90.0).contains(&tilt_deg) {
            return Err(FramingError::InvalidTilt(tilt_deg));
        }
        check_latitude(latitude)?;
        viewport.validate()?;
        check_coverage(coverage)?;

        let range = self.config.zoom_range;
        let footprint = angle_footprint(width_m, height_m, heading_deg, tilt_deg);
        let (fw, fh) = (footprint.apparent_width, footprint.effective_depth);

        let required_meters = fw.max(fh) / coverage;
        let mut zoom = self.fitting_zoom(required_meters, latitude, viewport);

        while zoom > range.min && !self.fit(fw, fh, zoom, latitude, viewport).fits {
            zoom -= 1;
        }

        let mut candidate = zoom + 1;
        while candidate <= range.max {
            let report = self.fit(fw, fh, candidate, latitude, viewport);
            if report.fits && report.coverage < self.config.tight_coverage {
                zoom = candidate;
                candidate += 1;
            } else {
                break;
            }
        }

        log::debug!(
            "zoom {} for heading {} tilt {} (footprint {:.1}m x {:.1}m)",
            zoom,
            heading_deg,
            tilt_deg,
            fw,
            fh
        );

        Ok(zoom)
    }
}

/// [`FramingCalculator::optimal_zoom`] with the default zoom range.
pub fn optimal_zoom(
    width_m: f64,
    height_m: f64,
    latitude: f64,
    viewport_width: u32,
    viewport_height: u32,
    coverage: f64,
) -> Result<ZoomPlan, FramingError> {
    FramingCalculator::default().optimal_zoom(
        width_m,
        height_m,
        latitude,
        Viewport::new(viewport_width, viewport_height),
        coverage,
    )
}

/// [`FramingCalculator::validate_fit`] with the default coverage limits.
pub fn validate_fit(
    width_m: f64,
    height_m: f64,
    zoom: u8,
    latitude: f64,
    viewport_width: u32,
    viewport_height: u32,
) -> Result<FitReport, FramingError> {
    FramingCalculator::default().validate_fit(
        width_m,
        height_m,
        zoom,
        latitude,
        Viewport::new(viewport_width, viewport_height),
    )
}

/// [`FramingCalculator::zoom_for_angle`] with the default zoom range.
#[allow(clippy::too_many_arguments)]
pub fn zoom_for_angle(
    width_m: f64,
    height_m: f64,
    heading_deg: f64,
    tilt_deg: f64,
    latitude: f64,
    viewport_width: u32,
    viewport_height: u32,
    coverage: f64,
) -> Result<u8, FramingError> {
    FramingCalculator::default().zoom_for_angle(
        width_m,
        height_m,
        heading_deg,
        tilt_deg,
        latitude,
        Viewport::new(viewport_width, viewport_height),
        coverage,
    )
}
