//! End-to-end measurement of one specimen image.
//!
//! ruler scale -> specimen cleanup -> wing split -> per wing: antenna
//! removal, boundary tracing, Fourier smoothing, landmarks -> distances.
//!
//! Landmarks come from the wing's half of the specimen mask by default, or
//! from the smoothed boundary with [`LandmarkMethod::Contour`].

use lepimetry_contour::{smooth_contour, trace_boundary, Boundary, ContourError, SmoothingParams};
use lepimetry_core::{
    largest_region, BinaryMask, Connectivity, FailureKind, MaskError, Pixel, Region, RgbImageView,
};
use lepimetry_ruler::{RulerError, RulerParams, RulerScale, RulerScaleEstimator};
use lepimetry_wings::{
    remove_antennae, AntennaParams, LandmarkDetector, LandmarkMethod, LandmarkParams,
    LandmarkSet, Side, SpecimenSplitter, SplitParams, WingError, WingLandmarks,
};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::measure::{MeasureError, MeasurementCalculator, MeasurementParams, Measurements};
use crate::preprocess::{crop_specimen, find_tags_edge, keep_largest_region, pre_dilate};

/// Errors from any pipeline stage.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error(transparent)]
    Mask(#[from] MaskError),
    #[error(transparent)]
    Ruler(#[from] RulerError),
    #[error(transparent)]
    Wing(#[from] WingError),
    #[error(transparent)]
    Contour(#[from] ContourError),
    #[error(transparent)]
    Measure(#[from] MeasureError),
    #[error("{side:?} wing has no pixels left after antenna removal")]
    EmptyWing { side: Side },
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::Mask(e) => e.kind(),
            PipelineError::Ruler(e) => e.kind(),
            PipelineError::Wing(e) => e.kind(),
            PipelineError::Contour(e) => e.kind(),
            PipelineError::Measure(e) => e.kind(),
            PipelineError::EmptyWing { .. } => FailureKind::DetectionFailure,
        }
    }
}

/// All stage parameters. Missing JSON fields take their defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub ruler: RulerParams,
    pub smoothing: SmoothingParams,
    pub split: SplitParams,
    pub antenna: AntennaParams,
    pub landmarks: LandmarkParams,
    pub measurement: MeasurementParams,
    /// Cross-element dilations applied to the cropped specimen mask.
    pub pre_dilation: usize,
    pub keep_largest_region: bool,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            ruler: RulerParams::default(),
            smoothing: SmoothingParams::default(),
            split: SplitParams::default(),
            antenna: AntennaParams::default(),
            landmarks: LandmarkParams::default(),
            measurement: MeasurementParams::default(),
            pre_dilation: 2,
            keep_largest_region: true,
        }
    }
}

/// Segmentation output for one image, all in the same frame.
#[derive(Clone, Copy, Debug)]
pub struct SpecimenInputs<'a> {
    pub rgb: RgbImageView<'a>,
    pub ruler: &'a BinaryMask,
    pub specimen: &'a BinaryMask,
    pub tags: Option<&'a BinaryMask>,
}

/// Display data for one wing, full-image coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WingTrace {
    pub side: Side,
    pub boundary: Boundary,
    /// Smoothed boundary as `(x, y)` points.
    pub smoothed: Vec<Point2<f64>>,
    pub landmarks: WingLandmarks,
}

/// Wing geometry of a specimen mask.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WingAnalysis {
    pub split_col: usize,
    pub landmarks: LandmarkSet,
    pub left: WingTrace,
    pub right: WingTrace,
}

/// Everything measured on one image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpecimenReport {
    pub scale: RulerScale,
    pub measurements: Measurements,
    pub landmarks: LandmarkSet,
    /// Right edge of the specimen area (first tag column).
    pub tags_edge: usize,
    pub split_col: usize,
    pub left: WingTrace,
    pub right: WingTrace,
    /// Tick columns across the image width, for overlays.
    pub tick_positions: Vec<f64>,
}

/// Runs every stage with one set of parameters.
#[derive(Clone, Debug, Default)]
pub struct SpecimenPipeline {
    params: PipelineParams,
}

impl SpecimenPipeline {
    pub fn new(params: PipelineParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Measure one image.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, inputs), fields(width = inputs.rgb.width, height = inputs.rgb.height))
    )]
    pub fn run(&self, inputs: &SpecimenInputs<'_>) -> Result<SpecimenReport, PipelineError> {
        let p = &self.params;
        let (w, h) = (inputs.rgb.width, inputs.rgb.height);
        for mask in [Some(inputs.ruler), Some(inputs.specimen), inputs.tags]
            .into_iter()
            .flatten()
        {
            if (mask.width(), mask.height()) != (w, h) {
                return Err(MaskError::ShapeMismatch {
                    expected: (w, h),
                    got: (mask.width(), mask.height()),
                }
                .into());
            }
        }

        let scale = RulerScaleEstimator::new(p.ruler.clone()).estimate(&inputs.rgb, inputs.ruler)?;

        let specimen = if p.keep_largest_region {
            keep_largest_region(inputs.specimen)
        } else {
            inputs.specimen.clone()
        };
        let tags_edge = inputs
            .tags
            .map_or(w, |tags| find_tags_edge(tags, scale.top_row));
        let specimen = crop_specimen(&specimen, scale.top_row, tags_edge);
        let specimen = pre_dilate(&specimen, p.pre_dilation);

        let wings = self.analyze_wings(&specimen)?;
        let measurements = MeasurementCalculator::new(p.measurement.clone())
            .measure(&wings.landmarks, scale.tick_spacing)?;

        let tick_count = w.saturating_sub(scale.first_tick_col) as f64 / scale.tick_spacing;
        let tick_positions = scale.tick_positions(tick_count as usize + 1);

        log::info!(
            "specimen measured: span {:.2} mm, left wing {:.2} mm, right wing {:.2} mm",
            measurements.millimeters.dist_span,
            measurements.millimeters.dist_l,
            measurements.millimeters.dist_r
        );
        Ok(SpecimenReport {
            scale,
            measurements,
            landmarks: wings.landmarks,
            tags_edge,
            split_col: wings.split_col,
            left: wings.left,
            right: wings.right,
            tick_positions,
        })
    }

    /// Split a cleaned specimen mask and locate the landmarks of both wings.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, specimen), fields(width = specimen.width(), height = specimen.height()))
    )]
    pub fn analyze_wings(&self, specimen: &BinaryMask) -> Result<WingAnalysis, PipelineError> {
        let split = SpecimenSplitter::new(self.params.split.clone()).split(specimen)?;
        let (col, center) = (split.split_col, split.body_center);
        let left = self.trace_wing(specimen, &split.left, Side::Left, col, center)?;
        let right = self.trace_wing(specimen, &split.right, Side::Right, col, center)?;
        let landmarks = LandmarkSet::from_wings(&left.landmarks, &right.landmarks, split.body_center);
        Ok(WingAnalysis {
            split_col: split.split_col,
            landmarks,
            left,
            right,
        })
    }

    /// Landmarks of one wing, searched in the wing's own half of the frame.
    fn trace_wing(
        &self,
        specimen: &BinaryMask,
        region: &Region,
        side: Side,
        split_col: usize,
        body_center: Pixel,
    ) -> Result<WingTrace, PipelineError> {
        let p = &self.params;
        let (w, h) = (specimen.width(), specimen.height());
        let (cols, dx) = match side {
            Side::Left => (0..split_col, 0),
            Side::Right => (split_col..w, split_col),
        };
        let frame_width = cols.len();

        let local = region.to_mask(w, h).crop(0..h, cols.clone());
        let local = remove_antennae(&local, &p.antenna)?;
        let wing = largest_region(&local, Connectivity::Eight).ok_or(PipelineError::EmptyWing { side })?;

        let boundary = trace_boundary(&wing)?;
        let smoothed = smooth_contour(&boundary.to_points(), &p.smoothing)?;

        let detector = LandmarkDetector::new(p.landmarks.clone());
        let landmarks = match p.landmarks.method {
            LandmarkMethod::Contour => detector.detect(&smoothed, side, frame_width)?,
            LandmarkMethod::Mask => {
                // The whole half, not the split region: the split gap would
                // open the pocket above the body into the background.
                let half = remove_antennae(&specimen.crop(0..h, cols), &p.antenna)?;
                detector.detect_in_mask(&half, side, body_center.offset(0, -(dx as i32)))?
            }
        };

        let shift = dx as f64;
        Ok(WingTrace {
            side,
            boundary: boundary.translated(0, dx as i32),
            smoothed: smoothed
                .into_iter()
                .map(|q| Point2::new(q.x + shift, q.y))
                .collect(),
            landmarks: landmarks.translated(0, dx as i32),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_config_falls_back_to_defaults() {
        let params: PipelineParams =
            serde_json::from_str(r#"{ "pre_dilation": 0, "smoothing": { "descriptors": 31 } }"#)
                .expect("valid config");
        assert_eq!(params.pre_dilation, 0);
        assert_eq!(params.smoothing.descriptors, 31);
        assert!(params.keep_largest_region);
        assert_eq!(params.split.gap_width, 5);
        assert_eq!(params.landmarks.method, LandmarkMethod::Mask);
    }

    #[test]
    fn mismatched_masks_are_rejected_up_front() {
        let rgb = vec![255u8; 20 * 10 * 3];
        let view = RgbImageView::new(20, 10, &rgb).expect("valid buffer");
        let ruler = BinaryMask::new(20, 10);
        let specimen = BinaryMask::new(21, 10);
        let err = SpecimenPipeline::default()
            .run(&SpecimenInputs {
                rgb: view,
                ruler: &ruler,
                specimen: &specimen,
                tags: None,
            })
            .unwrap_err();
        assert!(matches!(err, PipelineError::Mask(MaskError::ShapeMismatch { .. })));
        assert_eq!(err.kind(), FailureKind::DetectionFailure);
    }

    #[test]
    fn stage_failures_keep_their_kind() {
        let err = PipelineError::from(WingError::TooFewWings { found: 1 });
        assert_eq!(err.kind(), FailureKind::AmbiguousGeometry);
        let err = PipelineError::from(RulerError::FlatSignal);
        assert_eq!(err.kind(), FailureKind::DegenerateSignal);
    }
}
