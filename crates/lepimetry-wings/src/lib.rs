//! Wing-level geometry of a specimen silhouette.
//!
//! - [`SpecimenSplitter`] cuts the silhouette at the body's column center of
//!   mass and returns the left and right wing regions plus the body center.
//! - [`remove_antennae`] severs antennae that touch a wing.
//! - [`LandmarkDetector`] finds the wing tip and the wing/body junction,
//!   either on a half of the specimen mask or on a (smoothed) wing boundary.

mod antenna;
mod landmarks;
mod split;

pub use antenna::{remove_antennae, AntennaParams};
pub use landmarks::{
    BoundaryWalk, LandmarkDetector, LandmarkMethod, LandmarkParams, LandmarkSet, Side,
    WalkSchedule, WingLandmarks,
};
pub use split::{SpecimenSplitter, SplitParams, WingSplit};

use lepimetry_core::{FailureKind, MaskError};

/// Errors returned by wing splitting and landmark detection.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WingError {
    #[error(transparent)]
    Mask(#[from] MaskError),
    #[error("specimen mask is empty")]
    EmptyMask,
    #[error("expected two wing regions after splitting, found {found}")]
    TooFewWings { found: usize },
    #[error("split column {col} has no foreground")]
    EmptySplitColumn { col: usize },
    #[error("wing boundary has no points")]
    EmptyBoundary,
    #[error("inner landmark walk from index {start} ran off a boundary of {len} points")]
    WalkExhausted { start: usize, len: usize },
    #[error("no background pocket between wing and body in the top {rows} rows")]
    NoPocket { rows: usize },
}

impl WingError {
    pub fn kind(&self) -> FailureKind {
        match self {
            WingError::Mask(_)
            | WingError::EmptyMask
            | WingError::EmptySplitColumn { .. }
            | WingError::EmptyBoundary
            | WingError::NoPocket { .. } => FailureKind::DetectionFailure,
            WingError::TooFewWings { .. } | WingError::WalkExhausted { .. } => {
                FailureKind::AmbiguousGeometry
            }
        }
    }
}
