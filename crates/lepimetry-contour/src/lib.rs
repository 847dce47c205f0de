//! Boundary extraction and smoothing for labeled specimen regions.
//!
//! - [`trace_boundary`] walks the 8-neighborhood of a [`Region`](lepimetry_core::Region)
//!   and returns its closed outer boundary.
//! - [`smooth_contour`] band-limits that boundary in the Fourier domain to
//!   remove the staircase noise of rasterized silhouettes.
//! - [`FourierDescriptors`] exposes the kept coefficients as values.

mod fourier;
mod moore;

pub use fourier::{smooth_contour, FourierDescriptors, SmoothingParams};
pub use moore::{trace_boundary, Boundary};

use lepimetry_core::{FailureKind, Pixel};

/// Errors returned by contour tracing and smoothing.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ContourError {
    #[error("region has no pixels")]
    EmptyRegion,
    #[error("boundary has no points")]
    EmptyBoundary,
    #[error("boundary walk lost its backtrack pixel at ({}, {})", at.y, at.x)]
    LostBacktrack { at: Pixel },
    #[error("boundary walk did not close after {steps} steps")]
    Unclosed { steps: usize },
}

impl ContourError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ContourError::EmptyRegion | ContourError::EmptyBoundary => {
                FailureKind::DetectionFailure
            }
            ContourError::LostBacktrack { .. } | ContourError::Unclosed { .. } => {
                FailureKind::AmbiguousGeometry
            }
        }
    }
}
