use serde::{Deserialize, Serialize};

/// Coarse classification shared by every stage error.
///
/// The orchestrator logs this next to the image identifier and moves on to
/// the next image; nothing in the measurement stages retries.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A required region (ruler ticks, wing, landmark) was not found.
    DetectionFailure,
    /// The ruler projection has no usable periodicity peak.
    DegenerateSignal,
    /// Too few regions survived, or a boundary walk ran off its end.
    AmbiguousGeometry,
}

/// Errors raised while building or combining masks and image views.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MaskError {
    #[error("invalid mask dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error("invalid buffer length (expected {expected}, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("mask shape mismatch (expected {expected:?}, got {got:?})")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
}

impl MaskError {
    pub fn kind(&self) -> FailureKind {
        FailureKind::DetectionFailure
    }
}
