//! Ruler scale estimation from tick periodicity.
//!
//! The ruler crop is binarized, printed numerals are blanked, a central band
//! is projected onto the horizontal axis and the dominant frequency of that
//! profile gives the tick spacing in pixels.
//!
//! ```no_run
//! use lepimetry_core::{BinaryMask, RgbImageView};
//! use lepimetry_ruler::{RulerParams, RulerScaleEstimator};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (w, h) = (400, 200);
//! let rgb = vec![255u8; w * h * 3];
//! let ruler_mask = BinaryMask::from_fn(w, h, |_, _| true);
//!
//! let estimator = RulerScaleEstimator::new(RulerParams::default());
//! let scale = estimator.estimate(&RgbImageView::new(w, h, &rgb)?, &ruler_mask)?;
//! println!("tick spacing: {:.2} px", scale.tick_spacing);
//! # Ok(())
//! # }
//! ```

mod estimator;
mod params;
mod periodicity;
mod preprocess;

pub use estimator::{RulerScale, RulerScaleEstimator};
pub use params::{Projection, RulerParams, TickConvention};
pub use periodicity::{dominant_period, Periodicity};
pub use preprocess::{binarize_ruler, remove_numerals};

use lepimetry_core::{FailureKind, MaskError};

/// Errors returned by ruler scale estimation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RulerError {
    #[error(transparent)]
    Mask(#[from] MaskError),
    #[error("ruler mask is empty")]
    NoRuler,
    #[error("ruler crop has a single gray level ({level}); paper and ticks cannot be told apart")]
    UniformCrop { level: u8 },
    #[error("no tick components on the ruler")]
    NoTicks,
    #[error("central ruler band has no foreground")]
    EmptyBand,
    #[error("signal of length {len} leaves no bins above the {skip} skipped ones")]
    SignalTooShort { len: usize, skip: usize },
    #[error("projected tick signal is all zero")]
    FlatSignal,
    #[error("tick signal has no spectral peak above the low-frequency cutoff")]
    NoSpectralPeak,
}

impl RulerError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RulerError::Mask(_)
            | RulerError::NoRuler
            | RulerError::UniformCrop { .. }
            | RulerError::NoTicks => FailureKind::DetectionFailure,
            RulerError::EmptyBand
            | RulerError::SignalTooShort { .. }
            | RulerError::FlatSignal
            | RulerError::NoSpectralPeak => FailureKind::DegenerateSignal,
        }
    }
}
