//! Measurement of pinned lepidoptera from segmentation masks.
//!
//! This crate provides:
//! - re-exports of the stage crates (`core`, `contour`, `ruler`, `wings`)
//! - the distance calculator ([`MeasurementCalculator`])
//! - an end-to-end [`SpecimenPipeline`] from RGB image plus masks to a
//!   serializable [`SpecimenReport`]
//! - an injectable [`Memo`] cache for batch drivers
//! - (feature `image`) adapters from `image` buffers.
//!
//! ## Quickstart
//!
//! ```no_run
//! use lepimetry::{PipelineParams, SpecimenInputs, SpecimenPipeline};
//! use lepimetry::convert::{mask_from_luma, rgb_view};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rgb = image::open("specimen.jpg")?.to_rgb8();
//! let ruler = mask_from_luma(&image::open("ruler.png")?.to_luma8());
//! let specimen = mask_from_luma(&image::open("specimen.png")?.to_luma8());
//!
//! let pipeline = SpecimenPipeline::new(PipelineParams::default());
//! let report = pipeline.run(&SpecimenInputs {
//!     rgb: rgb_view(&rgb),
//!     ruler: &ruler,
//!     specimen: &specimen,
//!     tags: None,
//! })?;
//! println!("wing span: {} mm", report.measurements.millimeters.dist_span);
//! # Ok(())
//! # }
//! ```
//!
//! ## Failures
//!
//! Every error exposes `kind()`, one of `DetectionFailure`,
//! `DegenerateSignal` or `AmbiguousGeometry`. A batch driver logs it with
//! the image name and moves on.

pub use lepimetry_contour as contour;
pub use lepimetry_core as core;
pub use lepimetry_ruler as ruler;
pub use lepimetry_wings as wings;

pub use lepimetry_core::{BinaryMask, FailureKind, Pixel, RgbImageView};
pub use lepimetry_ruler::{RulerScale, TickConvention};
pub use lepimetry_wings::{LandmarkMethod, LandmarkSet, Side};

pub mod cache;
pub mod measure;
pub mod pipeline;
pub mod preprocess;

#[cfg(feature = "image")]
pub mod convert;

pub use cache::{mask_fingerprint, specimen_fingerprint, Memo, MemoCache, NoMemo};
pub use measure::{DistanceSet, MeasureError, MeasurementCalculator, MeasurementParams, Measurements};
pub use pipeline::{
    PipelineError, PipelineParams, SpecimenInputs, SpecimenPipeline, SpecimenReport, WingAnalysis,
    WingTrace,
};
