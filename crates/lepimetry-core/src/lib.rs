//! Core types and utilities for lepidoptera specimen measurement.
//!
//! Masks arrive as plain boolean grids from the segmentation collaborator.
//! Labeling, dilation and thresholding run on `imageproc` through thin
//! adapters, so callers only ever see [`BinaryMask`] and [`GrayImage`].

mod error;
mod logger;
mod mask;
mod morphology;
mod raster;
mod region;
mod threshold;
mod view;

pub use error::{FailureKind, MaskError};
pub use mask::{BinaryMask, BoundingBox, Pixel};
pub use morphology::dilate;
pub use region::{label_regions, largest_region, regions_by_area, Connectivity, Region};
pub use threshold::otsu_threshold;
pub use view::{GrayImage, RgbImageView};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{current_specimen, init_with_level, specimen_scope, SpecimenScope};
