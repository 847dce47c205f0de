//! Antenna removal.
//!
//! An antenna that touches a wing closes off a pocket of background between
//! itself, the wing and the body. The pocket and the outer background are
//! the two largest background components; pixels close to both of them are
//! the thin bridge that separates them, so clearing those cuts the antenna.

use lepimetry_core::{dilate, regions_by_area, BinaryMask, Connectivity};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::WingError;

/// Parameters for [`remove_antennae`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AntennaParams {
    pub enabled: bool,
    /// Dilation iterations (cross element) applied to both background components.
    pub dilation_iterations: usize,
}

impl Default for AntennaParams {
    fn default() -> Self {
        Self {
            enabled: true,
            dilation_iterations: 35,
        }
    }
}

/// Return a copy of `wing` with antenna bridges cleared.
///
/// With fewer than two background components there is nothing to cut and
/// the mask is returned unchanged.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(wing, params), fields(width = wing.width(), height = wing.height()))
)]
pub fn remove_antennae(wing: &BinaryMask, params: &AntennaParams) -> Result<BinaryMask, WingError> {
    if !params.enabled {
        return Ok(wing.clone());
    }

    let background = regions_by_area(&wing.inverted(), Connectivity::Four);
    let [outer, pocket, ..] = background.as_slice() else {
        log::warn!(
            "antenna removal: {} background component(s), mask left unchanged",
            background.len()
        );
        return Ok(wing.clone());
    };

    let (w, h) = (wing.width(), wing.height());
    let k = params.dilation_iterations;
    let bridge = dilate(&outer.to_mask(w, h), k).intersection(&dilate(&pocket.to_mask(w, h), k))?;
    let cleaned = wing.without(&bridge)?;

    log::debug!(
        "antenna removal: cleared {} px",
        wing.count() - cleaned.count()
    );
    Ok(cleaned)
}
