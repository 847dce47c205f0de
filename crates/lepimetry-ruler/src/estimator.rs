use lepimetry_core::{BinaryMask, MaskError, RgbImageView};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    binarize_ruler, dominant_period, remove_numerals, Periodicity, Projection, RulerError,
    RulerParams, TickConvention,
};

/// Pixel scale of the ruler, in full-image coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RulerScale {
    /// Pixel distance between two adjacent ticks.
    pub tick_spacing: f64,
    /// Topmost ruler row.
    pub top_row: usize,
    /// Column of the first tick inside the analyzed band.
    pub first_tick_col: usize,
    pub periodicity: Periodicity,
}

impl RulerScale {
    /// Pixels per millimeter under the given tick convention.
    #[inline]
    pub fn pixels_per_mm(&self, convention: TickConvention) -> f64 {
        self.tick_spacing / convention.tick_mm()
    }

    /// Columns of `n` consecutive ticks starting at the first detected one.
    pub fn tick_positions(&self, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| self.first_tick_col as f64 + i as f64 * self.tick_spacing)
            .collect()
    }
}

/// Ruler scale estimator.
#[derive(Clone, Debug, Default)]
pub struct RulerScaleEstimator {
    params: RulerParams,
}

impl RulerScaleEstimator {
    pub fn new(params: RulerParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &RulerParams {
        &self.params
    }

    /// Estimate the scale from the full RGB image and the ruler mask.
    ///
    /// Both inputs share the full image frame. The ruler crop is the
    /// bounding box of the mask.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, rgb, ruler_mask), fields(width = rgb.width, height = rgb.height))
    )]
    pub fn estimate(
        &self,
        rgb: &RgbImageView<'_>,
        ruler_mask: &BinaryMask,
    ) -> Result<RulerScale, RulerError> {
        if (rgb.width, rgb.height) != (ruler_mask.width(), ruler_mask.height()) {
            return Err(MaskError::ShapeMismatch {
                expected: (ruler_mask.width(), ruler_mask.height()),
                got: (rgb.width, rgb.height),
            }
            .into());
        }
        let bbox = ruler_mask.bounding_box().ok_or(RulerError::NoRuler)?;

        let gray = rgb.gray_crop(bbox.min_row..bbox.max_row, bbox.min_col..bbox.max_col);
        let ticks = binarize_ruler(&gray)?.inverted();
        self.estimate_from_ticks(&ticks, bbox.min_row, bbox.min_col)
    }

    /// Estimate the scale from an already binarized ruler crop.
    ///
    /// `ticks` has tick marks as foreground; `top_row` and `left_col` place
    /// the crop in the full image.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, ticks), fields(width = ticks.width(), height = ticks.height()))
    )]
    pub fn estimate_from_ticks(
        &self,
        ticks: &BinaryMask,
        top_row: usize,
        left_col: usize,
    ) -> Result<RulerScale, RulerError> {
        let params = &self.params;
        let cleaned = remove_numerals(ticks, params)?;

        let rows = band(cleaned.height(), params.band_rows);
        let cols = band(cleaned.width(), params.band_cols);
        let col_offset = cols.start;
        let band = cleaned.crop(rows, cols);
        if band.is_empty() {
            return Err(RulerError::EmptyBand);
        }

        let means = band.column_means();
        let max = means.iter().copied().fold(0.0, f64::max);
        let first_index = means
            .iter()
            .position(|&m| m > params.first_tick_fraction * max)
            .ok_or(RulerError::EmptyBand)?;

        let signal = match params.projection {
            Projection::Sum => band.column_sums(),
            Projection::Mean => means,
        };
        let periodicity = dominant_period(&signal, params)?;

        let scale = RulerScale {
            tick_spacing: periodicity.period,
            top_row,
            first_tick_col: left_col + col_offset + first_index,
            periodicity,
        };
        log::debug!(
            "ruler: tick spacing {:.3} px (bin {} of {}), first tick at column {}",
            scale.tick_spacing,
            periodicity.bin,
            signal.len(),
            scale.first_tick_col
        );
        Ok(scale)
    }
}

fn band(len: usize, [lo, hi]: [f32; 2]) -> std::ops::Range<usize> {
    let start = (len as f32 * lo.clamp(0.0, 1.0)) as usize;
    let end = (len as f32 * hi.clamp(0.0, 1.0)) as usize;
    start..end.max(start)
}
