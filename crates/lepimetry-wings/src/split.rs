//! Left/right wing separation.

use lepimetry_core::{regions_by_area, BinaryMask, Connectivity, Pixel, Region};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::WingError;

/// Parameters for [`SpecimenSplitter`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SplitParams {
    /// Number of columns cleared from the split column rightwards.
    pub gap_width: usize,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self { gap_width: 5 }
    }
}

/// Result of splitting a specimen mask.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WingSplit {
    /// Column of the vertical split line.
    pub split_col: usize,
    /// Mean foreground row of the split column, placed on that column.
    pub body_center: Pixel,
    /// Left wing region, full-image coordinates.
    pub left: Region,
    /// Right wing region, full-image coordinates.
    pub right: Region,
}

/// Splits a specimen silhouette into its two wings.
#[derive(Clone, Debug, Default)]
pub struct SpecimenSplitter {
    params: SplitParams,
}

impl SpecimenSplitter {
    pub fn new(params: SplitParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &SplitParams {
        &self.params
    }

    /// Column center of mass of the silhouette, truncated to a column index.
    pub fn split_column(mask: &BinaryMask) -> Result<usize, WingError> {
        let means = mask.column_means();
        let total: f64 = means.iter().sum();
        if total <= 0.0 {
            return Err(WingError::EmptyMask);
        }
        let expectation: f64 = means
            .iter()
            .enumerate()
            .map(|(i, &m)| i as f64 * m / total)
            .sum();
        Ok(expectation as usize)
    }

    /// Split `mask` into left and right wings.
    ///
    /// The two largest 8-connected regions left after clearing the gap are
    /// the wings; the one starting further left is the left wing.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, mask), fields(width = mask.width(), height = mask.height()))
    )]
    pub fn split(&self, mask: &BinaryMask) -> Result<WingSplit, WingError> {
        let split_col = Self::split_column(mask)?;

        let mut gapped = mask.clone();
        gapped.fill_rect(
            0..mask.height(),
            split_col..split_col + self.params.gap_width,
            false,
        );

        let mut regions = regions_by_area(&gapped, Connectivity::Eight);
        if regions.len() < 2 {
            return Err(WingError::TooFewWings {
                found: regions.len(),
            });
        }
        regions.truncate(2);
        let second = regions.pop().ok_or(WingError::TooFewWings { found: 1 })?;
        let first = regions.pop().ok_or(WingError::TooFewWings { found: 0 })?;
        let (left, right) = if first.min_col() < second.min_col() {
            (first, second)
        } else {
            (second, first)
        };

        let rows = mask.column_foreground_rows(split_col);
        if rows.is_empty() {
            return Err(WingError::EmptySplitColumn { col: split_col });
        }
        let mean_row = rows.iter().sum::<usize>() as f64 / rows.len() as f64;
        let body_center = Pixel::new(mean_row as i32, split_col as i32);

        log::debug!(
            "split at column {}: left wing {} px, right wing {} px, body center row {}",
            split_col,
            left.area(),
            right.area(),
            body_center.y
        );
        Ok(WingSplit {
            split_col,
            body_center,
            left,
            right,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_butterfly() -> BinaryMask {
        let mut m = BinaryMask::new(2000, 1000);
        m.fill_rect(250..500, 250..500, true);
        m.fill_rect(250..500, 1500..1750, true);
        m.fill_rect(500..900, 400..1600, true);
        m.fill_rect(250..500, 800..1200, true);
        m
    }

    #[test]
    fn symmetric_specimen_splits_at_its_center() {
        assert_eq!(SpecimenSplitter::split_column(&fake_butterfly()), Ok(999));
    }

    #[test]
    fn wings_are_ordered_by_leftmost_column() {
        let split = SpecimenSplitter::default()
            .split(&fake_butterfly())
            .expect("two wings");
        assert_eq!(split.split_col, 999);
        assert_eq!(split.left.min_col(), 250);
        assert_eq!(split.right.bbox.max_col, 1750);
        assert_eq!(split.left.bbox.max_col, 999);
        assert_eq!(split.right.min_col(), 1004);
        assert_eq!(split.body_center, Pixel::new(574, 999));
    }

    #[test]
    fn single_blob_without_a_second_region_is_ambiguous() {
        let mut m = BinaryMask::new(40, 20);
        m.fill_rect(5..15, 0..3, true);
        let err = SpecimenSplitter::default().split(&m).unwrap_err();
        assert!(matches!(err, WingError::TooFewWings { .. }));
        assert_eq!(err.kind(), lepimetry_core::FailureKind::AmbiguousGeometry);
    }

    #[test]
    fn empty_mask_is_a_detection_failure() {
        let err = SpecimenSplitter::default()
            .split(&BinaryMask::new(10, 10))
            .unwrap_err();
        assert_eq!(err, WingError::EmptyMask);
    }
}
