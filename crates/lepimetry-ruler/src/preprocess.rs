//! Ruler preprocessing: binarization and numeral suppression.

use lepimetry_core::{label_regions, otsu_threshold, BinaryMask, Connectivity, GrayImage};

use crate::{RulerError, RulerParams};

/// Binarize a grayscale ruler crop with a global Otsu threshold.
///
/// Bright paper becomes foreground; invert the result to get the ticks.
/// A crop of one gray level (blank paper, a blown-out photo) has no ticks
/// to find and is rejected.
pub fn binarize_ruler(gray: &GrayImage) -> Result<BinaryMask, RulerError> {
    let t = otsu_threshold(gray).ok_or(RulerError::UniformCrop {
        level: gray.data.first().copied().unwrap_or(0),
    })?;
    Ok(gray.threshold_above(t))
}

/// Blank the bounding box of every component that looks like a printed
/// numeral rather than a tick.
///
/// A component is a numeral when its hole-filled area exceeds the mean
/// filled area of all components and its eccentricity is below
/// `params.numeral_eccentricity`. Ticks are thin lines with eccentricity
/// close to 1. Returns a new mask; `ticks` is left untouched.
pub fn remove_numerals(ticks: &BinaryMask, params: &RulerParams) -> Result<BinaryMask, RulerError> {
    let regions = label_regions(ticks, Connectivity::Four);
    if regions.is_empty() {
        return Err(RulerError::NoTicks);
    }

    let filled: Vec<usize> = regions.iter().map(|r| r.filled_area()).collect();
    let mean_filled = filled.iter().sum::<usize>() as f64 / filled.len() as f64;

    let mut out = ticks.clone();
    let mut removed = 0usize;
    for (region, &area) in regions.iter().zip(&filled) {
        if region.eccentricity() < params.numeral_eccentricity && area as f64 > mean_filled {
            let b = region.bbox;
            out.fill_rect(b.min_row..b.max_row, b.min_col..b.max_col, false);
            removed += 1;
        }
    }
    log::debug!(
        "ruler: {} components, {} blanked as numerals",
        regions.len(),
        removed
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binarize_splits_two_gray_levels() {
        let gray = GrayImage {
            width: 2,
            height: 3,
            data: vec![1, 2, 1, 2, 1, 1],
        };
        let bin = binarize_ruler(&gray).expect("two levels");
        assert_eq!(bin.data(), &[false, true, false, true, false, false]);
    }

    #[test]
    fn blank_crop_is_rejected() {
        let gray = GrayImage {
            width: 3,
            height: 2,
            data: vec![240; 6],
        };
        let err = binarize_ruler(&gray).unwrap_err();
        assert_eq!(err, RulerError::UniformCrop { level: 240 });
        assert_eq!(err.kind(), lepimetry_core::FailureKind::DetectionFailure);
    }

    #[test]
    fn round_blob_is_removed_and_lines_survive() {
        let mut m = BinaryMask::new(60, 40);
        for x in [2, 6, 10, 14] {
            m.fill_rect(0..30, x..x + 1, true);
        }
        m.fill_rect(5..15, 30..40, true);

        let out = remove_numerals(&m, &RulerParams::default()).expect("components");
        assert_eq!(out.count(), 4 * 30);
        assert!(!out.get(10, 35));
        assert!(out.get(0, 2));
        assert_eq!(m.count(), 4 * 30 + 100);
    }

    #[test]
    fn empty_ruler_has_no_ticks() {
        let err = remove_numerals(&BinaryMask::new(5, 5), &RulerParams::default()).unwrap_err();
        assert!(matches!(err, RulerError::NoTicks));
    }
}
