//! Specimen mask cleanup before wing splitting.

use lepimetry_core::{dilate, label_regions, largest_region, BinaryMask, Connectivity};

/// Fraction of the image height kept clear above the ruler when looking for tags.
pub const RULER_CROP_MARGIN: f64 = 0.025;

/// Leftmost column of the identification tags above the ruler.
///
/// Rows from `top_ruler - RULER_CROP_MARGIN * height` down are ignored so
/// that no part of the ruler is taken for a tag. Without tags the image
/// width is returned.
pub fn find_tags_edge(tags: &BinaryMask, top_ruler: usize) -> usize {
    let margin = (RULER_CROP_MARGIN * tags.height() as f64) as usize;
    let rows = top_ruler.saturating_sub(margin).min(tags.height());
    let above = tags.crop(0..rows, 0..tags.width());

    label_regions(&above, Connectivity::Eight)
        .iter()
        .map(|r| r.min_col())
        .min()
        .unwrap_or(tags.width())
}

/// Keep only the largest 8-connected component; empty stays empty.
pub fn keep_largest_region(mask: &BinaryMask) -> BinaryMask {
    match largest_region(mask, Connectivity::Eight) {
        Some(region) => region.to_mask(mask.width(), mask.height()),
        None => mask.clone(),
    }
}

/// Specimen area of the image: above the ruler and left of the tags.
///
/// The returned mask keeps the full-image origin, so coordinates measured
/// on it are full-image coordinates.
pub fn crop_specimen(specimen: &BinaryMask, top_ruler: usize, tags_edge: usize) -> BinaryMask {
    specimen.crop(0..top_ruler, 0..tags_edge)
}

/// Grow the silhouette by `iterations` cross-element dilations.
pub fn pre_dilate(specimen: &BinaryMask, iterations: usize) -> BinaryMask {
    dilate(specimen, iterations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags_layout() -> BinaryMask {
        let mut tags = BinaryMask::new(400, 300);
        tags.fill_rect(30..100, 250..380, true);
        tags.fill_rect(120..200, 260..370, true);
        tags
    }

    #[test]
    fn tags_edge_is_the_leftmost_tag_column() {
        assert_eq!(find_tags_edge(&tags_layout(), 230), 250);
    }

    #[test]
    fn missing_tags_fall_back_to_the_image_width() {
        assert_eq!(find_tags_edge(&BinaryMask::new(400, 300), 230), 400);
    }

    #[test]
    fn ruler_rows_are_not_mistaken_for_tags() {
        let mut tags = tags_layout();
        tags.fill_rect(225..300, 0..400, true);
        assert_eq!(find_tags_edge(&tags, 230), 250);
        assert_eq!(find_tags_edge(&tags, 3), 400);
    }

    #[test]
    fn only_the_largest_region_survives() {
        let rows: [&[u8]; 10] = [
            &[0, 0, 1, 1, 0, 0, 0, 0, 1, 0],
            &[0, 1, 1, 1, 1, 0, 0, 0, 1, 1],
            &[1, 1, 1, 1, 1, 1, 0, 1, 1, 1],
            &[1, 1, 1, 1, 1, 1, 0, 0, 1, 0],
            &[1, 1, 1, 1, 1, 1, 0, 0, 0, 0],
            &[0, 1, 1, 1, 1, 0, 0, 1, 1, 0],
            &[0, 1, 1, 1, 1, 0, 0, 1, 1, 1],
            &[1, 1, 1, 1, 1, 0, 0, 1, 1, 1],
            &[0, 1, 1, 1, 0, 0, 0, 0, 1, 0],
            &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ];
        let flat: Vec<u8> = rows.concat();
        let mask = BinaryMask::from_u8(10, 10, &flat).expect("10x10");

        let kept = keep_largest_region(&mask);
        assert!((0..10).all(|y| (6..10).all(|x| !kept.get(y, x))));
        assert_eq!(kept.crop(0..10, 0..6), mask.crop(0..10, 0..6));
    }

    #[test]
    fn crop_keeps_the_origin() {
        let mut m = BinaryMask::new(50, 40);
        m.fill_rect(5..35, 5..45, true);
        let c = crop_specimen(&m, 30, 40);
        assert_eq!((c.width(), c.height()), (40, 30));
        assert!(c.get(5, 5));
        assert_eq!(c.bounding_box().map(|b| (b.max_row, b.max_col)), Some((30, 40)));
    }
}
