//! Binary morphology on [`BinaryMask`].

use imageproc::distance_transform::Norm;
use imageproc::morphology;

use crate::raster::{from_luma, to_luma};
use crate::BinaryMask;

/// Largest radius passed to `imageproc` in one go; its distance transform
/// saturates at 255.
const MAX_PASS_RADIUS: usize = 254;

/// Dilate `iterations` times with the 3x3 cross structuring element.
///
/// Equivalent to keeping every pixel within city-block distance
/// `iterations` of the foreground. Pixels outside the grid count as
/// background.
pub fn dilate(mask: &BinaryMask, iterations: usize) -> BinaryMask {
    if iterations == 0 || mask.is_empty() {
        return mask.clone();
    }
    let mut luma = to_luma(mask);
    let mut remaining = iterations;
    while remaining > 0 {
        let k = remaining.min(MAX_PASS_RADIUS);
        luma = morphology::dilate(&luma, Norm::L1, k as u8);
        remaining -= k;
    }
    from_luma(&luma)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pixel_grows_into_a_diamond() {
        let mut m = BinaryMask::new(9, 9);
        m.set(4, 4, true);
        let d = dilate(&m, 2);
        assert_eq!(d.count(), 13);
        assert!(d.get(2, 4));
        assert!(d.get(3, 3));
        assert!(!d.get(2, 3));
    }

    #[test]
    fn zero_iterations_is_identity() {
        let mut m = BinaryMask::new(4, 4);
        m.set(1, 2, true);
        assert_eq!(dilate(&m, 0), m);
    }

    #[test]
    fn dilation_stops_at_the_border() {
        let mut m = BinaryMask::new(3, 1);
        m.set(0, 0, true);
        assert_eq!(dilate(&m, 5).count(), 3);
        assert!(dilate(&BinaryMask::new(3, 3), 4).is_empty());
    }

    #[test]
    fn large_radii_are_applied_in_passes() {
        let mut m = BinaryMask::new(300, 1);
        m.set(0, 0, true);
        let d = dilate(&m, 290);
        assert_eq!(d.count(), 291);
        assert!(d.get(0, 290));
        assert!(!d.get(0, 291));
    }
}
