//! Global thresholding.

use imageproc::contrast::otsu_level;

use crate::GrayImage;

/// Otsu level of a grayscale crop; foreground is `value > level`.
///
/// `None` when the crop has fewer than two gray levels, since no split
/// between paper and ink exists there.
pub fn otsu_threshold(gray: &GrayImage) -> Option<u8> {
    let (lo, hi) = gray
        .data
        .iter()
        .fold((u8::MAX, u8::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if lo >= hi {
        return None;
    }
    let luma = image::GrayImage::from_raw(gray.width as u32, gray.height as u32, gray.data.clone())?;
    Some(otsu_level(&luma))
}
