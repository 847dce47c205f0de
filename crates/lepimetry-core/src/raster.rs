//! Conversions between [`BinaryMask`] and `image` luma buffers.

use image::{GrayImage, Luma};

use crate::BinaryMask;

/// Foreground as 255, background as 0.
pub(crate) fn to_luma(mask: &BinaryMask) -> GrayImage {
    GrayImage::from_fn(mask.width() as u32, mask.height() as u32, |x, y| {
        Luma([if mask.get(y as usize, x as usize) { 255 } else { 0 }])
    })
}

/// Every non-zero pixel is foreground.
pub(crate) fn from_luma(img: &GrayImage) -> BinaryMask {
    BinaryMask::from_fn(img.width() as usize, img.height() as usize, |y, x| {
        img.get_pixel(x as u32, y as u32)[0] != 0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luma_conversion_keeps_layout() {
        let mut mask = BinaryMask::new(4, 2);
        mask.set(1, 3, true);
        let img = to_luma(&mask);
        assert_eq!(img.dimensions(), (4, 2));
        assert_eq!(img.get_pixel(3, 1)[0], 255);
        assert_eq!(img.get_pixel(1, 1)[0], 0);
        assert_eq!(from_luma(&img), mask);
    }
}
