//! Adapters from `image` buffers to the plain raster types of the stages.

use lepimetry_core::{BinaryMask, RgbImageView};

/// Borrow an `image::RgbImage` as an [`RgbImageView`].
pub fn rgb_view(img: &::image::RgbImage) -> RgbImageView<'_> {
    RgbImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Segmentation mask from an 8-bit image: non-zero pixels are foreground.
pub fn mask_from_luma(img: &::image::GrayImage) -> BinaryMask {
    BinaryMask::from_fn(img.width() as usize, img.height() as usize, |y, x| {
        img.get_pixel(x as u32, y as u32)[0] != 0
    })
}

/// Render a mask as a black/white 8-bit image.
pub fn mask_to_luma(mask: &BinaryMask) -> ::image::GrayImage {
    ::image::GrayImage::from_fn(mask.width() as u32, mask.height() as u32, |x, y| {
        ::image::Luma([if mask.get(y as usize, x as usize) { 255 } else { 0 }])
    })
}
