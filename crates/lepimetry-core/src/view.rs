use std::ops::Range;

use crate::{BinaryMask, MaskError};

#[derive(Clone, Debug)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>, // row-major, len = w*h
}

impl GrayImage {
    #[inline]
    pub fn get(&self, y: usize, x: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// `value > threshold` as foreground.
    pub fn threshold_above(&self, threshold: u8) -> BinaryMask {
        BinaryMask::from_fn(self.width, self.height, |y, x| self.get(y, x) > threshold)
    }
}

/// Borrowed interleaved RGB buffer.
#[derive(Clone, Copy, Debug)]
pub struct RgbImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major RGB triplets, len = w*h*3
}

impl<'a> RgbImageView<'a> {
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Result<Self, MaskError> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(3))
            .ok_or(MaskError::InvalidDimensions { width, height })?;
        if data.len() != expected {
            return Err(MaskError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn rgb(&self, y: usize, x: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Luminance of a sub-rectangle, clipped to the image.
    ///
    /// Uses the Rec. 709 weights `0.2125 R + 0.7154 G + 0.0721 B`.
    pub fn gray_crop(&self, rows: Range<usize>, cols: Range<usize>) -> GrayImage {
        let r0 = rows.start.min(self.height);
        let r1 = rows.end.min(self.height).max(r0);
        let c0 = cols.start.min(self.width);
        let c1 = cols.end.min(self.width).max(c0);
        let mut data = Vec::with_capacity((r1 - r0) * (c1 - c0));
        for y in r0..r1 {
            for x in c0..c1 {
                data.push(luminance(self.rgb(y, x)));
            }
        }
        GrayImage {
            width: c1 - c0,
            height: r1 - r0,
            data,
        }
    }

    pub fn to_gray(&self) -> GrayImage {
        self.gray_crop(0..self.height, 0..self.width)
    }
}

#[inline]
fn luminance([r, g, b]: [u8; 3]) -> u8 {
    let l = 0.2125 * r as f32 + 0.7154 * g as f32 + 0.0721 * b as f32;
    l.round().clamp(0.0, 255.0) as u8
}
