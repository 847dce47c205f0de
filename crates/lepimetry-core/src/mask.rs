use std::ops::Range;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::MaskError;

/// Integer pixel coordinate, `(y, x)` with the origin at the top-left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pixel {
    pub y: i32,
    pub x: i32,
}

impl Pixel {
    #[inline]
    pub const fn new(y: i32, x: i32) -> Self {
        Self { y, x }
    }

    #[inline]
    pub const fn offset(self, dy: i32, dx: i32) -> Self {
        Self {
            y: self.y + dy,
            x: self.x + dx,
        }
    }

    /// Euclidean distance in pixels.
    #[inline]
    pub fn distance(self, other: Pixel) -> f64 {
        let dy = (self.y - other.y) as f64;
        let dx = (self.x - other.x) as f64;
        dy.hypot(dx)
    }

    /// Continuous point with `x` = column and `y` = row.
    #[inline]
    pub fn to_point(self) -> Point2<f64> {
        Point2::new(self.x as f64, self.y as f64)
    }

    /// Nearest pixel to a continuous `(x, y)` point.
    #[inline]
    pub fn from_point(p: Point2<f64>) -> Self {
        Self {
            y: p.y.round() as i32,
            x: p.x.round() as i32,
        }
    }
}

/// Axis-aligned bounding box, half-open on the max side (like a slice).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_row: usize,
    pub min_col: usize,
    pub max_row: usize,
    pub max_col: usize,
}

impl BoundingBox {
    #[inline]
    pub fn height(&self) -> usize {
        self.max_row - self.min_row
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.max_col - self.min_col
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.height() * self.width()
    }
}

/// Row-major boolean grid; `true` marks a foreground pixel.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BinaryMask {
    width: usize,
    height: usize,
    data: Vec<bool>,
}

impl BinaryMask {
    /// All-background mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![false; width * height],
        }
    }

    /// Build a mask from a `(y, x) -> bool` predicate.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(y, x));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_vec(width: usize, height: usize, data: Vec<bool>) -> Result<Self, MaskError> {
        let expected = width
            .checked_mul(height)
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

    /// Foreground wherever the byte is non-zero.
    pub fn from_u8(width: usize, height: usize, pixels: &[u8]) -> Result<Self, MaskError> {
        Self::from_vec(width, height, pixels.iter().map(|&v| v != 0).collect())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn data(&self) -> &[bool] {
        &self.data
    }

    #[inline]
    pub fn get(&self, y: usize, x: usize) -> bool {
        self.data[y * self.width + x]
    }

    /// Bounds-checked lookup; everything outside the grid is background.
    #[inline]
    pub fn get_signed(&self, y: i64, x: i64) -> bool {
        if y < 0 || x < 0 || y >= self.height as i64 || x >= self.width as i64 {
            return false;
        }
        self.data[y as usize * self.width + x as usize]
    }

    #[inline]
    pub fn at(&self, p: Pixel) -> bool {
        self.get_signed(p.y as i64, p.x as i64)
    }

    #[inline]
    pub fn set(&mut self, y: usize, x: usize, value: bool) {
        self.data[y * self.width + x] = value;
    }

    /// Set a rectangle, clipped to the grid.
    pub fn fill_rect(&mut self, rows: Range<usize>, cols: Range<usize>, value: bool) {
        let rows = rows.start.min(self.height)..rows.end.min(self.height);
        let cols = cols.start.min(self.width)..cols.end.min(self.width);
        for y in rows {
            let row = &mut self.data[y * self.width..(y + 1) * self.width];
            for v in &mut row[cols.clone()] {
                *v = value;
            }
        }
    }

    /// Number of foreground pixels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }

    /// Copy of a sub-rectangle, clipped to the grid.
    pub fn crop(&self, rows: Range<usize>, cols: Range<usize>) -> BinaryMask {
        let r0 = rows.start.min(self.height);
        let r1 = rows.end.min(self.height).max(r0);
        let c0 = cols.start.min(self.width);
        let c1 = cols.end.min(self.width).max(c0);
        BinaryMask::from_fn(c1 - c0, r1 - r0, |y, x| self.get(y + r0, x + c0))
    }

    pub fn inverted(&self) -> BinaryMask {
        BinaryMask {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| !v).collect(),
        }
    }

    /// Pixel-wise AND of two equally sized masks.
    pub fn intersection(&self, other: &BinaryMask) -> Result<BinaryMask, MaskError> {
        self.check_same_shape(other)?;
        Ok(BinaryMask {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| a && b)
                .collect(),
        })
    }

    /// Copy of `self` with every pixel set in `cleared` turned to background.
    pub fn without(&self, cleared: &BinaryMask) -> Result<BinaryMask, MaskError> {
        self.check_same_shape(cleared)?;
        Ok(BinaryMask {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(&cleared.data)
                .map(|(&a, &c)| a && !c)
                .collect(),
        })
    }

    /// Foreground pixels in raster order.
    pub fn foreground(&self) -> impl Iterator<Item = Pixel> + '_ {
        let w = self.width;
        self.data
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v)
            .map(move |(i, _)| Pixel::new((i / w) as i32, (i % w) as i32))
    }

    /// Number of foreground pixels in each column.
    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.width];
        for row in self.data.chunks_exact(self.width.max(1)) {
            for (s, &v) in sums.iter_mut().zip(row) {
                if v {
                    *s += 1.0;
                }
            }
        }
        sums
    }

    /// Fraction of foreground pixels in each column.
    pub fn column_means(&self) -> Vec<f64> {
        if self.height == 0 {
            return vec![0.0; self.width];
        }
        let h = self.height as f64;
        self.column_sums().into_iter().map(|s| s / h).collect()
    }

    /// Foreground rows on column `x`, top to bottom.
    pub fn column_foreground_rows(&self, x: usize) -> Vec<usize> {
        if x >= self.width {
            return Vec::new();
        }
        (0..self.height).filter(|&y| self.get(y, x)).collect()
    }

    /// Tight bounding box of the foreground, `None` when empty.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut bbox: Option<BoundingBox> = None;
        for p in self.foreground() {
            let (y, x) = (p.y as usize, p.x as usize);
            let b = bbox.get_or_insert(BoundingBox {
                min_row: y,
                min_col: x,
                max_row: y + 1,
                max_col: x + 1,
            });
            b.min_row = b.min_row.min(y);
            b.min_col = b.min_col.min(x);
            b.max_row = b.max_row.max(y + 1);
            b.max_col = b.max_col.max(x + 1);
        }
        bbox
    }

    fn check_same_shape(&self, other: &BinaryMask) -> Result<(), MaskError> {
        if self.width != other.width || self.height != other.height {
            return Err(MaskError::ShapeMismatch {
                expected: (self.height, self.width),
                got: (other.height, other.width),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_checks_length() {
        assert!(BinaryMask::from_vec(3, 2, vec![false; 6]).is_ok());
        let err = BinaryMask::from_vec(3, 2, vec![false; 5]).unwrap_err();
        assert!(matches!(err, MaskError::InvalidBuffer { expected: 6, got: 5 }));
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut m = BinaryMask::new(4, 3);
        m.fill_rect(1..10, 2..10, true);
        assert_eq!(m.count(), 4);
        assert!(m.get(2, 3));
        assert!(!m.get(0, 3));
    }

    #[test]
    fn column_profile_counts_foreground() {
        let mut m = BinaryMask::new(3, 4);
        m.fill_rect(0..2, 1..2, true);
        m.fill_rect(0..4, 2..3, true);
        assert_eq!(m.column_sums(), vec![0.0, 2.0, 4.0]);
        assert_eq!(m.column_means(), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn without_clears_overlap_only() {
        let mut a = BinaryMask::new(3, 1);
        a.fill_rect(0..1, 0..3, true);
        let mut c = BinaryMask::new(3, 1);
        c.set(0, 1, true);
        let out = a.without(&c).expect("same shape");
        assert_eq!(out.data(), &[true, false, true]);
        assert_eq!(a.count(), 3);
    }

    #[test]
    fn bounding_box_is_half_open() {
        let mut m = BinaryMask::new(5, 5);
        m.set(1, 2, true);
        m.set(3, 4, true);
        let b = m.bounding_box().expect("non-empty");
        assert_eq!((b.min_row, b.min_col, b.max_row, b.max_col), (1, 2, 4, 5));
        assert!(BinaryMask::new(2, 2).bounding_box().is_none());
    }
}
