//! Wing tip and wing/body junction of one wing.
//!
//! Two methods are available, see [`LandmarkMethod`].
//!
//! On a mask, the outer landmark is the wing pixel farthest from the body
//! center and the inner landmark is the deepest point of the background
//! pocket enclosed by the wing, the head and the body.
//!
//! On a boundary, the outer landmark is the point closest to the wing's top
//! corner. The inner landmark is found by walking the boundary away from
//! the tip (clockwise for the left wing, counter-clockwise for the right)
//! until the walk turns upward or back toward the outside of the specimen.
//! A Fourier-smoothed boundary keeps small ripples along straight edges,
//! and the walk can stop on the first of them instead of at the junction.

use lepimetry_core::{largest_region, BinaryMask, Connectivity, Pixel};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::WingError;

/// Which wing a boundary belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Geometric conventions of one side.
#[derive(Clone, Copy, Debug)]
struct SideConvention {
    /// The reference corner is top-right instead of top-left.
    corner_at_width: bool,
    /// Index increment along the boundary, +1 clockwise.
    direction: isize,
    /// Sign applied to x before testing that the walk moved outward.
    outward_sign: f64,
}

const LEFT: SideConvention = SideConvention {
    corner_at_width: false,
    direction: 1,
    outward_sign: -1.0,
};

const RIGHT: SideConvention = SideConvention {
    corner_at_width: true,
    direction: -1,
    outward_sign: 1.0,
};

impl Side {
    #[inline]
    fn convention(self) -> &'static SideConvention {
        match self {
            Side::Left => &LEFT,
            Side::Right => &RIGHT,
        }
    }

    /// Top corner of a frame of the given width, as an `(x, y)` point.
    pub fn corner(self, width: usize) -> Point2<f64> {
        if self.convention().corner_at_width {
            Point2::new(width as f64, 0.0)
        } else {
            Point2::new(0.0, 0.0)
        }
    }
}

/// Where the inner-landmark walk starts and how far each step goes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WalkSchedule {
    /// Start `offset` points past the tip and advance `step` points at a time.
    Fixed { offset: usize, step: usize },
    /// Offset and step as fractions of the boundary length.
    Proportional { offset_frac: f64, step_frac: f64 },
}

impl Default for WalkSchedule {
    fn default() -> Self {
        WalkSchedule::Fixed { offset: 50, step: 1 }
    }
}

impl WalkSchedule {
    /// `(offset, step)` for a boundary of `len` points. The step is at least 1.
    pub fn resolve(&self, len: usize) -> (usize, usize) {
        match *self {
            WalkSchedule::Fixed { offset, step } => (offset, step.max(1)),
            WalkSchedule::Proportional {
                offset_frac,
                step_frac,
            } => {
                let n = len as f64;
                let offset = (offset_frac.max(0.0) * n).round() as usize;
                let step = (step_frac.max(0.0) * n).round() as usize;
                (offset, step.max(1))
            }
        }
    }
}

/// Which representation of the wing the landmarks are read from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkMethod {
    /// Extremes of the wing half mask, see [`LandmarkDetector::detect_in_mask`].
    #[default]
    Mask,
    /// Walk along the smoothed boundary, see [`LandmarkDetector::detect`].
    Contour,
}

/// Parameters for [`LandmarkDetector`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkParams {
    pub method: LandmarkMethod,
    /// Boundary walk used by [`LandmarkMethod::Contour`].
    pub walk: WalkSchedule,
    /// Fraction of the frame height searched for the wing/body pocket.
    pub pocket_depth: f64,
}

impl Default for LandmarkParams {
    fn default() -> Self {
        Self {
            method: LandmarkMethod::Mask,
            walk: WalkSchedule::default(),
            pocket_depth: 0.75,
        }
    }
}

/// Where the boundary walk found the landmarks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryWalk {
    /// Boundary index of the tip.
    pub outer_index: usize,
    /// Number of boundary points walked past the tip.
    pub walked: usize,
}

/// Landmarks of a single wing, in the frame they were detected in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WingLandmarks {
    /// Wing tip.
    pub outer: Pixel,
    /// Wing/body junction.
    pub inner: Pixel,
    /// Set by the boundary walk, `None` for mask landmarks.
    pub walk: Option<BoundaryWalk>,
}

impl WingLandmarks {
    pub fn translated(self, dy: i32, dx: i32) -> Self {
        Self {
            outer: self.outer.offset(dy, dx),
            inner: self.inner.offset(dy, dx),
            ..self
        }
    }
}

/// The five landmarks of a specimen, full-image `(y, x)` pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandmarkSet {
    pub outer_pix_l: Pixel,
    pub inner_pix_l: Pixel,
    pub outer_pix_r: Pixel,
    pub inner_pix_r: Pixel,
    pub body_center: Pixel,
}

impl LandmarkSet {
    pub fn from_wings(left: &WingLandmarks, right: &WingLandmarks, body_center: Pixel) -> Self {
        Self {
            outer_pix_l: left.outer,
            inner_pix_l: left.inner,
            outer_pix_r: right.outer,
            inner_pix_r: right.inner,
            body_center,
        }
    }
}

/// Outer and inner landmark detector.
#[derive(Clone, Debug, Default)]
pub struct LandmarkDetector {
    params: LandmarkParams,
}

impl LandmarkDetector {
    pub fn new(params: LandmarkParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &LandmarkParams {
        &self.params
    }

    /// Detect both landmarks of one wing.
    ///
    /// `boundary` is a closed clockwise contour as `(x, y)` points, in a
    /// frame `width` columns wide.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, boundary), fields(len = boundary.len()))
    )]
    pub fn detect(
        &self,
        boundary: &[Point2<f64>],
        side: Side,
        width: usize,
    ) -> Result<WingLandmarks, WingError> {
        let n = boundary.len();
        let corner = side.corner(width);
        let outer_index = boundary
            .iter()
            .enumerate()
            .map(|(i, p)| (i, (*p - corner).norm()))
            .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((i, d)),
            })
            .map(|(i, _)| i)
            .ok_or(WingError::EmptyBoundary)?;

        let conv = side.convention();
        let at = |i: usize| {
            let j = (outer_index as isize + conv.direction * i as isize).rem_euclid(n as isize);
            boundary[j as usize]
        };

        let (offset, step) = self.params.walk.resolve(n);
        let mut i = offset;
        let inner = loop {
            let next = i + step;
            if next >= n {
                return Err(WingError::WalkExhausted { start: offset, len: n });
            }
            let (cur, nxt) = (at(i), at(next));
            i = next;
            let moved_up = cur.y > nxt.y;
            let moved_outward = conv.outward_sign * cur.x < conv.outward_sign * nxt.x;
            if moved_up || moved_outward {
                break nxt;
            }
        };

        let landmarks = WingLandmarks {
            outer: Pixel::from_point(boundary[outer_index]),
            inner: Pixel::from_point(inner),
            walk: Some(BoundaryWalk {
                outer_index,
                walked: i,
            }),
        };
        log::debug!(
            "{:?} wing: outer ({}, {}), inner ({}, {}) after {} points",
            side,
            landmarks.outer.y,
            landmarks.outer.x,
            landmarks.inner.y,
            landmarks.inner.x,
            i
        );
        Ok(landmarks)
    }

    /// Detect both landmarks on one half of the specimen mask.
    ///
    /// `half` is the specimen cropped to one side of the split column, with
    /// antennae removed. `body_center` is in the same frame, so the right
    /// half sees it at column 0.
    ///
    /// The tip is the pixel of the largest 4-connected region farthest from
    /// `body_center`; ties go to the first pixel in raster order. The
    /// junction is searched in the top `pocket_depth` of the frame, between
    /// the tip column and the split: the largest background region there is
    /// the pocket above the body, and its lowest row gives the junction at
    /// the end nearest the body.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, half), fields(w = half.width(), h = half.height()))
    )]
    pub fn detect_in_mask(
        &self,
        half: &BinaryMask,
        side: Side,
        body_center: Pixel,
    ) -> Result<WingLandmarks, WingError> {
        let wing = largest_region(half, Connectivity::Four).ok_or(WingError::EmptyMask)?;
        let outer = wing
            .pixels
            .iter()
            .map(|&p| (p, p.distance(body_center)))
            .fold(None, |best: Option<(Pixel, f64)>, (p, d)| match best {
                Some((_, bd)) if bd >= d => best,
                _ => Some((p, d)),
            })
            .map(|(p, _)| p)
            .ok_or(WingError::EmptyMask)?;

        let rows = (half.height() as f64 * self.params.pocket_depth.clamp(0.0, 1.0)) as usize;
        let tip_col = outer.x as usize;
        let cols = match side {
            Side::Left => tip_col..half.width(),
            Side::Right => 0..tip_col,
        };
        let col_offset = cols.start as i32;
        let pocket = largest_region(&half.crop(0..rows, cols).inverted(), Connectivity::Four)
            .ok_or(WingError::NoPocket { rows })?;

        // Pixels are in raster order, so the lowest row is a contiguous tail.
        let bottom = pocket.pixels.last().map_or(0, |p| p.y);
        let lowest = pocket.pixels.iter().filter(|p| p.y == bottom);
        let junction = match side {
            Side::Left => lowest.last(),
            Side::Right => lowest.min_by_key(|p| p.x),
        }
        .copied()
        .ok_or(WingError::NoPocket { rows })?;

        let landmarks = WingLandmarks {
            outer,
            inner: junction.offset(0, col_offset),
            walk: None,
        };
        log::debug!(
            "{:?} wing mask: outer ({}, {}), inner ({}, {}), pocket of {} px",
            side,
            landmarks.outer.y,
            landmarks.outer.x,
            landmarks.inner.y,
            landmarks.inner.x,
            pocket.area()
        );
        Ok(landmarks)
    }
}
