//! Moore-neighbor boundary tracing.

use lepimetry_core::{BinaryMask, Pixel, Region};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::ContourError;

/// Clockwise 8-neighborhood, starting straight up: `(dy, dx)`.
const MOORE_OFFSETS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

/// Closed outer boundary of a region, clockwise from its topmost-then-leftmost pixel.
///
/// The last pixel is adjacent to the first; the closing pixel is not
/// repeated. One-pixel-wide protrusions are walked out and back, so such
/// pixels appear twice.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundary {
    pub pixels: Vec<Pixel>,
}

impl Boundary {
    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Continuous `(x, y)` points for smoothing and landmark search.
    pub fn to_points(&self) -> Vec<nalgebra::Point2<f64>> {
        self.pixels.iter().map(|p| p.to_point()).collect()
    }

    /// Same boundary shifted by `(dy, dx)`.
    pub fn translated(&self, dy: i32, dx: i32) -> Boundary {
        Boundary {
            pixels: self.pixels.iter().map(|p| p.offset(dy, dx)).collect(),
        }
    }
}

/// Trace the outer boundary of `region` with Moore-neighbor tracing.
///
/// The walk stops only when it re-enters the start pixel from the same
/// backtrack pixel it started with (Jacob's stopping criterion), so
/// boundaries that touch themselves are not cut short.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(region), fields(area = region.area()))
)]
pub fn trace_boundary(region: &Region) -> Result<Boundary, ContourError> {
    if region.pixels.is_empty() {
        return Err(ContourError::EmptyRegion);
    }

    // Local raster with a one pixel margin so every neighbor lookup stays in bounds.
    let oy = region.bbox.min_row as i32 - 1;
    let ox = region.bbox.min_col as i32 - 1;
    let mut raster = BinaryMask::new(region.bbox.width() + 2, region.bbox.height() + 2);
    for p in &region.pixels {
        raster.set((p.y - oy) as usize, (p.x - ox) as usize, true);
    }

    let start = region.first_pixel().offset(-oy, -ox);
    if region.area() == 1 {
        return Ok(Boundary {
            pixels: vec![start.offset(oy, ox)],
        });
    }

    let below = start.offset(1, 0);
    let below_left = start.offset(1, -1);
    let backtrack_start = if !raster.at(below) && !raster.at(below_left) {
        below
    } else {
        start.offset(0, -1)
    };

    let max_steps = 8 * region.area() + 8;
    let mut current = start;
    let mut backtrack = backtrack_start;
    let mut pixels = Vec::new();

    loop {
        let ring = moore_ring(current, backtrack).ok_or(ContourError::LostBacktrack {
            at: current.offset(oy, ox),
        })?;
        let Some(idx) = ring.iter().position(|&p| raster.at(p)) else {
            return Err(ContourError::LostBacktrack {
                at: current.offset(oy, ox),
            });
        };

        pixels.push(current.offset(oy, ox));
        backtrack = ring[(idx + 7) % 8];
        current = ring[idx];

        if current == start && backtrack == backtrack_start {
            break;
        }
        if pixels.len() > max_steps {
            return Err(ContourError::Unclosed { steps: pixels.len() });
        }
    }

    log::debug!(
        "traced boundary of region {} ({} px): {} points",
        region.label,
        region.area(),
        pixels.len()
    );
    Ok(Boundary { pixels })
}

/// The 8 neighbors of `current` in clockwise order, starting at `backtrack`.
fn moore_ring(current: Pixel, backtrack: Pixel) -> Option<[Pixel; 8]> {
    let rel = (backtrack.y - current.y, backtrack.x - current.x);
    let first = MOORE_OFFSETS.iter().position(|&o| o == rel)?;
    let mut ring = [current; 8];
    for (i, slot) in ring.iter_mut().enumerate() {
        let (dy, dx) = MOORE_OFFSETS[(first + i) % 8];
        *slot = current.offset(dy, dx);
    }
    Some(ring)
}
