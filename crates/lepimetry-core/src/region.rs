//! Connected-component labeling and per-region shape properties.
//!
//! Labels are assigned in raster order of each region's first pixel, and
//! every region stores its pixels in raster order, so `pixels[0]` is always
//! the topmost-then-leftmost pixel. The contour tracer relies on that.

use image::Luma;
use imageproc::region_labelling::{self, connected_components};
use nalgebra::{Matrix2, SymmetricEigen};
use serde::{Deserialize, Serialize};

use crate::raster::to_luma;
use crate::{BinaryMask, BoundingBox, Pixel};

/// Pixel adjacency used for labeling.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Von Neumann neighborhood (edge-sharing pixels).
    Four,
    /// Moore neighborhood (edge- or corner-sharing pixels).
    #[default]
    Eight,
}

impl From<Connectivity> for region_labelling::Connectivity {
    fn from(c: Connectivity) -> Self {
        match c {
            Connectivity::Four => region_labelling::Connectivity::Four,
            Connectivity::Eight => region_labelling::Connectivity::Eight,
        }
    }
}

/// One labeled connected component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// 1-based label in raster order.
    pub label: u32,
    /// Member pixels in raster order.
    pub pixels: Vec<Pixel>,
    pub bbox: BoundingBox,
}

impl Region {
    /// Build a region from pixels in any order; they are sorted to raster order.
    pub fn from_pixels(label: u32, mut pixels: Vec<Pixel>) -> Option<Self> {
        if pixels.is_empty() || pixels.iter().any(|p| p.x < 0 || p.y < 0) {
            return None;
        }
        pixels.sort_unstable();
        let bbox = bbox_of(&pixels);
        Some(Self {
            label,
            pixels,
            bbox,
        })
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn min_col(&self) -> usize {
        self.bbox.min_col
    }

    /// Topmost-then-leftmost pixel.
    #[inline]
    pub fn first_pixel(&self) -> Pixel {
        self.pixels[0]
    }

    /// Mean `(row, col)` of the member pixels.
    pub fn centroid(&self) -> (f64, f64) {
        let n = self.pixels.len() as f64;
        let (sy, sx) = self
            .pixels
            .iter()
            .fold((0.0, 0.0), |(sy, sx), p| (sy + p.y as f64, sx + p.x as f64));
        (sy / n, sx / n)
    }

    /// Eccentricity of the ellipse with the same second central moments.
    ///
    /// 0 for a disc, approaching 1 for a thin line.
    pub fn eccentricity(&self) -> f64 {
        let (cy, cx) = self.centroid();
        let n = self.pixels.len() as f64;
        let (mut mu_yy, mut mu_xx, mut mu_xy) = (0.0, 0.0, 0.0);
        for p in &self.pixels {
            let dy = p.y as f64 - cy;
            let dx = p.x as f64 - cx;
            mu_yy += dy * dy;
            mu_xx += dx * dx;
            mu_xy += dx * dy;
        }
        let inertia = Matrix2::new(mu_yy / n, -mu_xy / n, -mu_xy / n, mu_xx / n);
        let eig = SymmetricEigen::new(inertia);
        let l1 = eig.eigenvalues[0].max(eig.eigenvalues[1]);
        let l2 = eig.eigenvalues[0].min(eig.eigenvalues[1]).max(0.0);
        if l1 <= f64::EPSILON {
            return 0.0;
        }
        (1.0 - l2 / l1).max(0.0).sqrt()
    }

    /// Area with interior holes filled.
    pub fn filled_area(&self) -> usize {
        // Background of the bbox raster padded by one pixel, so everything
        // outside the region is one 4-connected component through (0, 0).
        let h = self.bbox.height() + 2;
        let w = self.bbox.width() + 2;
        let mut background = BinaryMask::from_fn(w, h, |_, _| true);
        for p in &self.pixels {
            let ly = p.y as usize - self.bbox.min_row + 1;
            let lx = p.x as usize - self.bbox.min_col + 1;
            background.set(ly, lx, false);
        }

        let labels = connected_components(
            &to_luma(&background),
            Connectivity::Four.into(),
            Luma([0u8]),
        );
        let outside = labels.get_pixel(0, 0)[0];
        let outside_count = labels.pixels().filter(|l| l[0] == outside).count();
        h * w - outside_count
    }

    /// Render the region into an all-background mask of the given size.
    pub fn to_mask(&self, width: usize, height: usize) -> BinaryMask {
        let mut mask = BinaryMask::new(width, height);
        for p in &self.pixels {
            let (y, x) = (p.y as usize, p.x as usize);
            if y < height && x < width {
                mask.set(y, x, true);
            }
        }
        mask
    }
}

/// Label all foreground components of `mask`.
pub fn label_regions(mask: &BinaryMask, connectivity: Connectivity) -> Vec<Region> {
    if mask.is_empty() {
        return Vec::new();
    }
    let labels = connected_components(&to_luma(mask), connectivity.into(), Luma([0u8]));

    let mut members: Vec<Vec<Pixel>> = Vec::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let Some(slot) = (label[0] as usize).checked_sub(1) else {
            continue;
        };
        if slot >= members.len() {
            members.resize_with(slot + 1, Vec::new);
        }
        members[slot].push(Pixel::new(y as i32, x as i32));
    }

    // Pixels are collected row by row, so each list is already in raster
    // order; relabel by first pixel to keep labels in raster order too.
    members.retain(|pixels| !pixels.is_empty());
    members.sort_by_key(|pixels| pixels[0]);
    members
        .into_iter()
        .zip(1u32..)
        .filter_map(|(pixels, label)| Region::from_pixels(label, pixels))
        .collect()
}

/// Regions sorted by decreasing area; ties keep label order.
pub fn regions_by_area(mask: &BinaryMask, connectivity: Connectivity) -> Vec<Region> {
    let mut regions = label_regions(mask, connectivity);
    regions.sort_by(|a, b| b.area().cmp(&a.area()));
    regions
}

/// Largest connected component, `None` for an empty mask.
pub fn largest_region(mask: &BinaryMask, connectivity: Connectivity) -> Option<Region> {
    regions_by_area(mask, connectivity).into_iter().next()
}

fn bbox_of(pixels: &[Pixel]) -> BoundingBox {
    let mut b = BoundingBox {
        min_row: usize::MAX,
        min_col: usize::MAX,
        max_row: 0,
        max_col: 0,
    };
    for p in pixels {
        let (y, x) = (p.y as usize, p.x as usize);
        b.min_row = b.min_row.min(y);
        b.min_col = b.min_col.min(x);
        b.max_row = b.max_row.max(y + 1);
        b.max_col = b.max_col.max(x + 1);
    }
    b
}
