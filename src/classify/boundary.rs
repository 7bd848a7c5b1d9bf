//! Left/right tissue boundary search in a central window of the volume.
//!
//! The background ("black") level is taken from thin strips at both X ends of the
//! window rows; a boundary is the first voxel, scanning inward from either end,
//! that is brighter than the background by [`BOUNDARY_CONTRAST`].

use super::histogram::Histogram;
use crate::volume::VolumeDims;
use std::ops::Range;

/// Half-extent of the central Y/Z window, in voxels.
pub const WINDOW_HALF_EXTENT: usize = 4;

/// Border strips are `20/526` of the X extent wide (at least one column).
const STRIP_NUMERATOR: usize = 20;
const STRIP_DENOMINATOR: usize = 526;

/// Intensity step above the background that marks tissue.
pub const BOUNDARY_CONTRAST: f32 = 40.0;

/// Boundaries of one window row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBoundary {
    pub y: usize,
    pub z: usize,
    pub left: usize,
    pub right: usize,
}

/// Result of [`scan_boundaries`].
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryScan {
    /// Mean intensity of the border strips.
    pub black: f32,
    /// Width of the border strips, and of the bands sampled inside each boundary.
    pub strip_width: usize,
    /// Rows in which both boundaries were found.
    pub rows: Vec<RowBoundary>,
}

/// Width of the border strips for an X extent of `nx`.
pub fn strip_width(nx: usize) -> usize {
    (nx * STRIP_NUMERATOR / STRIP_DENOMINATOR).clamp(1, nx)
}

fn window(center: usize, len: usize) -> Range<usize> {
    center.saturating_sub(WINDOW_HALF_EXTENT)..(center + WINDOW_HALF_EXTENT + 1).min(len)
}

/// Scan the rows of the central window for tissue boundaries. Returns `None` only if
/// the window sampled no voxels, which valid dimensions rule out.
pub fn scan_boundaries(smoothed: &[f32], dims: VolumeDims) -> Option<BoundaryScan> {
    let [_, cy, cz] = dims.center();
    let (ys, zs) = (window(cy, dims.ny), window(cz, dims.nz));
    let w = strip_width(dims.nx);
    let row = |y: usize, z: usize| {
        let start = dims.linearize([0, y, z]);
        &smoothed[start..start + dims.nx]
    };

    let mut sum = 0.0f64;
    let mut count = 0usize;
    for z in zs.clone() {
        for y in ys.clone() {
            let values = row(y, z);
            for &v in values[..w].iter().chain(&values[dims.nx - w..]) {
                sum += v as f64;
                count += 1;
            }
        }
    }
    if count == 0 {
        return None;
    }
    let black = (sum / count as f64) as f32;
    let threshold = black + BOUNDARY_CONTRAST;

    let mut rows = Vec::new();
    for z in zs {
        for y in ys.clone() {
            let values = row(y, z);
            let left = values.iter().position(|&v| v > threshold);
            let right = values.iter().rposition(|&v| v > threshold);
            if let (Some(left), Some(right)) = (left, right) {
                rows.push(RowBoundary { y, z, left, right });
            }
        }
    }

    Some(BoundaryScan {
        black,
        strip_width: w,
        rows,
    })
}

impl BoundaryScan {
    /// Histogram of the bands just inside each boundary: `[left, left + w)` and
    /// `(right − w, right]`, clipped to the row.
    pub fn band_histogram(&self, smoothed: &[f32], dims: VolumeDims) -> Histogram {
        let w = self.strip_width;
        let mut histogram = Histogram::new();
        for b in &self.rows {
            let start = dims.linearize([0, b.y, b.z]);
            let values = &smoothed[start..start + dims.nx];

            let left_band = b.left..(b.left + w).min(dims.nx);
            let right_band = (b.right + 1).saturating_sub(w)..b.right + 1;
            left_band
                .chain(right_band)
                .for_each(|x| histogram.add(values[x]));
        }
        histogram
    }
}
