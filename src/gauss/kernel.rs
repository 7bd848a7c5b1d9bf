//! The cubic Gaussian kernel and its application to one Z-plane.

use crate::errors::{SegmentationError, SegmentationResult};
use crate::volume::{Intensity, VolumeDims};
use std::ops::Range;

/// A normalized `(1 + 2·radius)³` Gaussian kernel, laid out z-major like the volume.
///
/// Offsets along every axis are normalized to `[-1, 1]` by dividing by `radius`,
/// and the weight of an offset is `exp(−dist² / (3σ²))`. Weights sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussKernel {
    radius: usize,
    weights: Vec<f32>,
}

impl GaussKernel {
    pub fn new(radius: usize, sigma: f32) -> SegmentationResult<Self> {
        if radius == 0 {
            return Err(SegmentationError::invalid_parameter(
                "Gaussian kernel radius must be at least 1",
            ));
        }
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(SegmentationError::invalid_parameter(format!(
                "Gaussian kernel sigma must be positive and finite, got {sigma}"
            )));
        }

        let side = 1 + 2 * radius;
        let denom = 3.0 * sigma * sigma;
        let scale = radius as f32;
        let r = radius as isize;

        let mut weights = Vec::with_capacity(side * side * side);
        for dz in -r..=r {
            for dy in -r..=r {
                for dx in -r..=r {
                    let (fx, fy, fz) = (dx as f32 / scale, dy as f32 / scale, dz as f32 / scale);
                    let dist_sq = fx * fx + fy * fy + fz * fz;
                    weights.push((-dist_sq / denom).exp());
                }
            }
        }

        let sum: f32 = weights.iter().sum();
        weights.iter_mut().for_each(|w| *w /= sum);

        Ok(GaussKernel { radius, weights })
    }

    pub const fn radius(&self) -> usize {
        self.radius
    }

    pub const fn side(&self) -> usize {
        1 + 2 * self.radius
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// The part of `0..len` the kernel footprint fits into: `[radius, len − radius)`.
    pub fn interior(&self, len: usize) -> Range<usize> {
        let start = self.radius;
        let end = len.saturating_sub(self.radius).max(start);
        start..end
    }

    /// Convolve the interior of plane `z` of `source` into `plane`, which holds that
    /// same plane of the smoothed buffer. Border columns and rows of `plane` are
    /// left as they are.
    pub fn convolve_plane<T: Intensity>(
        &self,
        source: &[T],
        dims: VolumeDims,
        z: usize,
        plane: &mut [f32],
    ) {
        let side = self.side();
        for y in self.interior(dims.ny) {
            for x in self.interior(dims.nx) {
                let mut acc = 0.0f32;
                let mut k = 0;
                for kz in 0..side {
                    for ky in 0..side {
                        let row = dims.linearize([
                            x - self.radius,
                            y + ky - self.radius,
                            z + kz - self.radius,
                        ]);
                        for (w, sample) in self.weights[k..k + side]
                            .iter()
                            .zip(&source[row..row + side])
                        {
                            acc += w * sample.intensity();
                        }
                        k += side;
                    }
                }
                plane[y * dims.nx + x] = acc;
            }
        }
    }
}
