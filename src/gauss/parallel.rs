//! Parallel implementation of band smoothing

use super::kernel::GaussKernel;
use super::traits::BandSmoothOps;
use crate::volume::{Intensity, VolumeDims};
use rayon::prelude::*;
use std::ops::Range;

/// Parallel implementation of `BandSmoothOps`.
///
/// The planes of a band are disjoint in the output and only read the source, so
/// each is convolved on its own task with the same accumulation order as the
/// serial path.
pub struct ParallelBandOps;

impl ParallelBandOps {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for ParallelBandOps {
    fn default() -> Self {
        Self::new()
    }
}

impl BandSmoothOps for ParallelBandOps {
    fn smooth_band<T: Intensity>(
        &self,
        kernel: &GaussKernel,
        source: &[T],
        dims: VolumeDims,
        smoothed: &mut [f32],
        z_range: Range<usize>,
    ) {
        let interior = kernel.interior(dims.nz);
        let z_range = z_range.start.max(interior.start)..z_range.end.min(interior.end);
        if z_range.is_empty() {
            return;
        }

        smoothed[dims.plane_range(&z_range)]
            .par_chunks_mut(dims.slice_len())
            .enumerate()
            .for_each(|(offset, plane)| {
                kernel.convolve_plane(source, dims, z_range.start + offset, plane);
            });
    }
}
