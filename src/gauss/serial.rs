//! Serial implementation of band smoothing

use super::kernel::GaussKernel;
use super::traits::BandSmoothOps;
use crate::volume::{Intensity, VolumeDims};
use std::ops::Range;

/// Serial implementation of `BandSmoothOps`.
pub struct SerialBandOps;

impl SerialBandOps {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for SerialBandOps {
    fn default() -> Self {
        Self::new()
    }
}

impl BandSmoothOps for SerialBandOps {
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

        let planes = &mut smoothed[dims.plane_range(&z_range)];
        for (offset, plane) in planes.chunks_mut(dims.slice_len()).enumerate() {
            kernel.convolve_plane(source, dims, z_range.start + offset, plane);
        }
    }
}
