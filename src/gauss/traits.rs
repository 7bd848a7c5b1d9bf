//! Traits defining band smoothing operations for dependency inversion

use super::kernel::GaussKernel;
use crate::volume::{Intensity, VolumeDims};
use std::ops::Range;

/// Applies a [`GaussKernel`] to a contiguous band of Z-planes.
pub trait BandSmoothOps {
    /// Replace every interior voxel of the planes in `z_range` with the kernel-weighted
    /// sum of `source`. `z_range` is clamped to `[radius, nz − radius)` first.
    fn smooth_band<T: Intensity>(
        &self,
        kernel: &GaussKernel,
        source: &[T],
        dims: VolumeDims,
        smoothed: &mut [f32],
        z_range: Range<usize>,
    );
}
