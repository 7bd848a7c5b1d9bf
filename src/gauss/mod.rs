//! Bounded 3D Gaussian smoothing of the source volume, one Z-band per call.
//!
//! This module provides band smoothing with dependency inversion, allowing for
//! different algorithm implementations (serial/parallel).
//!
//! # Border shell
//!
//! Only voxels at least `radius` away from every face of the volume are convolved.
//! [`GaussianSmoother::prime`] copies the raw source into the smoothed buffer before
//! the first band, so the outer `radius` voxels keep their source intensity for the
//! whole run.

pub mod kernel;
pub mod serial;
pub mod traits;

#[cfg(feature = "parallel")]
pub mod parallel;

// Re-export core types
pub use kernel::GaussKernel;
pub use traits::BandSmoothOps;

#[cfg(not(feature = "parallel"))]
pub use serial::SerialBandOps;

#[cfg(feature = "parallel")]
pub use parallel::ParallelBandOps;

use crate::errors::SegmentationResult;
use crate::volume::{Intensity, VolumeDims};
use std::ops::Range;

/// Z-planes owned by `stage` when `z_dim` planes are split into `bands` bands:
/// `⌊z·stage/bands⌋ .. ⌊z·(stage+1)/bands⌋`. Consecutive stages partition `0..z_dim`.
pub const fn band_range(z_dim: usize, stage: usize, bands: usize) -> Range<usize> {
    (z_dim * stage / bands)..(z_dim * (stage + 1) / bands)
}

/// Holds the kernel for one smoothing stage.
#[derive(Debug, Clone)]
pub struct GaussianSmoother {
    kernel: GaussKernel,
}

impl GaussianSmoother {
    pub fn new(radius: usize, sigma: f32) -> SegmentationResult<Self> {
        Ok(GaussianSmoother {
            kernel: GaussKernel::new(radius, sigma)?,
        })
    }

    pub const fn kernel(&self) -> &GaussKernel {
        &self.kernel
    }

    /// Copy `source` into `smoothed` as the starting state of a run.
    pub fn prime<T: Intensity>(&self, source: &[T], smoothed: &mut [f32]) {
        smoothed
            .iter_mut()
            .zip(source)
            .for_each(|(dst, src)| *dst = src.intensity());
    }

    /// Convolve the interior voxels of the planes in `z_range`.
    pub fn smooth_band<T: Intensity>(
        &self,
        source: &[T],
        dims: VolumeDims,
        smoothed: &mut [f32],
        z_range: Range<usize>,
    ) {
        #[cfg(not(feature = "parallel"))]
        let ops = SerialBandOps::new();
        #[cfg(feature = "parallel")]
        let ops = ParallelBandOps::new();

        ops.smooth_band(&self.kernel, source, dims, smoothed, z_range);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float_types::STAGE_BANDS;

    fn corner_volume() -> (VolumeDims, Vec<u8>) {
        let dims = VolumeDims::new(4, 4, 4).unwrap();
        let mut source = vec![100u8; dims.len()];
        source[0] = 0;
        (dims, source)
    }

    fn smooth_all_bands<T: Intensity>(
        smoother: &GaussianSmoother,
        dims: VolumeDims,
        source: &[T],
    ) -> Vec<f32> {
        let mut smoothed = vec![0.0; dims.len()];
        smoother.prime(source, &mut smoothed);
        for stage in 0..STAGE_BANDS {
            smoother.smooth_band(
                source,
                dims,
                &mut smoothed,
                band_range(dims.nz, stage, STAGE_BANDS),
            );
        }
        smoothed
    }

    #[test]
    fn test_band_ranges_partition_z() {
        for z_dim in [2, 4, 17, 18, 100, 513] {
            let mut next = 0;
            for stage in 0..STAGE_BANDS {
                let band = band_range(z_dim, stage, STAGE_BANDS);
                assert_eq!(band.start, next);
                next = band.end;
            }
            assert_eq!(next, z_dim);
        }
    }

    #[test]
    fn test_corner_voxel_stays_in_border_shell() {
        let (dims, source) = corner_volume();
        let smoother = GaussianSmoother::new(1, 1.8).unwrap();
        let smoothed = smooth_all_bands(&smoother, dims, &source);

        // raw copy survives in the untouched shell
        assert_eq!(smoothed[0], 0.0);
        assert_eq!(smoothed[dims.linearize([3, 3, 3])], 100.0);
        assert_eq!(smoothed[dims.linearize([0, 2, 2])], 100.0);

        // (1,1,1) sees the dark corner through its footprint
        let interior = smoothed[dims.linearize([1, 1, 1])];
        assert!(interior < 100.0, "interior voxel should differ, got {interior}");
        assert!(interior > 90.0);

        // (2,2,2) does not
        let far = smoothed[dims.linearize([2, 2, 2])];
        assert!((far - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_band_partition_invariance() {
        let dims = VolumeDims::new(9, 7, 11).unwrap();
        let source: Vec<u8> = (0..dims.len()).map(|i| ((i * 37) % 251) as u8).collect();
        let smoother = GaussianSmoother::new(2, 1.8).unwrap();

        let mut once = vec![0.0; dims.len()];
        smoother.prime(&source, &mut once);
        smoother.smooth_band(&source, dims, &mut once, 0..dims.nz);

        for split in [1, 4, 6, 10] {
            let mut banded = vec![0.0; dims.len()];
            smoother.prime(&source, &mut banded);
            smoother.smooth_band(&source, dims, &mut banded, 0..split);
            smoother.smooth_band(&source, dims, &mut banded, split..dims.nz);
            assert_eq!(once, banded, "split at z = {split}");
        }

        assert_eq!(once, smooth_all_bands(&smoother, dims, &source));
    }

    #[test]
    fn test_flat_volume_is_fixed_point() {
        let dims = VolumeDims::new(6, 6, 6).unwrap();
        let source = vec![55.0f32; dims.len()];
        let smoother = GaussianSmoother::new(1, 1.0).unwrap();
        let smoothed = smooth_all_bands(&smoother, dims, &source);
        assert!(smoothed.iter().all(|&v| (v - 55.0).abs() < 1e-3));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_serial_accumulation() {
        let dims = VolumeDims::new(8, 8, 8).unwrap();
        let source: Vec<u8> = (0..dims.len()).map(|i| (i % 200) as u8).collect();
        let kernel = GaussKernel::new(1, 1.8).unwrap();

        let mut expected = vec![0.0; dims.len()];
        serial::SerialBandOps::new().smooth_band(&kernel, &source, dims, &mut expected, 0..dims.nz);

        let mut actual = vec![0.0; dims.len()];
        ParallelBandOps::new().smooth_band(&kernel, &source, dims, &mut actual, 0..dims.nz);
        assert_eq!(expected, actual);
    }
}
