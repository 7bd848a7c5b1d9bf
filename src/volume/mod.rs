//! Dense volume storage: the caller's source samples plus the derived float buffers
//! (smoothed, uniformity, gradient) the engine fills in band by band.

use crate::errors::{DimensionBound, SegmentationError, SegmentationResult};
use crate::float_types::{MAX_VOLUME_DIM, Real};
use nalgebra::Point3;
use std::ops::Range;

pub mod statistics;

/// A source sample that can be read as an intensity, conceptually in `[0, 255]`.
pub trait Intensity: Copy + Send + Sync {
    fn intensity(self) -> f32;
}

impl Intensity for u8 {
    #[inline]
    fn intensity(self) -> f32 {
        self as f32
    }
}

impl Intensity for u16 {
    #[inline]
    fn intensity(self) -> f32 {
        self as f32
    }
}

impl Intensity for f32 {
    #[inline]
    fn intensity(self) -> f32 {
        self
    }
}

impl Intensity for f64 {
    #[inline]
    fn intensity(self) -> f32 {
        self as f32
    }
}

/// The shape of a row-major voxel grid, index `x + y·nx + z·nx·ny`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeDims {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

impl VolumeDims {
    /// Validate and build the shape. Every axis must lie in `(1, 8192)`;
    /// an oversized axis is reported before an undersized one.
    pub fn new(nx: usize, ny: usize, nz: usize) -> SegmentationResult<Self> {
        let bound = if nx >= MAX_VOLUME_DIM || ny >= MAX_VOLUME_DIM || nz >= MAX_VOLUME_DIM {
            Some(DimensionBound::TooLarge)
        } else if nx <= 1 || ny <= 1 || nz <= 1 {
            Some(DimensionBound::TooSmall)
        } else {
            None
        };

        match bound {
            Some(bound) => Err(SegmentationError::InvalidDimensions {
                x: nx,
                y: ny,
                z: nz,
                bound,
            }),
            None => Ok(VolumeDims { nx, ny, nz }),
        }
    }

    /// Total voxel count.
    #[inline]
    pub const fn len(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Voxels in one Z-plane.
    #[inline]
    pub const fn slice_len(&self) -> usize {
        self.nx * self.ny
    }

    /// Dimensions as an `[x, y, z]` array.
    #[inline]
    pub const fn as_array(&self) -> [usize; 3] {
        [self.nx, self.ny, self.nz]
    }

    /// Largest axis.
    pub fn max_dim(&self) -> usize {
        self.nx.max(self.ny).max(self.nz)
    }

    /// Integer center voxel.
    pub const fn center(&self) -> [usize; 3] {
        [self.nx / 2, self.ny / 2, self.nz / 2]
    }

    #[inline]
    pub const fn linearize(&self, coords: [usize; 3]) -> usize {
        let [x, y, z] = coords;
        (z * self.ny + y) * self.nx + x
    }

    #[inline]
    pub const fn delinearize(&self, i: usize) -> [usize; 3] {
        let x = i % self.nx;
        let yz = i / self.nx;
        let y = yz % self.ny;
        let z = yz / self.ny;
        [x, y, z]
    }

    /// Linear index range covered by the Z-planes in `z_range`.
    pub const fn plane_range(&self, z_range: &Range<usize>) -> Range<usize> {
        z_range.start * self.slice_len()..z_range.end * self.slice_len()
    }

    /// Clamp a continuous position into the voxel grid.
    pub fn clamp_point(&self, p: &Point3<Real>) -> Point3<Real> {
        Point3::new(
            p.x.clamp(0.0, (self.nx - 1) as Real),
            p.y.clamp(0.0, (self.ny - 1) as Real),
            p.z.clamp(0.0, (self.nz - 1) as Real),
        )
    }
}

/// Selects one of the derived float buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Smoothed,
    Uniformity,
    Gradient,
}

/// The source volume and every buffer derived from it.
#[derive(Debug, Clone)]
pub struct VolumeBuffers<'a, T: Intensity> {
    dims: VolumeDims,
    source: &'a [T],
    pub smoothed: Vec<f32>,
    pub uniformity: Vec<f32>,
    pub gradient: Vec<f32>,
}

impl<'a, T: Intensity> VolumeBuffers<'a, T> {
    /// Validate the shape and allocate zeroed derived buffers. Nothing is allocated
    /// when validation fails.
    pub fn create(dims: VolumeDims, source: &'a [T]) -> SegmentationResult<Self> {
        let dims = VolumeDims::new(dims.nx, dims.ny, dims.nz)?;
        if source.len() != dims.len() {
            return Err(SegmentationError::VolumeLengthMismatch {
                expected: dims.len(),
                actual: source.len(),
            });
        }

        Ok(VolumeBuffers {
            dims,
            source,
            smoothed: vec![0.0; dims.len()],
            uniformity: vec![0.0; dims.len()],
            gradient: vec![0.0; dims.len()],
        })
    }

    pub const fn dims(&self) -> VolumeDims {
        self.dims
    }

    pub const fn source(&self) -> &'a [T] {
        self.source
    }

    pub fn buffer(&self, kind: BufferKind) -> &[f32] {
        match kind {
            BufferKind::Smoothed => &self.smoothed,
            BufferKind::Uniformity => &self.uniformity,
            BufferKind::Gradient => &self.gradient,
        }
    }
}

/// Trilinear interpolation of `data` at `p`; positions outside the grid are clamped.
pub fn sample_trilinear(data: &[f32], dims: VolumeDims, p: &Point3<Real>) -> Real {
    let p = dims.clamp_point(p);

    let x0 = (p.x.floor() as usize).min(dims.nx - 2);
    let y0 = (p.y.floor() as usize).min(dims.ny - 2);
    let z0 = (p.z.floor() as usize).min(dims.nz - 2);
    let fx = p.x - x0 as Real;
    let fy = p.y - y0 as Real;
    let fz = p.z - z0 as Real;

    let at = |x: usize, y: usize, z: usize| data[dims.linearize([x, y, z])] as Real;

    let c00 = at(x0, y0, z0) * (1.0 - fx) + at(x0 + 1, y0, z0) * fx;
    let c10 = at(x0, y0 + 1, z0) * (1.0 - fx) + at(x0 + 1, y0 + 1, z0) * fx;
    let c01 = at(x0, y0, z0 + 1) * (1.0 - fx) + at(x0 + 1, y0, z0 + 1) * fx;
    let c11 = at(x0, y0 + 1, z0 + 1) * (1.0 - fx) + at(x0 + 1, y0 + 1, z0 + 1) * fx;

    let c0 = c00 * (1.0 - fy) + c10 * fy;
    let c1 = c01 * (1.0 - fy) + c11 * fy;
    c0 * (1.0 - fz) + c1 * fz
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dims_bounds() {
        assert!(VolumeDims::new(2, 2, 2).is_ok());
        assert!(VolumeDims::new(8191, 2, 2).is_ok());

        let err = VolumeDims::new(8192, 16, 16).unwrap_err();
        assert_eq!(err.status_code(), -1);

        let err = VolumeDims::new(16, 1, 16).unwrap_err();
        assert_eq!(err.status_code(), -2);

        // too-large wins when both apply
        let err = VolumeDims::new(0, 9000, 16).unwrap_err();
        assert!(matches!(
            err,
            SegmentationError::InvalidDimensions {
                bound: DimensionBound::TooLarge,
                ..
            }
        ));
    }

    #[test]
    fn test_linearize_roundtrip_matches_row_major() {
        let dims = VolumeDims::new(5, 3, 4).unwrap();
        assert_eq!(dims.linearize([1, 2, 3]), 1 + 2 * 5 + 3 * 5 * 3);
        for i in [0, 7, 29, dims.len() - 1] {
            assert_eq!(dims.linearize(dims.delinearize(i)), i);
        }
    }

    #[test]
    fn test_create_allocates_zeroed_buffers() {
        let dims = VolumeDims::new(3, 4, 5).unwrap();
        let source = vec![7u8; dims.len()];
        let buffers = VolumeBuffers::create(dims, &source).unwrap();
        assert_eq!(buffers.smoothed.len(), 60);
        assert_eq!(buffers.uniformity.len(), 60);
        assert_eq!(buffers.gradient.len(), 60);
        assert!(buffers.smoothed.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_create_rejects_length_mismatch() {
        let dims = VolumeDims::new(3, 4, 5).unwrap();
        let source = vec![0u8; 59];
        assert!(matches!(
            VolumeBuffers::create(dims, &source),
            Err(SegmentationError::VolumeLengthMismatch {
                expected: 60,
                actual: 59
            })
        ));
    }

    #[test]
    fn test_trilinear_interpolates_linear_ramp() {
        let dims = VolumeDims::new(4, 4, 4).unwrap();
        let data: Vec<f32> = (0..dims.len())
            .map(|i| dims.delinearize(i)[0] as f32 * 10.0)
            .collect();

        assert_relative_eq!(
            sample_trilinear(&data, dims, &Point3::new(1.5, 2.0, 1.0)),
            15.0,
            epsilon = 1e-5
        );
        // the far corner is reachable even though x0 is capped at nx - 2
        assert_relative_eq!(
            sample_trilinear(&data, dims, &Point3::new(3.0, 3.0, 3.0)),
            30.0,
            epsilon = 1e-5
        );
        // clamped outside the grid
        assert_relative_eq!(
            sample_trilinear(&data, dims, &Point3::new(-4.0, 0.0, 0.0)),
            0.0,
            epsilon = 1e-5
        );
    }
}
