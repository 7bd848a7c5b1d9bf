//! Test support library
//! Synthetic volumes and mesh measurements shared by the integration tests.
#![allow(dead_code)]

use activevol::{SeedMesh, VolumeDims, float_types::Real};
use nalgebra::Point3;

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// A cube of side `n` holding a bright ball of `radius` voxels around its center.
pub fn bright_ball(n: usize, radius: Real, inside: u8, outside: u8) -> (VolumeDims, Vec<u8>) {
    let dims = VolumeDims::new(n, n, n).unwrap();
    let center = n as Real / 2.0;
    let data = (0..dims.len())
        .map(|i| {
            let [x, y, z] = dims.delinearize(i).map(|c| c as Real - center);
            if (x * x + y * y + z * z).sqrt() <= radius {
                inside
            } else {
                outside
            }
        })
        .collect();
    (dims, data)
}

/// Rows along X that are dark (10) for 8 voxels at both ends, then ramp up by 2 per
/// voxel toward a plateau of 200 in the middle. Every row is identical.
pub fn plateau_ramp() -> (VolumeDims, Vec<f32>) {
    let dims = VolumeDims::new(216, 4, 4).unwrap();
    let data = (0..dims.len())
        .map(|i| {
            let x = dims.delinearize(i)[0];
            let d = x.min(dims.nx - 1 - x) as f32;
            (10.0 + 2.0 * (d - 7.0)).clamp(10.0, 200.0)
        })
        .collect();
    (dims, data)
}

/// `(min, mean, max)` distance of the mesh vertices from `center`.
pub fn radii(mesh: &SeedMesh, center: Point3<Real>) -> (Real, Real, Real) {
    let distances: Vec<Real> = (0..mesh.num_vertices())
        .map(|i| (mesh.position(i) - center).norm())
        .collect();
    let min = distances.iter().copied().fold(Real::MAX, Real::min);
    let max = distances.iter().copied().fold(0.0, Real::max);
    let mean = distances.iter().sum::<Real>() / distances.len() as Real;
    (min, mean, max)
}
