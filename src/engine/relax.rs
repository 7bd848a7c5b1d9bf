//! Mesh relaxation passes.

use super::state::StageOutcome;
use crate::classify::Histogram;
use crate::float_types::{INTENSITY_LEVELS, Real};
use crate::mesh::SeedMesh;
use crate::params::DeformationParams;
use crate::volume::{VolumeDims, sample_trilinear};
use nalgebra::{Point3, Vector3, Vector4};

/// Which data drives a relaxation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelaxMethod {
    /// Move every vertex along its normal at full speed, ignoring the volume.
    InflateOnly,
    /// Inflate, slowed down where the smoothed volume is not locally uniform.
    InflateWithUniformity,
    /// Inflate, weighted by uniformity and by both classification curves at the
    /// vertex intensity, with a tangential pull toward the one-ring centroid.
    #[default]
    FullRelaxation,
}

/// Read-only inputs of a pass.
pub struct RelaxInputs<'b> {
    pub dims: VolumeDims,
    pub smoothed: &'b [f32],
    pub uniformity: &'b [f32],
    pub color_koefs: &'b [f32; INTENSITY_LEVELS],
    pub color_probability: &'b [f32; INTENSITY_LEVELS],
    pub params: &'b DeformationParams,
}

impl RelaxInputs<'_> {
    /// Growth weight in `[0, 1]` at `p`.
    fn weight(&self, method: RelaxMethod, p: &Point3<Real>) -> Real {
        match method {
            RelaxMethod::InflateOnly => 1.0,
            RelaxMethod::InflateWithUniformity => {
                sample_trilinear(self.uniformity, self.dims, p)
            },
            RelaxMethod::FullRelaxation => {
                let uniformity = sample_trilinear(self.uniformity, self.dims, p);
                let bin = Histogram::bin(sample_trilinear(self.smoothed, self.dims, p) as f32);
                uniformity
                    * self.color_koefs[bin] as Real
                    * self.color_probability[bin] as Real
            },
        }
    }
}

/// Run one pass over every vertex.
///
/// New positions go to `scratch` first so that every vertex sees the positions of
/// the previous pass, and are clamped into the volume. Normals are recomputed
/// afterwards. The pass converges when no vertex moved by `convergence_epsilon` or
/// more; otherwise the pass numbered `max_iterations − 1` reports the cap.
pub fn relax_pass(
    method: RelaxMethod,
    mesh: &mut SeedMesh,
    adjacency: &[Vec<u32>],
    scratch: &mut [Vector4<Real>],
    inputs: &RelaxInputs<'_>,
    iteration: usize,
) -> (StageOutcome, Real) {
    let params = inputs.params;
    let mut max_displacement: Real = 0.0;

    for (i, slot) in scratch.iter_mut().enumerate().take(mesh.num_vertices()) {
        let p = mesh.position(i);
        let n = mesh.normals[i];

        let mut next = p + n * (params.speed * inputs.weight(method, &p));

        let neighbors = adjacency.get(i).map(Vec::as_slice).unwrap_or(&[]);
        if method == RelaxMethod::FullRelaxation && !neighbors.is_empty() {
            let centroid = neighbors
                .iter()
                .map(|&j| mesh.position(j as usize).coords)
                .sum::<Vector3<Real>>()
                / neighbors.len() as Real;
            let pull = centroid - p.coords;
            let tangential = pull - n * pull.dot(&n);
            next += tangential * params.smoothing_lambda;
        }

        let next = inputs.dims.clamp_point(&next);
        max_displacement = max_displacement.max((next - p).norm());
        *slot = Vector4::new(next.x, next.y, next.z, 1.0);
    }

    for (i, s) in scratch.iter().enumerate().take(mesh.num_vertices()) {
        mesh.set_position(i, &Point3::new(s.x, s.y, s.z));
    }
    mesh.compute_vertex_normals();

    let outcome = if max_displacement < params.convergence_epsilon {
        StageOutcome::Converged
    } else if iteration + 1 >= params.max_iterations {
        StageOutcome::IterationCap
    } else {
        StageOutcome::Continue
    };
    (outcome, max_displacement)
}
