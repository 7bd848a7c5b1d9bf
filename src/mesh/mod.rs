//! The triangulated seed surface that the engine deforms, and the providers that
//! build it.

use crate::errors::{SegmentationError, SegmentationResult};
use crate::float_types::{Real, tolerance};
use crate::volume::VolumeDims;
use nalgebra::{Point3, Vector3, Vector4};

pub mod provider;

pub use provider::{MeshProvider, TetraSphereProvider};

/// A closed triangle mesh in render layout.
///
/// Vertices carry 4 components: the position and a reserved `w` (kept at 1).
/// Triangles index into `vertices`, counter-clockwise seen from outside.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedMesh {
    pub vertices: Vec<Vector4<Real>>,
    pub normals: Vec<Vector3<Real>>,
    pub triangles: Vec<[u32; 3]>,
}

impl SeedMesh {
    /// Build a mesh from positions and triangles; normals are computed.
    pub fn from_positions(positions: &[Point3<Real>], triangles: Vec<[u32; 3]>) -> Self {
        let mut mesh = SeedMesh {
            vertices: positions
                .iter()
                .map(|p| Vector4::new(p.x, p.y, p.z, 1.0))
                .collect(),
            normals: vec![Vector3::zeros(); positions.len()],
            triangles,
        };
        mesh.compute_vertex_normals();
        mesh
    }

    /// Check that every triangle indexes an existing vertex and that normals, when
    /// present, come one per vertex.
    pub fn validate(&self) -> SegmentationResult<()> {
        let n = self.vertices.len();
        if !self.normals.is_empty() && self.normals.len() != n {
            return Err(SegmentationError::mesh_import(format!(
                "{} normals for {} vertices",
                self.normals.len(),
                n
            )));
        }
        if let Some((t, tri)) = self
            .triangles
            .iter()
            .enumerate()
            .find(|(_, tri)| tri.iter().any(|&i| i as usize >= n))
        {
            return Err(SegmentationError::mesh_import(format!(
                "triangle {t} {tri:?} indexes past {n} vertices"
            )));
        }
        Ok(())
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn position(&self, i: usize) -> Point3<Real> {
        let v = &self.vertices[i];
        Point3::new(v.x, v.y, v.z)
    }

    pub fn set_position(&mut self, i: usize, p: &Point3<Real>) {
        let v = &mut self.vertices[i];
        v.x = p.x;
        v.y = p.y;
        v.z = p.z;
    }

    /// Area-weighted vertex normals: every triangle adds its unnormalized face
    /// normal (twice its area) to its three corners, then each sum is normalized.
    /// Vertices without a usable sum get `+Z`.
    pub fn compute_vertex_normals(&mut self) {
        self.normals.clear();
        self.normals.resize(self.vertices.len(), Vector3::zeros());

        for tri in &self.triangles {
            let [a, b, c] = tri.map(|i| i as usize);
            let (pa, pb, pc) = (self.position(a), self.position(b), self.position(c));
            let face = (pb - pa).cross(&(pc - pa));
            for i in [a, b, c] {
                self.normals[i] += face;
            }
        }

        let eps = tolerance();
        self.normals.iter_mut().for_each(|n| {
            let norm = n.norm();
            if norm > eps {
                *n /= norm;
            } else {
                *n = Vector3::z();
            }
        });
    }

    /// One-ring neighbours of every vertex, sorted and deduplicated.
    pub fn vertex_adjacency(&self) -> Vec<Vec<u32>> {
        let mut adjacency = vec![Vec::new(); self.vertices.len()];
        for &[a, b, c] in &self.triangles {
            for (from, to) in [(a, b), (b, c), (c, a)] {
                adjacency[from as usize].push(to);
                adjacency[to as usize].push(from);
            }
        }
        adjacency.iter_mut().for_each(|n| {
            n.sort_unstable();
            n.dedup();
        });
        adjacency
    }

    /// Map every vertex from unit-sphere space into voxel index space:
    /// `v' = dim/2 + (dim/2)·v` per axis.
    pub fn rescale_to_volume(&mut self, dims: VolumeDims) {
        let half = dims.as_array().map(|d| d as Real / 2.0);
        for v in &mut self.vertices {
            v.x = half[0] + half[0] * v.x;
            v.y = half[1] + half[1] * v.y;
            v.z = half[2] + half[2] * v.z;
        }
    }

    /// Flat `[x, y, z, w, ...]` vertex buffer.
    pub fn vertex_buffer(&self) -> Vec<Real> {
        self.vertices.iter().flat_map(|v| [v.x, v.y, v.z, v.w]).collect()
    }

    /// Flat triangle index buffer.
    pub fn index_buffer(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }

    /// Enclosed volume by the divergence theorem; positive for outward winding.
    pub fn volume(&self) -> Real {
        self.triangles
            .iter()
            .map(|tri| {
                let [a, b, c] = tri.map(|i| self.position(i as usize).coords);
                a.dot(&b.cross(&c)) / 6.0
            })
            .sum()
    }
}
