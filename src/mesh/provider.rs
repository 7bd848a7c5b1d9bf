//! Seed mesh acquisition.

use super::SeedMesh;
use crate::errors::{SegmentationError, SegmentationResult};
use crate::float_types::Real;
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;

/// Deepest subdivision the tetra-sphere provider accepts (`4·4⁷` triangles).
pub const MAX_SUBDIVISIONS: u32 = 7;

/// Builds the seed surface for a run.
///
/// Generation and import are separate steps so their failures can be told apart.
pub trait MeshProvider {
    /// Build a closed surface approximating the ellipsoid with the given radii.
    fn generate_seed_mesh(&mut self, radius: Vector3<Real>, subdivisions: u32) -> SegmentationResult<()>;

    /// Hand out the generated surface in render layout.
    fn build_render_mesh(&mut self) -> SegmentationResult<SeedMesh>;
}

/// Subdivided tetrahedron projected onto an ellipsoid.
///
/// Each level splits every triangle into four through its edge midpoints; shared
/// midpoints are created once per edge, so the surface stays closed.
#[derive(Debug, Clone, Default)]
pub struct TetraSphereProvider {
    positions: Vec<Point3<Real>>,
    triangles: Vec<[u32; 3]>,
}

impl TetraSphereProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn subdivide_once(&mut self) {
        let mut edge_midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut new_triangles = Vec::with_capacity(self.triangles.len() * 4);

        for [a, b, c] in std::mem::take(&mut self.triangles) {
            let ab = self.midpoint(&mut edge_midpoints, a, b);
            let bc = self.midpoint(&mut edge_midpoints, b, c);
            let ca = self.midpoint(&mut edge_midpoints, c, a);

            new_triangles.push([a, ab, ca]);
            new_triangles.push([ab, b, bc]);
            new_triangles.push([ca, bc, c]);
            new_triangles.push([ab, bc, ca]);
        }

        self.triangles = new_triangles;
    }

    /// Get or create the (unit sphere) midpoint vertex of an edge
    fn midpoint(&mut self, edge_midpoints: &mut HashMap<(u32, u32), u32>, v1: u32, v2: u32) -> u32 {
        let edge_key = if v1 < v2 { (v1, v2) } else { (v2, v1) };
        if let Some(&idx) = edge_midpoints.get(&edge_key) {
            return idx;
        }

        let mid = (self.positions[v1 as usize].coords + self.positions[v2 as usize].coords) / 2.0;
        let idx = self.positions.len() as u32;
        self.positions.push(Point3::from(mid.normalize()));
        edge_midpoints.insert(edge_key, idx);
        idx
    }
}

impl MeshProvider for TetraSphereProvider {
    fn generate_seed_mesh(&mut self, radius: Vector3<Real>, subdivisions: u32) -> SegmentationResult<()> {
        self.positions.clear();
        self.triangles.clear();

        if subdivisions > MAX_SUBDIVISIONS {
            return Err(SegmentationError::mesh_generation(format!(
                "subdivision depth {subdivisions} exceeds {MAX_SUBDIVISIONS}"
            )));
        }
        if !radius.iter().all(|r| r.is_finite() && *r > 0.0) {
            return Err(SegmentationError::mesh_generation(format!(
                "seed radius must be positive, got {radius:?}"
            )));
        }

        // regular tetrahedron inscribed in the unit sphere
        let s = (1.0 / 3.0 as Real).sqrt();
        self.positions = vec![
            Point3::new(s, s, s),
            Point3::new(-s, -s, s),
            Point3::new(-s, s, -s),
            Point3::new(s, -s, -s),
        ];
        self.triangles = vec![[0, 1, 3], [0, 2, 1], [0, 3, 2], [1, 2, 3]];

        for _ in 0..subdivisions {
            self.subdivide_once();
        }

        self.positions.iter_mut().for_each(|p| {
            p.x *= radius.x;
            p.y *= radius.y;
            p.z *= radius.z;
        });
        Ok(())
    }

    fn build_render_mesh(&mut self) -> SegmentationResult<SeedMesh> {
        if self.triangles.is_empty() {
            return Err(SegmentationError::mesh_import(
                "no seed mesh has been generated",
            ));
        }
        Ok(SeedMesh::from_positions(
            &self.positions,
            self.triangles.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_counts_per_level() {
        let mut provider = TetraSphereProvider::new();
        for level in 0..4u32 {
            provider
                .generate_seed_mesh(Vector3::new(1.0, 1.0, 1.0), level)
                .unwrap();
            let mesh = provider.build_render_mesh().unwrap();
            let faces = 4 * 4usize.pow(level);
            assert_eq!(mesh.num_triangles(), faces);
            // closed genus-0 surface: V = F/2 + 2
            assert_eq!(mesh.num_vertices(), faces / 2 + 2);
        }
    }

    #[test]
    fn test_vertices_on_ellipsoid_with_outward_winding() {
        let mut provider = TetraSphereProvider::new();
        provider
            .generate_seed_mesh(Vector3::new(2.0, 1.0, 1.0), 3)
            .unwrap();
        let mesh = provider.build_render_mesh().unwrap();

        for i in 0..mesh.num_vertices() {
            let p = mesh.position(i);
            let e = (p.x / 2.0).powi(2) + p.y.powi(2) + p.z.powi(2);
            assert_relative_eq!(e, 1.0, epsilon = crate::float_types::tolerance());
            // normals of a convex surface around the origin point away from it
            assert!(mesh.normals[i].dot(&p.coords) > 0.0);
        }
        assert!(mesh.volume() > 0.0);
    }

    #[test]
    fn test_failures() {
        let mut provider = TetraSphereProvider::new();
        assert!(matches!(
            provider.build_render_mesh(),
            Err(SegmentationError::MeshImportFailed(_))
        ));
        assert!(matches!(
            provider.generate_seed_mesh(Vector3::new(1.0, 1.0, 1.0), MAX_SUBDIVISIONS + 1),
            Err(SegmentationError::MeshGenerationFailed(_))
        ));
        assert!(matches!(
            provider.generate_seed_mesh(Vector3::new(1.0, 0.0, 1.0), 2),
            Err(SegmentationError::MeshGenerationFailed(_))
        ));
        // a failed generation leaves nothing to import
        assert!(provider.build_render_mesh().is_err());
    }
}
