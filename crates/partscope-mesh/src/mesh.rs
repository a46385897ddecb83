//! Indexed triangle mesh with cached derived properties.

use std::sync::OnceLock;

use nalgebra::Vector3;

use crate::error::{MeshError, Result};
use crate::topology::Topology;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: [f64; 3],
    /// Maximum corner.
    pub max: [f64; 3],
}

impl Aabb {
    /// Per-axis extents `max - min`.
    pub fn extents(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    /// Volume enclosed by the box.
    pub fn volume(&self) -> f64 {
        let [x, y, z] = self.extents();
        x * y * z
    }
}

/// An indexed triangle mesh.
///
/// Vertices and faces are fixed at construction; every face index is
/// guaranteed to address an existing vertex. Topological properties
/// (edges, watertightness, convexity) are computed on first use and cached.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<[f64; 3]>,
    faces: Vec<[u32; 3]>,
    topology: OnceLock<Topology>,
}

impl PartialEq for Mesh {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices && self.faces == other.faces
    }
}

impl Mesh {
    /// Build a mesh, validating every face index.
    pub fn new(vertices: Vec<[f64; 3]>, faces: Vec<[u32; 3]>) -> Result<Self> {
        if vertices.len() > u32::MAX as usize {
            return Err(MeshError::TooManyVertices(vertices.len()));
        }
        for (face, tri) in faces.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertices.len()) {
                return Err(MeshError::InvalidIndex {
                    face,
                    index,
                    vertex_count: vertices.len(),
                });
            }
        }
        Ok(Self {
            vertices,
            faces,
            topology: OnceLock::new(),
        })
    }

    /// Build a mesh whose indices are in range by construction.
    pub(crate) fn from_trusted(vertices: Vec<[f64; 3]>, faces: Vec<[u32; 3]>) -> Self {
        debug_assert!(faces
            .iter()
            .all(|t| t.iter().all(|&i| (i as usize) < vertices.len())));
        Self {
            vertices,
            faces,
            topology: OnceLock::new(),
        }
    }

    /// Build a mesh from flat `[x0, y0, z0, ...]` positions and
    /// `[i0, i1, i2, ...]` triangle indices.
    pub fn from_flat(positions: &[f32], indices: &[u32]) -> Result<Self> {
        if positions.len() % 3 != 0 {
            return Err(MeshError::MalformedBuffer(format!(
                "{} position components is not a multiple of 3",
                positions.len()
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::MalformedBuffer(format!(
                "{} indices is not a multiple of 3",
                indices.len()
            )));
        }
        let vertices = positions
            .chunks_exact(3)
            .map(|p| [p[0] as f64, p[1] as f64, p[2] as f64])
            .collect();
        let faces = indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect();
        Self::new(vertices, faces)
    }

    /// Merge meshes into one, offsetting each mesh's indices.
    ///
    /// Vertices are not deduplicated.
    pub fn concatenate<'a>(meshes: impl IntoIterator<Item = &'a Mesh>) -> Result<Self> {
        let mut vertices: Vec<[f64; 3]> = Vec::new();
        let mut faces: Vec<[u32; 3]> = Vec::new();
        for mesh in meshes {
            let base = vertices.len();
            if base + mesh.vertices.len() > u32::MAX as usize {
                return Err(MeshError::TooManyVertices(base + mesh.vertices.len()));
            }
            let base = base as u32;
            vertices.extend_from_slice(&mesh.vertices);
            faces.extend(mesh.faces.iter().map(|t| [t[0] + base, t[1] + base, t[2] + base]));
        }
        Self::new(vertices, faces)
    }

    /// Vertex positions.
    pub fn vertices(&self) -> &[[f64; 3]] {
        &self.vertices
    }

    /// Triangle vertex indices.
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Positions of each triangle's corners.
    pub fn triangles(&self) -> impl Iterator<Item = [Vector3<f64>; 3]> + '_ {
        self.faces.iter().map(move |t| {
            [
                Vector3::from(self.vertices[t[0] as usize]),
                Vector3::from(self.vertices[t[1] as usize]),
                Vector3::from(self.vertices[t[2] as usize]),
            ]
        })
    }

    /// Unit normal of a face from its winding, or `+Z` for degenerate faces.
    pub fn face_normal(&self, face: usize) -> [f64; 3] {
        let t = self.faces[face];
        let v0 = Vector3::from(self.vertices[t[0] as usize]);
        let v1 = Vector3::from(self.vertices[t[1] as usize]);
        let v2 = Vector3::from(self.vertices[t[2] as usize]);
        let n = (v1 - v0).cross(&(v2 - v0));
        let len = n.norm();
        if len > 1e-12 {
            [n.x / len, n.y / len, n.z / len]
        } else {
            [0.0, 0.0, 1.0]
        }
    }

    // =========================================================================
    // Measures
    // =========================================================================

    /// Total surface area.
    pub fn surface_area(&self) -> f64 {
        self.triangles()
            .map(|[v0, v1, v2]| (v1 - v0).cross(&(v2 - v0)).norm() / 2.0)
            .sum()
    }

    /// Signed volume by the divergence theorem.
    ///
    /// Positive for closed meshes with outward-facing winding.
    pub fn signed_volume(&self) -> f64 {
        let vol: f64 = self
            .triangles()
            .map(|[v0, v1, v2]| v0.dot(&v1.cross(&v2)))
            .sum();
        vol / 6.0
    }

    /// Axis-aligned bounding box, or `None` for a mesh without vertices.
    pub fn bounds(&self) -> Option<Aabb> {
        if self.vertices.is_empty() {
            return None;
        }
        let mut min = [f64::MAX; 3];
        let mut max = [f64::MIN; 3];
        for v in &self.vertices {
            for i in 0..3 {
                if v[i] < min[i] {
                    min[i] = v[i];
                }
                if v[i] > max[i] {
                    max[i] = v[i];
                }
            }
        }
        Some(Aabb { min, max })
    }

    /// Area-weighted centroid of the surface.
    ///
    /// Falls back to the vertex average when the surface has no area.
    pub fn centroid(&self) -> [f64; 3] {
        let mut weighted = Vector3::zeros();
        let mut total = 0.0;
        for [v0, v1, v2] in self.triangles() {
            let area = (v1 - v0).cross(&(v2 - v0)).norm() / 2.0;
            weighted += (v0 + v1 + v2) * (area / 3.0);
            total += area;
        }
        if total > 1e-15 {
            let c = weighted / total;
            return [c.x, c.y, c.z];
        }
        if self.vertices.is_empty() {
            return [0.0; 3];
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + Vector3::from(*v));
        let c = sum / self.vertices.len() as f64;
        [c.x, c.y, c.z]
    }

    // =========================================================================
    // Topology
    // =========================================================================

    fn topology(&self) -> &Topology {
        self.topology
            .get_or_init(|| Topology::build(&self.vertices, &self.faces))
    }

    /// Number of unique undirected edges.
    pub fn edge_count(&self) -> usize {
        self.topology().edge_count
    }

    /// Euler characteristic `V - E + F`.
    pub fn euler_number(&self) -> i64 {
        self.vertices.len() as i64 - self.edge_count() as i64 + self.faces.len() as i64
    }

    /// Every edge is shared by exactly two faces.
    pub fn is_watertight(&self) -> bool {
        self.topology().watertight
    }

    /// Every shared edge is traversed in opposite directions by its two faces.
    pub fn is_winding_consistent(&self) -> bool {
        self.topology().winding_consistent
    }

    /// The mesh bounds a solid: watertight, consistently wound, and with
    /// positive signed volume.
    pub fn is_volume(&self) -> bool {
        self.is_watertight() && self.is_winding_consistent() && self.signed_volume() > 0.0
    }

    /// The closed surface bends outward at every edge.
    pub fn is_convex(&self) -> bool {
        self.topology().convex
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_invalid_index_rejected() {
        let err = Mesh::new(vec![[0.0; 3]; 3], vec![[0, 1, 3]]).unwrap_err();
        assert!(matches!(
            err,
            MeshError::InvalidIndex {
                face: 0,
                index: 3,
                vertex_count: 3
            }
        ));
    }

    #[test]
    fn test_from_flat_rejects_ragged_buffers() {
        assert!(Mesh::from_flat(&[0.0, 1.0], &[]).is_err());
        assert!(Mesh::from_flat(&[0.0; 9], &[0, 1]).is_err());
        let mesh = Mesh::from_flat(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], &[0, 1, 2]).unwrap();
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn test_cube_measures() {
        let cube = Mesh::cuboid(100.0, 100.0, 100.0);
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.face_count(), 12);
        assert_eq!(cube.edge_count(), 18);
        assert_eq!(cube.euler_number(), 2);
        assert_relative_eq!(cube.signed_volume(), 1_000_000.0, epsilon = 1e-6);
        assert_relative_eq!(cube.surface_area(), 60_000.0, epsilon = 1e-6);
        let c = cube.centroid();
        assert_relative_eq!(c[0], 50.0, epsilon = 1e-9);
        assert_relative_eq!(c[1], 50.0, epsilon = 1e-9);
        assert_relative_eq!(c[2], 50.0, epsilon = 1e-9);
        assert!(cube.is_watertight());
        assert!(cube.is_volume());
        assert!(cube.is_convex());
    }

    #[test]
    fn test_bounds() {
        let block = Mesh::cuboid(10.0, 20.0, 30.0);
        let bounds = block.bounds().unwrap();
        assert_eq!(bounds.min, [0.0, 0.0, 0.0]);
        assert_eq!(bounds.extents(), [10.0, 20.0, 30.0]);
        assert_relative_eq!(bounds.volume(), 6000.0);
        assert!(Mesh::new(vec![], vec![]).unwrap().bounds().is_none());
    }

    #[test]
    fn test_open_box_is_not_a_volume() {
        let cube = Mesh::cuboid(10.0, 10.0, 10.0);
        let open = Mesh::new(cube.vertices().to_vec(), cube.faces()[..10].to_vec()).unwrap();
        assert!(!open.is_watertight());
        assert!(!open.is_volume());
        assert!(!open.is_convex());
    }

    #[test]
    fn test_inverted_cube_is_not_a_volume() {
        let cube = Mesh::cuboid(10.0, 10.0, 10.0);
        let flipped = cube.faces().iter().map(|t| [t[0], t[2], t[1]]).collect();
        let inverted = Mesh::new(cube.vertices().to_vec(), flipped).unwrap();
        assert!(inverted.is_watertight());
        assert!(inverted.signed_volume() < 0.0);
        assert!(!inverted.is_volume());
    }

    #[test]
    fn test_torus_topology() {
        let torus = Mesh::torus(40.0, 10.0, 24, 12);
        assert!(torus.is_watertight());
        assert!(torus.is_winding_consistent());
        assert_eq!(torus.euler_number(), 0);
        assert!(!torus.is_convex());
        assert!(torus.signed_volume() > 0.0);
    }

    #[test]
    fn test_concatenate_offsets_indices() {
        let a = Mesh::cuboid(1.0, 1.0, 1.0);
        let b = Mesh::cuboid(2.0, 2.0, 2.0);
        let merged = Mesh::concatenate([&a, &b]).unwrap();
        assert_eq!(merged.vertex_count(), 16);
        assert_eq!(merged.face_count(), 24);
        assert_eq!(merged.faces()[12], [b.faces()[0][0] + 8, b.faces()[0][1] + 8, b.faces()[0][2] + 8]);
        assert_relative_eq!(merged.signed_volume(), 9.0, epsilon = 1e-9);
    }

    #[test]
    fn test_face_normal() {
        let cube = Mesh::cuboid(1.0, 1.0, 1.0);
        assert_eq!(cube.face_normal(0), [0.0, 0.0, -1.0]);
    }
}
