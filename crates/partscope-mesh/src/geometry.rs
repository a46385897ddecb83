//! Raw loaded geometry and its normalization into a single mesh.

use tracing::debug;

use crate::error::{MeshError, Result};
use crate::mesh::Mesh;

/// A named sub-geometry of a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGeometry {
    /// Object or mesh name from the source file.
    pub name: String,
    /// The sub-geometry's triangles. May carry no faces (points or lines).
    pub mesh: Mesh,
}

impl SceneGeometry {
    /// Create a named sub-geometry.
    pub fn new(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            mesh,
        }
    }
}

/// Whatever a mesh loader produced.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedGeometry {
    /// Exactly one mesh.
    Single(Mesh),
    /// A container of named sub-geometries.
    Scene(Vec<SceneGeometry>),
}

impl LoadedGeometry {
    /// Collapse into one mesh.
    ///
    /// A single mesh passes through unchanged. A scene concatenates every
    /// sub-geometry that has vertices, in order, without deduplicating; if
    /// none has vertices the first sub-geometry is used as-is.
    ///
    /// Fails with [`MeshError::EmptyGeometry`] when the result has no faces.
    pub fn normalize(self) -> Result<Mesh> {
        let mesh = match self {
            LoadedGeometry::Single(mesh) => mesh,
            LoadedGeometry::Scene(geometries) => consolidate(geometries)?,
        };
        if mesh.face_count() == 0 {
            return Err(MeshError::EmptyGeometry);
        }
        Ok(mesh)
    }
}

fn consolidate(mut geometries: Vec<SceneGeometry>) -> Result<Mesh> {
    if geometries.is_empty() {
        return Err(MeshError::EmptyGeometry);
    }
    let populated: Vec<&SceneGeometry> = geometries
        .iter()
        .filter(|g| g.mesh.vertex_count() > 0)
        .collect();
    if populated.is_empty() {
        debug!(name = %geometries[0].name, "no sub-geometry has vertices, using the first");
        return Ok(geometries.swap_remove(0).mesh);
    }
    debug!(
        parts = populated.len(),
        names = ?populated.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(),
        "concatenating scene"
    );
    Mesh::concatenate(populated.into_iter().map(|g| &g.mesh))
}
