//! Mesh file formats.

mod glb;
mod obj;
mod stl;

use std::path::Path;

use tracing::debug;

pub use glb::{read_glb, to_glb_bytes, write_glb};
pub use obj::{read_obj, write_obj};
pub use stl::{read_stl, write_stl};

use crate::error::{MeshError, Result};
use crate::geometry::LoadedGeometry;
use crate::mesh::Mesh;

/// Triangulated file formats this crate reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    /// Stereolithography, binary or ASCII.
    Stl,
    /// Wavefront OBJ.
    Obj,
    /// Binary glTF.
    Glb,
}

impl MeshFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "stl" => Some(Self::Stl),
            "obj" => Some(Self::Obj),
            "glb" | "gltf" => Some(Self::Glb),
            _ => None,
        }
    }

    /// Canonical file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Stl => "stl",
            Self::Obj => "obj",
            Self::Glb => "glb",
        }
    }
}

fn format_of(path: &Path) -> Result<MeshFormat> {
    MeshFormat::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat(path.display().to_string()))
}

/// Load a mesh file, keeping whatever structure the format carries.
pub fn load(path: &Path) -> Result<LoadedGeometry> {
    let format = format_of(path)?;
    debug!(path = %path.display(), ?format, "loading mesh");
    match format {
        MeshFormat::Stl => read_stl(path).map(LoadedGeometry::Single),
        MeshFormat::Obj => read_obj(path),
        MeshFormat::Glb => read_glb(path),
    }
}

/// Load a mesh file and normalize it to a single mesh.
pub fn load_mesh(path: &Path) -> Result<Mesh> {
    load(path)?.normalize()
}

/// Write a mesh in the format named by the path's extension. GLB output is
/// untinted.
pub fn save(mesh: &Mesh, path: &Path) -> Result<()> {
    let format = format_of(path)?;
    debug!(path = %path.display(), ?format, faces = mesh.face_count(), "writing mesh");
    match format {
        MeshFormat::Stl => write_stl(mesh, path),
        MeshFormat::Obj => write_obj(mesh, path),
        MeshFormat::Glb => write_glb(mesh, None, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_detection() {
        assert_eq!(MeshFormat::from_path(Path::new("a/b/Part.STL")), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_path(Path::new("x.obj")), Some(MeshFormat::Obj));
        assert_eq!(MeshFormat::from_path(Path::new("x.glb")), Some(MeshFormat::Glb));
        assert_eq!(MeshFormat::from_path(Path::new("x.step")), None);
        assert_eq!(MeshFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_save_and_load_every_format() {
        let dir = TempDir::new().unwrap();
        let cube = Mesh::cuboid(5.0, 6.0, 7.0);
        for ext in ["stl", "obj", "glb"] {
            let path = dir.path().join(format!("cube.{ext}"));
            save(&cube, &path).unwrap();
            let mesh = load_mesh(&path).unwrap();
            assert_eq!(mesh.face_count(), 12, "{ext}");
            assert_eq!(mesh.bounds().unwrap().extents(), [5.0, 6.0, 7.0], "{ext}");
        }
    }

    #[test]
    fn test_unknown_extension() {
        let err = load(Path::new("part.iges")).unwrap_err();
        assert!(matches!(err, MeshError::UnsupportedFormat(_)));
    }
}
