//! Wavefront OBJ: reading via `tobj`, writing positions and faces only.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::geometry::{LoadedGeometry, SceneGeometry};
use crate::mesh::Mesh;

/// Read an OBJ file. One object yields [`LoadedGeometry::Single`]; several
/// yield a scene with one entry per object.
pub fn read_obj(path: &Path) -> Result<LoadedGeometry> {
    let options = tobj::LoadOptions {
        triangulate: true,
        single_index: false,
        ..Default::default()
    };
    // Materials are irrelevant here and a missing .mtl must not fail the load.
    let (models, _materials) = tobj::load_obj(path, &options)?;

    let mut geometries = models
        .into_iter()
        .map(|model| {
            let mesh = Mesh::from_flat(&model.mesh.positions, &model.mesh.indices)?;
            Ok(SceneGeometry::new(model.name, mesh))
        })
        .collect::<Result<Vec<_>>>()?;

    if geometries.len() == 1 {
        return Ok(LoadedGeometry::Single(geometries.swap_remove(0).mesh));
    }
    Ok(LoadedGeometry::Scene(geometries))
}

/// Write a mesh as a single OBJ object.
pub fn write_obj(mesh: &Mesh, path: &Path) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "# partscope")?;
    writeln!(w, "o part")?;
    for v in mesh.vertices() {
        writeln!(w, "v {} {} {}", v[0], v[1], v[2])?;
    }
    for f in mesh.faces() {
        writeln!(w, "f {} {} {}", f[0] + 1, f[1] + 1, f[2] + 1)?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_obj_preserves_topology() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("torus.obj");
        let torus = Mesh::torus(40.0, 10.0, 16, 8);
        write_obj(&torus, &path).unwrap();

        let LoadedGeometry::Single(mesh) = read_obj(&path).unwrap() else {
            panic!("expected a single object");
        };
        assert_eq!(mesh.vertex_count(), torus.vertex_count());
        assert_eq!(mesh.face_count(), torus.face_count());
        assert_eq!(mesh.euler_number(), 0);
        assert!(mesh.is_watertight());
    }

    #[test]
    fn test_multi_object_obj_is_a_scene() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pair.obj");
        std::fs::write(
            &path,
            "o first\n\
             v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             f 1 2 3\n\
             o second\n\
             v 0 0 1\nv 1 0 1\nv 0 1 1\nv 1 1 1\n\
             f 4 5 7 6\n",
        )
        .unwrap();

        let LoadedGeometry::Scene(parts) = read_obj(&path).unwrap() else {
            panic!("expected a scene");
        };
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name, "first");
        assert_eq!(parts[1].mesh.face_count(), 2);

        let merged = LoadedGeometry::Scene(parts).normalize().unwrap();
        assert_eq!(merged.face_count(), 3);
    }
}
