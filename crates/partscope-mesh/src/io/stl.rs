//! Binary/ASCII STL via `stl_io`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::Mesh;

/// Read an STL file. Identical corner positions are merged into shared
/// vertices.
pub fn read_stl(path: &Path) -> Result<Mesh> {
    let mut file = File::open(path)?;
    let indexed = stl_io::read_stl(&mut file)?;
    if indexed.vertices.len() > u32::MAX as usize {
        return Err(MeshError::TooManyVertices(indexed.vertices.len()));
    }
    let vertices = indexed
        .vertices
        .iter()
        .map(|v| [v[0] as f64, v[1] as f64, v[2] as f64])
        .collect();
    let faces = indexed
        .faces
        .iter()
        .map(|f| {
            [
                f.vertices[0] as u32,
                f.vertices[1] as u32,
                f.vertices[2] as u32,
            ]
        })
        .collect();
    Mesh::new(vertices, faces)
}

/// Write a binary STL file with per-face normals from the winding.
pub fn write_stl(mesh: &Mesh, path: &Path) -> Result<()> {
    let triangles: Vec<stl_io::Triangle> = mesh
        .faces()
        .iter()
        .enumerate()
        .map(|(i, tri)| {
            let n = mesh.face_normal(i);
            let corner = |k: usize| {
                let v = mesh.vertices()[tri[k] as usize];
                stl_io::Vertex::new([v[0] as f32, v[1] as f32, v[2] as f32])
            };
            stl_io::Triangle {
                normal: stl_io::Normal::new([n[0] as f32, n[1] as f32, n[2] as f32]),
                vertices: [corner(0), corner(1), corner(2)],
            }
        })
        .collect();

    let mut writer = BufWriter::new(File::create(path)?);
    stl_io::write_stl(&mut writer, triangles.iter())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    #[test]
    fn test_stl_merges_shared_corners() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cube.stl");
        write_stl(&Mesh::cuboid(100.0, 100.0, 100.0), &path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 84 + 12 * 50);

        let mesh = read_stl(&path).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 12);
        assert!(mesh.is_watertight());
        assert_relative_eq!(mesh.signed_volume(), 1_000_000.0, epsilon = 1e-3);
    }

    #[test]
    fn test_read_ascii_stl() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tri.stl");
        std::fs::write(
            &path,
            "solid tri\n\
             facet normal 0 0 1\n\
             outer loop\n\
             vertex 0 0 0\n\
             vertex 1 0 0\n\
             vertex 0 1 0\n\
             endloop\n\
             endfacet\n\
             endsolid tri\n",
        )
        .unwrap();
        let mesh = read_stl(&path).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_relative_eq!(mesh.surface_area(), 0.5);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_stl(Path::new("/nonexistent/part.stl")).unwrap_err();
        assert!(matches!(err, MeshError::Io(_)));
    }
}
