//! Primitive mesh builders.
//!
//! Closed, outward-wound solids used for fixtures and quick sanity checks.

use std::f64::consts::TAU;

use crate::mesh::Mesh;

impl Mesh {
    /// Axis-aligned box with one corner at the origin.
    pub fn cuboid(x: f64, y: f64, z: f64) -> Mesh {
        let vertices = vec![
            [0.0, 0.0, 0.0],
            [x, 0.0, 0.0],
            [x, y, 0.0],
            [0.0, y, 0.0],
            [0.0, 0.0, z],
            [x, 0.0, z],
            [x, y, z],
            [0.0, y, z],
        ];
        let faces = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 7, 6],
            [3, 6, 2],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];
        Mesh::from_trusted(vertices, faces)
    }

    /// Torus around the Z axis.
    ///
    /// `rings` segments run around the main circle and `sides` around the
    /// tube. Both are clamped to at least 3.
    pub fn torus(major_radius: f64, minor_radius: f64, rings: u32, sides: u32) -> Mesh {
        let rings = rings.max(3);
        let sides = sides.max(3);
        let mut vertices = Vec::with_capacity((rings * sides) as usize);
        for i in 0..rings {
            let u = TAU * i as f64 / rings as f64;
            for j in 0..sides {
                let v = TAU * j as f64 / sides as f64;
                let r = major_radius + minor_radius * v.cos();
                vertices.push([r * u.cos(), r * u.sin(), minor_radius * v.sin()]);
            }
        }

        let index = |i: u32, j: u32| (i % rings) * sides + (j % sides);
        let mut faces = Vec::with_capacity((2 * rings * sides) as usize);
        for i in 0..rings {
            for j in 0..sides {
                let a = index(i, j);
                let b = index(i + 1, j);
                let c = index(i + 1, j + 1);
                let d = index(i, j + 1);
                faces.push([a, b, c]);
                faces.push([a, c, d]);
            }
        }
        Mesh::from_trusted(vertices, faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_torus_counts() {
        let torus = Mesh::torus(5.0, 1.0, 16, 8);
        assert_eq!(torus.vertex_count(), 128);
        assert_eq!(torus.face_count(), 256);
        assert_eq!(torus.edge_count(), 384);
    }

    #[test]
    fn test_torus_clamps_segments() {
        let torus = Mesh::torus(5.0, 1.0, 1, 1);
        assert_eq!(torus.vertex_count(), 9);
    }
}
