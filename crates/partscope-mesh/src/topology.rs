//! Edge topology of an indexed triangle mesh.
//!
//! Built once per mesh and cached. Answers the edge count, watertightness,
//! winding consistency, and convexity questions from a single edge map.

use std::collections::HashMap;

use nalgebra::Vector3;

/// One use of an undirected edge by a face.
#[derive(Debug, Clone, Copy)]
struct EdgeUse {
    face: usize,
    /// True when the face traverses the edge from the lower to the higher index.
    forward: bool,
}

/// Cached topological summary.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Topology {
    pub edge_count: usize,
    pub watertight: bool,
    pub winding_consistent: bool,
    pub convex: bool,
}

impl Topology {
    pub fn build(vertices: &[[f64; 3]], faces: &[[u32; 3]]) -> Self {
        let mut edges: HashMap<(u32, u32), Vec<EdgeUse>> = HashMap::new();
        for (face, tri) in faces.iter().enumerate() {
            for k in 0..3 {
                let a = tri[k];
                let b = tri[(k + 1) % 3];
                let key = if a < b { (a, b) } else { (b, a) };
                edges.entry(key).or_default().push(EdgeUse {
                    face,
                    forward: a < b,
                });
            }
        }

        let watertight = !faces.is_empty() && edges.values().all(|uses| uses.len() == 2);
        let winding_consistent = edges
            .values()
            .filter(|uses| uses.len() == 2)
            .all(|uses| uses[0].forward != uses[1].forward);

        let convex = watertight && winding_consistent && Self::all_edges_convex(vertices, faces, &edges);

        Self {
            edge_count: edges.len(),
            watertight,
            winding_consistent,
            convex,
        }
    }

    /// Every pair of adjacent faces must fold away from each other: the
    /// vertex of one face opposite the shared edge lies on or behind the
    /// plane of the other.
    fn all_edges_convex(
        vertices: &[[f64; 3]],
        faces: &[[u32; 3]],
        edges: &HashMap<(u32, u32), Vec<EdgeUse>>,
    ) -> bool {
        let tolerance = scale(vertices) * 1e-6;
        let point = |i: u32| Vector3::from(vertices[i as usize]);

        for (&(a, b), uses) in edges {
            for (this, other) in [(uses[0].face, uses[1].face), (uses[1].face, uses[0].face)] {
                let tri = faces[this];
                let p0 = point(tri[0]);
                let normal = (point(tri[1]) - p0).cross(&(point(tri[2]) - p0));
                let len = normal.norm();
                if len < f64::EPSILON {
                    continue;
                }
                let Some(&apex) = faces[other].iter().find(|&&v| v != a && v != b) else {
                    continue;
                };
                let projection = (normal / len).dot(&(point(apex) - p0));
                if projection > tolerance {
                    return false;
                }
            }
        }
        true
    }
}

/// Bounding-box diagonal, floored at 1 so the tolerance never collapses.
fn scale(vertices: &[[f64; 3]]) -> f64 {
    let mut min = [f64::MAX; 3];
    let mut max = [f64::MIN; 3];
    for v in vertices {
        for i in 0..3 {
            min[i] = min[i].min(v[i]);
            max[i] = max[i].max(v[i]);
        }
    }
    let diag = (0..3).map(|i| (max[i] - min[i]).powi(2)).sum::<f64>().sqrt();
    if diag.is_finite() {
        diag.max(1.0)
    } else {
        1.0
    }
}
