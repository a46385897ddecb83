//! Geometric metrics of a mesh.

use std::fmt;

use partscope_mesh::Mesh;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::units;

/// Bounding-box corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner.
    pub min: [f64; 3],
    /// Maximum corner.
    pub max: [f64; 3],
}

/// Per-axis extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// X extent.
    pub x: f64,
    /// Y extent.
    pub y: f64,
    /// Z extent.
    pub z: f64,
}

/// A snapshot of one mesh's measurements, in model units (mm).
///
/// Serializes with the key names used by the exported metrics document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometricMetrics {
    /// Number of vertices.
    #[serde(rename = "vertices_count")]
    pub vertex_count: usize,
    /// Number of triangles.
    #[serde(rename = "faces_count")]
    pub face_count: usize,
    /// Number of unique edges.
    #[serde(rename = "edges_count")]
    pub edge_count: usize,
    /// Enclosed volume; zero unless the mesh bounds a valid solid.
    pub volume: f64,
    /// Total surface area.
    pub surface_area: f64,
    /// Every edge has exactly two faces.
    pub is_watertight: bool,
    /// Closed and convex everywhere.
    pub is_convex: bool,
    /// Axis-aligned bounding box.
    pub bounds: Bounds,
    /// Area-weighted surface centroid.
    pub centroid: [f64; 3],
    /// Volume of the bounding box.
    pub bounding_box_volume: f64,
    /// `V - E + F`.
    pub euler_number: i64,
    /// Bounding-box extents.
    pub dimensions: Dimensions,
}

/// Whether the model encloses material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PartQuality {
    /// Watertight.
    Solid,
    /// Open surface.
    Surface,
}

impl fmt::Display for PartQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PartQuality::Solid => "Solid",
            PartQuality::Surface => "Surface",
        })
    }
}

/// Measure a mesh.
///
/// Deterministic: the same mesh always yields equal metrics.
pub fn analyze(mesh: &Mesh) -> Result<GeometricMetrics> {
    let bounds = mesh.bounds().ok_or(AnalysisError::EmptyMesh)?;
    let [x, y, z] = bounds.extents();
    let volume = if mesh.is_volume() {
        mesh.signed_volume()
    } else {
        0.0
    };

    Ok(GeometricMetrics {
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        edge_count: mesh.edge_count(),
        volume,
        surface_area: mesh.surface_area(),
        is_watertight: mesh.is_watertight(),
        is_convex: mesh.is_convex(),
        bounds: Bounds {
            min: bounds.min,
            max: bounds.max,
        },
        centroid: mesh.centroid(),
        bounding_box_volume: bounds.volume(),
        euler_number: mesh.euler_number(),
        dimensions: Dimensions { x, y, z },
    })
}

impl GeometricMetrics {
    /// `1 - euler/2`. Only meaningful as a hole-count signal for closed
    /// orientable surfaces.
    pub fn genus(&self) -> f64 {
        1.0 - self.euler_number as f64 / 2.0
    }

    /// Genus truncated to a whole number of through-holes, never negative.
    pub fn hole_count(&self) -> u64 {
        let genus = self.genus();
        if genus > 0.0 {
            genus.trunc() as u64
        } else {
            0
        }
    }

    /// Extents in centimetres.
    pub fn dimensions_cm(&self) -> [f64; 3] {
        [
            units::length_cm(self.dimensions.x),
            units::length_cm(self.dimensions.y),
            units::length_cm(self.dimensions.z),
        ]
    }

    /// Solid when watertight, otherwise surface.
    pub fn quality(&self) -> PartQuality {
        if self.is_watertight {
            PartQuality::Solid
        } else {
            PartQuality::Surface
        }
    }

    /// Pretty-printed JSON document.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
