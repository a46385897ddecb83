//! In-process CAD kernels.
//!
//! Each converter is compiled in only with its cargo feature (`occt`,
//! `truck`). Without it the converter reports itself unavailable and the
//! chain moves on.

use std::path::Path;

use crate::error::StrategyFailure;
use crate::strategy::ExchangeConverter;

/// OpenCASCADE through the `opencascade` bindings.
#[derive(Debug, Default, Clone, Copy)]
pub struct OcctConverter;

impl ExchangeConverter for OcctConverter {
    fn name(&self) -> &str {
        "OpenCASCADE"
    }

    #[cfg(feature = "occt")]
    fn convert(&self, input: &Path, output: &Path) -> Result<(), StrategyFailure> {
        let session = occt::KernelSession::open(input)?;
        session.export_stl(output)
    }

    #[cfg(not(feature = "occt"))]
    fn convert(&self, _input: &Path, _output: &Path) -> Result<(), StrategyFailure> {
        Err(StrategyFailure::ToolUnavailable(
            "built without the `occt` feature".into(),
        ))
    }
}

#[cfg(feature = "occt")]
mod occt {
    use std::path::Path;

    use opencascade::primitives::Shape;
    use tracing::debug;

    use crate::error::StrategyFailure;

    /// A loaded document in the kernel, released on drop.
    pub(super) struct KernelSession {
        shape: Shape,
    }

    impl KernelSession {
        pub fn open(input: &Path) -> Result<Self, StrategyFailure> {
            let shape = Shape::read_step(input)
                .map_err(|e| StrategyFailure::fault(format!("STEP import failed: {e:?}")))?;
            debug!(input = %input.display(), "kernel session opened");
            Ok(Self { shape })
        }

        pub fn export_stl(&self, output: &Path) -> Result<(), StrategyFailure> {
            self.shape
                .write_stl(output)
                .map_err(|e| StrategyFailure::fault(format!("STL export failed: {e:?}")))
        }
    }

    impl Drop for KernelSession {
        fn drop(&mut self) {
            debug!("kernel session closed");
        }
    }
}

/// The pure-Rust truck kernel.
#[derive(Debug, Default, Clone, Copy)]
pub struct TruckConverter;

impl ExchangeConverter for TruckConverter {
    fn name(&self) -> &str {
        "truck"
    }

    #[cfg(feature = "truck")]
    fn convert(&self, input: &Path, output: &Path) -> Result<(), StrategyFailure> {
        let mesh = truck::tessellate(input)?;
        partscope_mesh::io::write_stl(&mesh, output).map_err(StrategyFailure::fault)
    }

    #[cfg(not(feature = "truck"))]
    fn convert(&self, _input: &Path, _output: &Path) -> Result<(), StrategyFailure> {
        Err(StrategyFailure::ToolUnavailable(
            "built without the `truck` feature".into(),
        ))
    }
}

#[cfg(feature = "truck")]
mod truck {
    use std::path::Path;

    use partscope_mesh::Mesh;
    use ruststep::parser::parse;
    use tracing::debug;
    use truck_meshalgo::prelude::*;
    use truck_stepio::r#in::Table;

    use crate::error::StrategyFailure;

    /// Parse a STEP file and triangulate every shell into one mesh.
    pub(super) fn tessellate(input: &Path) -> Result<Mesh, StrategyFailure> {
        let raw = std::fs::read_to_string(input).map_err(StrategyFailure::fault)?;
        let exchange =
            parse(&raw).map_err(|e| StrategyFailure::fault(format!("STEP parse failed: {e}")))?;
        let data = exchange
            .data
            .first()
            .ok_or_else(|| StrategyFailure::fault("STEP file has no data section"))?;
        let table = Table::from_data_section(data);

        let mut shells: Vec<_> = table.shell.iter().collect();
        shells.sort_by_key(|(id, _)| **id);
        if shells.is_empty() {
            return Err(StrategyFailure::fault("STEP file has no shells"));
        }

        let mut parts = Vec::with_capacity(shells.len());
        for (id, holder) in shells {
            let compressed = table
                .to_compressed_shell(holder)
                .map_err(|e| StrategyFailure::fault(format!("shell #{id}: {e}")))?;

            // Chord tolerance scales with the part.
            let coarse = compressed.robust_triangulation(0.01).to_polygon();
            let mut tol = coarse.bounding_box().diameter() * 0.001;
            if !tol.is_normal() {
                tol = 0.01;
            }
            let polygon = compressed.robust_triangulation(tol).to_polygon();

            let vertices = polygon.positions().iter().map(|p| [p.x, p.y, p.z]).collect();
            let mut faces: Vec<[u32; 3]> = polygon
                .tri_faces()
                .iter()
                .map(|t| [t[0].pos as u32, t[1].pos as u32, t[2].pos as u32])
                .collect();
            for q in polygon.quad_faces() {
                let [a, b, c, d] = [q[0].pos as u32, q[1].pos as u32, q[2].pos as u32, q[3].pos as u32];
                faces.push([a, b, c]);
                faces.push([a, c, d]);
            }
            debug!(shell = *id, faces = faces.len(), "tessellated shell");
            parts.push(Mesh::new(vertices, faces).map_err(StrategyFailure::fault)?);
        }

        Mesh::concatenate(&parts).map_err(StrategyFailure::fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "occt"))]
    #[test]
    fn test_occt_unavailable_without_feature() {
        let err = OcctConverter
            .convert(Path::new("part.step"), Path::new("model.stl"))
            .unwrap_err();
        assert!(matches!(err, StrategyFailure::ToolUnavailable(_)));
    }

    #[cfg(not(feature = "truck"))]
    #[test]
    fn test_truck_unavailable_without_feature() {
        let err = TruckConverter
            .convert(Path::new("part.step"), Path::new("model.stl"))
            .unwrap_err();
        assert!(matches!(err, StrategyFailure::ToolUnavailable(_)));
    }

    #[cfg(feature = "truck")]
    #[test]
    fn test_truck_rejects_garbage() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("part.step");
        std::fs::write(&input, "not a step file").unwrap();
        let err = TruckConverter
            .convert(&input, &dir.path().join("model.stl"))
            .unwrap_err();
        assert!(matches!(err, StrategyFailure::ConversionFault(_)));
    }
}
