//! One file in, metrics, operations, cost, and viewer payload out.

use std::fs;
use std::path::Path;

use base64::Engine;
use partscope_analysis::{
    analyze, estimate_cost, infer_operations, CostBreakdown, CostRates, GeometricMetrics,
    Material, Operation, PartQuality,
};
use partscope_convert::{validate_input, ConversionPipeline, MeshSource, Progress, Stage};
use partscope_mesh::io;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ProcessError;
use crate::workspace::Workspace;

/// Every upload is treated as one part.
pub const PART_TYPE: &str = "Single Part";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Metrics and operations for a mesh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshAnalysis {
    /// Measurements.
    pub metrics: GeometricMetrics,
    /// Inferred operations, in rule order.
    pub operations: Vec<Operation>,
}

/// Load, normalize, measure, and infer operations for a mesh file.
pub fn analyze_mesh_file(path: &Path) -> Result<MeshAnalysis, ProcessError> {
    let mesh = io::load(path)?.normalize()?;
    let metrics = analyze(&mesh)?;
    let operations = infer_operations(&metrics);
    Ok(MeshAnalysis {
        metrics,
        operations,
    })
}

/// Result of processing one file.
///
/// Serializes to the JSON report; the binary payloads are left out.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    /// Name of the input file as given.
    pub file_name: String,
    /// Input size in MiB.
    pub file_size_mb: f64,
    /// Always [`PART_TYPE`].
    pub part_type: &'static str,
    /// Solid or surface. `None` when analysis failed.
    pub quality: Option<PartQuality>,
    /// Converter that produced the STL, if one ran.
    pub conversion_method: Option<String>,
    /// Measurements. `None` when analysis failed.
    pub metrics: Option<GeometricMetrics>,
    /// Inferred operations; the `Analysis Required` sentinel when analysis
    /// failed.
    pub operations: Vec<Operation>,
    /// Cost estimate. `None` when there was nothing to price.
    pub cost: Option<CostBreakdown>,
    /// Tinted GLB for the viewer.
    #[serde(skip)]
    pub glb: Vec<u8>,
    /// STL produced by conversion. `None` when the input was already a mesh.
    #[serde(skip)]
    pub stl: Option<Vec<u8>>,
}

impl ProcessOutcome {
    /// The GLB as a `data:` URI for embedding in a web viewer.
    pub fn transmission_data_uri(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.glb);
        format!("data:model/gltf-binary;base64,{encoded}")
    }

    /// Pretty-printed JSON report.
    pub fn to_json(&self) -> Result<String, ProcessError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON report to `path`.
    pub fn write_report(&self, path: &Path) -> Result<(), ProcessError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Process `input` with the converter chain described by `config`.
pub fn process_file(
    input: &Path,
    config: &Config,
    material: Material,
    progress: &mut dyn Progress,
) -> Result<ProcessOutcome, ProcessError> {
    let pipeline = ConversionPipeline::new(&config.conversion);
    process_in(
        config.scratch_dir.as_deref(),
        &pipeline,
        input,
        &config.cost,
        material,
        progress,
    )
}

/// Process `input` with an explicit pipeline.
///
/// All intermediate files live in a [`Workspace`] that is removed before
/// this returns.
pub fn process_with(
    pipeline: &ConversionPipeline,
    input: &Path,
    rates: &CostRates,
    material: Material,
    progress: &mut dyn Progress,
) -> Result<ProcessOutcome, ProcessError> {
    process_in(None, pipeline, input, rates, material, progress)
}

fn process_in(
    scratch_dir: Option<&Path>,
    pipeline: &ConversionPipeline,
    input: &Path,
    rates: &CostRates,
    material: Material,
    progress: &mut dyn Progress,
) -> Result<ProcessOutcome, ProcessError> {
    validate_input(input)?;
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ProcessError::InvalidFileName(input.to_path_buf()))?;
    let file_size_mb = fs::metadata(input)?.len() as f64 / BYTES_PER_MB;
    info!(file = %file_name, size_mb = %format!("{file_size_mb:.2}"), "processing");

    let workspace = match scratch_dir {
        Some(parent) => Workspace::new_in(parent)?,
        None => Workspace::new()?,
    };
    let staged = workspace.stage_input(input)?;
    let artifacts = pipeline.run(&staged, &workspace.outputs(), progress)?;

    progress.stage_started(Stage::Analysis);
    let assessment = assess(&artifacts.intermediate, rates, material);
    if assessment.metrics.is_some() {
        progress.stage_finished(Stage::Analysis);
    }

    let glb = fs::read(&artifacts.transmission)?;
    let (conversion_method, stl) = match artifacts.source {
        MeshSource::Converted { method } => (Some(method), Some(fs::read(&artifacts.mesh)?)),
        MeshSource::Native => (None, None),
    };
    let Assessment {
        metrics,
        operations,
        cost,
    } = assessment;
    info!(
        file = %file_name,
        faces = metrics.as_ref().map(|m| m.face_count),
        operations = operations.len(),
        total_cost = cost.as_ref().map(|c| c.total_cost),
        "processed"
    );

    Ok(ProcessOutcome {
        file_name,
        file_size_mb,
        part_type: PART_TYPE,
        quality: metrics.as_ref().map(GeometricMetrics::quality),
        conversion_method,
        metrics,
        operations,
        cost,
        glb,
        stl,
    })
}

/// Stage 4 output. Failures degrade instead of aborting the request.
struct Assessment {
    metrics: Option<GeometricMetrics>,
    operations: Vec<Operation>,
    cost: Option<CostBreakdown>,
}

fn assess(mesh_file: &Path, rates: &CostRates, material: Material) -> Assessment {
    let MeshAnalysis {
        metrics,
        operations,
    } = match analyze_mesh_file(mesh_file) {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!(path = %mesh_file.display(), error = %e, "geometric analysis failed");
            return Assessment {
                metrics: None,
                operations: vec![Operation::analysis_required()],
                cost: None,
            };
        }
    };

    let cost = estimate_cost(
        metrics.volume,
        material,
        operations.len(),
        metrics.face_count,
        rates,
    )
    .map_err(|e| warn!(error = %e, "cost estimate failed"))
    .ok();

    Assessment {
        metrics: Some(metrics),
        operations,
        cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use partscope_convert::{
        CommandSpec, ConvertError, ExchangeConverter, Silent, StrategyFailure, DEFAULT_TINT,
    };
    use partscope_mesh::Mesh;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Stages(Vec<(usize, bool)>);

    impl Progress for Stages {
        fn stage_started(&mut self, stage: Stage) {
            self.0.push((stage.number(), false));
        }
        fn stage_finished(&mut self, stage: Stage) {
            self.0.push((stage.number(), true));
        }
    }

    /// Writes a fixed mesh as the conversion result.
    struct FixedMesh(Mesh);

    impl ExchangeConverter for FixedMesh {
        fn name(&self) -> &str {
            "fixed"
        }

        fn convert(&self, _input: &Path, output: &Path) -> Result<(), StrategyFailure> {
            io::write_stl(&self.0, output).map_err(StrategyFailure::fault)
        }
    }

    fn cube_stl(dir: &Path, name: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        io::write_stl(&Mesh::cuboid(100.0, 100.0, 100.0), &path).unwrap();
        path
    }

    #[test]
    fn test_stl_upload_end_to_end() {
        let dir = TempDir::new().unwrap();
        let input = cube_stl(dir.path(), "test cube (1).stl");
        let mut stages = Stages::default();

        let outcome = process_file(&input, &Config::default(), Material::Steel, &mut stages).unwrap();

        assert_eq!(
            stages.0,
            [(1, false), (1, true), (2, false), (2, true), (3, false), (3, true), (4, false), (4, true)]
        );
        assert_eq!(outcome.file_name, "test cube (1).stl");
        assert_eq!(outcome.part_type, "Single Part");
        assert_eq!(outcome.quality, Some(PartQuality::Solid));
        assert!(outcome.stl.is_none());
        assert!(outcome.conversion_method.is_none());
        assert_eq!(&outcome.glb[..4], b"glTF");
        assert_eq!(
            outcome.operations.iter().map(|o| o.to_string()).collect::<Vec<_>>(),
            ["Stock Size - 10.0 × 10.0 × 10.0 cm", "Turning - Ø10.0 cm × 10.0 cm"]
        );
        assert_relative_eq!(outcome.metrics.unwrap().volume, 1_000_000.0, epsilon = 1e-3);
        assert_relative_eq!(outcome.cost.unwrap().total_cost, 48_688.5, epsilon = 1e-3);
    }

    #[test]
    fn test_converted_input_offers_stl() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("torus.step");
        fs::write(&input, b"ISO-10303-21;").unwrap();
        let pipeline = ConversionPipeline::with_converters(
            vec![Box::new(FixedMesh(Mesh::torus(40.0, 10.0, 24, 12)))],
            DEFAULT_TINT,
        );

        let outcome = process_with(&pipeline, &input, &CostRates::default(), Material::Aluminum, &mut Silent)
            .unwrap();

        assert_eq!(outcome.conversion_method.as_deref(), Some("fixed"));
        let stl = outcome.stl.as_deref().unwrap();
        assert!(!stl.is_empty());
        assert_eq!(outcome.operations[0].to_string(), "Drilling - Ø0.2 cm");
        assert_eq!(outcome.cost.unwrap().material, Material::Aluminum);
    }

    #[test]
    fn test_empty_input_is_malformed() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("empty.step");
        fs::write(&input, b"").unwrap();

        let err = process_file(&input, &Config::default(), Material::Steel, &mut Silent).unwrap_err();
        assert!(
            matches!(err, ProcessError::Convert(ConvertError::MalformedInput { .. })),
            "{err}"
        );
        assert!(err.remediation().is_empty());
    }

    #[test]
    fn test_exhaustion_carries_remediation() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("part.stp");
        fs::write(&input, b"ISO-10303-21;").unwrap();
        let mut config = Config::default();
        config.conversion.freecad_commands = vec![CommandSpec::from("partscope-test-no-such-freecad")];

        let err = process_file(&input, &config, Material::Steel, &mut Silent).unwrap_err();
        let ProcessError::Convert(ConvertError::PipelineExhausted { failures }) = &err else {
            panic!("expected exhaustion, got {err}");
        };
        assert_eq!(failures.len(), 3);
        assert_eq!(failures[2].method, "FreeCAD");
        assert_eq!(err.remediation().len(), 4);
    }

    #[test]
    fn test_workspace_removed_after_failed_conversion() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("part.step");
        fs::write(&input, b"ISO-10303-21;").unwrap();
        let scratch = TempDir::new().unwrap();
        let mut config = Config::default();
        config.scratch_dir = Some(scratch.path().to_path_buf());
        config.conversion.freecad_commands = vec![CommandSpec::from("partscope-test-no-such-freecad")];

        assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
        let mut stages = Stages::default();
        let err = process_file(&input, &config, Material::Steel, &mut stages).unwrap_err();
        assert!(matches!(err, ProcessError::Convert(ConvertError::PipelineExhausted { .. })));
        assert_eq!(stages.0, [(1, false)]);
        assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_workspace_removed_after_success() {
        let dir = TempDir::new().unwrap();
        let input = cube_stl(dir.path(), "cube.stl");
        let scratch = TempDir::new().unwrap();
        let config = Config {
            scratch_dir: Some(scratch.path().to_path_buf()),
            ..Config::default()
        };

        process_file(&input, &config, Material::Steel, &mut Silent).unwrap();
        assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_report_json_and_data_uri() {
        let dir = TempDir::new().unwrap();
        let input = cube_stl(dir.path(), "cube.stl");
        let outcome = process_file(&input, &Config::default(), Material::Steel, &mut Silent).unwrap();

        let report = dir.path().join("report.json");
        outcome.write_report(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
        assert_eq!(value["part_type"], "Single Part");
        assert_eq!(value["quality"], "Solid");
        assert_eq!(value["metrics"]["faces_count"], 12);
        assert_eq!(value["operations"][0], "Stock Size - 10.0 × 10.0 × 10.0 cm");
        assert_eq!(value["cost"]["material"], "steel");
        assert!(value.get("glb").is_none());

        let uri = outcome.transmission_data_uri();
        let payload = uri.strip_prefix("data:model/gltf-binary;base64,").unwrap();
        let decoded = base64::engine::general_purpose::STANDARD.decode(payload).unwrap();
        assert_eq!(decoded, outcome.glb);
    }

    #[test]
    fn test_unreadable_mesh_degrades_to_sentinel() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.obj");
        fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\n").unwrap();

        let assessment = assess(&path, &CostRates::default(), Material::Steel);
        assert!(assessment.metrics.is_none());
        assert!(assessment.cost.is_none());
        assert_eq!(assessment.operations, [Operation::analysis_required()]);

        let missing = assess(&dir.path().join("absent.obj"), &CostRates::default(), Material::Steel);
        assert_eq!(missing.operations, [Operation::analysis_required()]);
    }

    #[test]
    fn test_assess_prices_analyzed_mesh() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.obj");
        io::write_obj(&Mesh::cuboid(100.0, 100.0, 100.0), &path).unwrap();

        let assessment = assess(&path, &CostRates::default(), Material::Steel);
        assert_eq!(assessment.operations.len(), 2);
        assert_relative_eq!(assessment.cost.unwrap().total_cost, 48_688.5, epsilon = 1e-3);
    }

    #[test]
    fn test_analyze_mesh_file_directly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ring.obj");
        io::write_obj(&Mesh::torus(30.0, 5.0, 20, 10), &path).unwrap();

        let analysis = analyze_mesh_file(&path).unwrap();
        assert_eq!(analysis.metrics.euler_number, 0);
        assert!(analysis.operations.iter().any(|o| o.to_string().starts_with("Drilling")));
    }
}
