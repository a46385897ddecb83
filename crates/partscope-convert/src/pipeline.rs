//! The staged conversion pipeline.
//!
//! ```text
//! exchange file ──A──▶ STL ──B──▶ OBJ ──C──▶ tinted GLB
//! ```
//!
//! Stage A runs only for exchange formats and walks the converter chain.
//! Stages B and C have no fallback. Every stage is judged by its output
//! file existing and being non-empty.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use partscope_mesh::{io, MeshFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ConvertError, Result};
use crate::freecad::{default_commands, CommandSpec, FreeCadCliConverter};
use crate::kernel::{OcctConverter, TruckConverter};
use crate::progress::Progress;
use crate::strategy::{first_success, ConversionResult, ExchangeConverter};

/// Light blue applied to every vertex of the transmission mesh.
pub const DEFAULT_TINT: [u8; 4] = [173, 216, 230, 255];

// =============================================================================
// Stages and inputs
// =============================================================================

/// The four user-visible steps of processing a file.
///
/// The pipeline runs the first three; [`Stage::Analysis`] is reported by
/// whoever analyzes the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Exchange format to STL.
    ExchangeToMesh,
    /// STL to OBJ.
    MeshToIntermediate,
    /// OBJ to GLB.
    IntermediateToTransmission,
    /// Metrics extraction.
    Analysis,
}

impl Stage {
    /// Number of stages.
    pub const COUNT: usize = 4;

    /// All stages in order.
    pub const ALL: [Stage; Self::COUNT] = [
        Stage::ExchangeToMesh,
        Stage::MeshToIntermediate,
        Stage::IntermediateToTransmission,
        Stage::Analysis,
    ];

    /// 1-based position.
    pub fn number(self) -> usize {
        match self {
            Stage::ExchangeToMesh => 1,
            Stage::MeshToIntermediate => 2,
            Stage::IntermediateToTransmission => 3,
            Stage::Analysis => 4,
        }
    }

    /// Human-readable description.
    pub fn label(self) -> &'static str {
        match self {
            Stage::ExchangeToMesh => "Converting STEP to STL",
            Stage::MeshToIntermediate => "Converting STL to OBJ",
            Stage::IntermediateToTransmission => "Converting OBJ to GLB",
            Stage::Analysis => "Extracting geometric data",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What kind of file was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Already triangulated.
    Mesh(MeshFormat),
    /// Boundary-representation exchange format (STEP, IGES).
    Exchange,
}

impl InputKind {
    /// Classify by extension (case-insensitive).
    pub fn classify(path: &Path) -> Option<Self> {
        if let Some(format) = MeshFormat::from_path(path) {
            return Some(InputKind::Mesh(format));
        }
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "step" | "stp" | "iges" | "igs" => Some(InputKind::Exchange),
            _ => None,
        }
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Tunables for the conversion pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionSettings {
    /// Per-executable deadline for FreeCAD, in seconds.
    pub freecad_timeout_secs: u64,
    /// FreeCAD executables to try, in order.
    pub freecad_commands: Vec<CommandSpec>,
    /// RGBA tint for the GLB.
    pub tint: [u8; 4],
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            freecad_timeout_secs: 180,
            freecad_commands: default_commands(),
            tint: DEFAULT_TINT,
        }
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Where the pipeline writes its results.
///
/// The OBJ intermediate goes next to the mesh with an `.obj` extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutputs {
    /// STL slot.
    pub mesh: PathBuf,
    /// GLB slot.
    pub transmission: PathBuf,
}

impl PipelineOutputs {
    /// Fixed names inside a working directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            mesh: dir.join("model.stl"),
            transmission: dir.join("model.glb"),
        }
    }

    /// OBJ intermediate path.
    pub fn intermediate(&self) -> PathBuf {
        self.mesh.with_extension("obj")
    }
}

/// How the STL came to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshSource {
    /// Converted from an exchange file by the named converter.
    Converted {
        /// Converter name.
        method: String,
    },
    /// The input was already a mesh.
    Native,
}

/// Verified outputs of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineArtifacts {
    /// STL file.
    pub mesh: PathBuf,
    /// OBJ file.
    pub intermediate: PathBuf,
    /// GLB file.
    pub transmission: PathBuf,
    /// Origin of the STL.
    pub source: MeshSource,
}

/// Exchange file to STL, OBJ, and GLB.
pub struct ConversionPipeline {
    converters: Vec<Box<dyn ExchangeConverter>>,
    tint: [u8; 4],
}

impl Default for ConversionPipeline {
    fn default() -> Self {
        Self::new(&ConversionSettings::default())
    }
}

impl ConversionPipeline {
    /// The standard chain: OpenCASCADE, then truck, then FreeCAD.
    pub fn new(settings: &ConversionSettings) -> Self {
        let converters: Vec<Box<dyn ExchangeConverter>> = vec![
            Box::new(OcctConverter),
            Box::new(TruckConverter),
            Box::new(FreeCadCliConverter::new(
                settings.freecad_commands.clone(),
                Duration::from_secs(settings.freecad_timeout_secs),
            )),
        ];
        Self::with_converters(converters, settings.tint)
    }

    /// A custom converter chain.
    pub fn with_converters(converters: Vec<Box<dyn ExchangeConverter>>, tint: [u8; 4]) -> Self {
        Self { converters, tint }
    }

    /// Converter names in the order they are tried.
    pub fn converter_names(&self) -> Vec<&str> {
        self.converters.iter().map(|c| c.name()).collect()
    }

    /// Stage A alone: walk the converter chain.
    pub fn convert_exchange(
        &self,
        input: &Path,
        output: &Path,
        progress: &mut dyn Progress,
    ) -> ConversionResult {
        first_success(&self.converters, input, output, progress)
    }

    /// Run all three conversion stages.
    pub fn run(
        &self,
        input: &Path,
        outputs: &PipelineOutputs,
        progress: &mut dyn Progress,
    ) -> Result<PipelineArtifacts> {
        let kind = validate_input(input)?;
        let intermediate = outputs.intermediate();

        progress.stage_started(Stage::ExchangeToMesh);
        let source = match kind {
            InputKind::Exchange => {
                let (_, method) = self
                    .convert_exchange(input, &outputs.mesh, progress)
                    .into_result()?;
                MeshSource::Converted { method }
            }
            InputKind::Mesh(MeshFormat::Stl) => {
                fs::copy(input, &outputs.mesh)?;
                MeshSource::Native
            }
            InputKind::Mesh(_) => {
                let mesh = io::load_mesh(input).map_err(|source| ConvertError::Stage {
                    stage: Stage::ExchangeToMesh,
                    source,
                })?;
                io::write_stl(&mesh, &outputs.mesh).map_err(|source| ConvertError::Stage {
                    stage: Stage::ExchangeToMesh,
                    source,
                })?;
                MeshSource::Native
            }
        };
        finish_stage(Stage::ExchangeToMesh, &outputs.mesh, progress)?;

        progress.stage_started(Stage::MeshToIntermediate);
        io::load_mesh(&outputs.mesh)
            .and_then(|mesh| io::write_obj(&mesh, &intermediate))
            .map_err(|source| ConvertError::Stage {
                stage: Stage::MeshToIntermediate,
                source,
            })?;
        finish_stage(Stage::MeshToIntermediate, &intermediate, progress)?;

        progress.stage_started(Stage::IntermediateToTransmission);
        io::load_mesh(&intermediate)
            .and_then(|mesh| io::write_glb(&mesh, Some(self.tint), &outputs.transmission))
            .map_err(|source| ConvertError::Stage {
                stage: Stage::IntermediateToTransmission,
                source,
            })?;
        finish_stage(Stage::IntermediateToTransmission, &outputs.transmission, progress)?;

        Ok(PipelineArtifacts {
            mesh: outputs.mesh.clone(),
            intermediate,
            transmission: outputs.transmission.clone(),
            source,
        })
    }
}

/// Reject missing, empty, or unrecognized input before any work starts.
pub fn validate_input(input: &Path) -> Result<InputKind> {
    let malformed = |reason: &str| ConvertError::MalformedInput {
        path: input.to_path_buf(),
        reason: reason.to_string(),
    };
    let meta = fs::metadata(input).map_err(|e| malformed(&format!("cannot read file: {e}")))?;
    if !meta.is_file() {
        return Err(malformed("not a regular file"));
    }
    if meta.len() == 0 {
        return Err(malformed("file is empty"));
    }
    InputKind::classify(input).ok_or_else(|| malformed("unrecognized file extension"))
}

fn finish_stage(stage: Stage, output: &Path, progress: &mut dyn Progress) -> Result<()> {
    match fs::metadata(output) {
        Ok(meta) if meta.len() > 0 => {
            info!(stage = %stage, output = %output.display(), bytes = meta.len(), "stage complete");
            progress.stage_finished(stage);
            Ok(())
        }
        _ => Err(ConvertError::EmptyOutput {
            stage,
            path: output.to_path_buf(),
        }),
    }
}
