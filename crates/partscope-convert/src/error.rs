//! Error types for conversion.

use std::fmt;
use std::path::PathBuf;

use partscope_mesh::MeshError;
use thiserror::Error;

use crate::pipeline::Stage;

/// Why a single exchange converter did not produce a mesh.
///
/// Both variants are recoverable: the pipeline moves on to the next
/// converter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyFailure {
    /// The converter is not installed or not compiled in.
    #[error("not available: {0}")]
    ToolUnavailable(String),

    /// The converter ran but did not leave a usable output file.
    #[error("conversion failed: {0}")]
    ConversionFault(String),
}

impl StrategyFailure {
    /// Shorthand for [`StrategyFailure::ConversionFault`].
    pub fn fault(reason: impl fmt::Display) -> Self {
        Self::ConversionFault(reason.to_string())
    }
}

/// A failed attempt, tagged with the converter that made it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    /// Converter name.
    pub method: String,
    /// What went wrong.
    pub failure: StrategyFailure,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.method, self.failure)
    }
}

/// Errors surfaced by the conversion pipeline.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Input is missing, empty, or of an unknown type. Raised before any
    /// converter runs.
    #[error("malformed input {}: {reason}", .path.display())]
    MalformedInput {
        /// Offending input.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// Every exchange converter failed.
    #[error("STEP conversion requires FreeCAD or a CAD kernel; all {} converters failed", .failures.len())]
    PipelineExhausted {
        /// One entry per converter, in the order tried.
        failures: Vec<AttemptFailure>,
    },

    /// A mesh stage could not read or write its file.
    #[error("{stage} failed: {source}")]
    Stage {
        /// Stage that failed.
        stage: Stage,
        /// Underlying mesh error.
        #[source]
        source: MeshError,
    },

    /// A stage finished without leaving a non-empty output file.
    #[error("{stage} produced no output at {}", .path.display())]
    EmptyOutput {
        /// Stage that failed.
        stage: Stage,
        /// Expected output file.
        path: PathBuf,
    },

    /// An I/O error occurred while staging files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Steps a user can take to get a STEP file converted, shown alongside
    /// [`ConvertError::PipelineExhausted`].
    pub fn remediation(&self) -> &'static [&'static str] {
        match self {
            ConvertError::PipelineExhausted { .. } => REMEDIATION,
            _ => &[],
        }
    }
}

const REMEDIATION: &[&str] = &[
    "Install FreeCAD: `brew install --cask freecad` (macOS), `sudo apt install freecad` (Debian/Ubuntu), or the installer from freecad.org (Windows)",
    "Rebuild partscope with `--features occt` or `--features truck` to convert in-process",
    "Convert online and upload the STL: anyconv.com/step-to-stl-converter, greentoken.de/onlineconv.aspx, products.aspose.app/3d/conversion/step-to-stl",
    "Open the STEP file in FreeCAD or another CAD tool and use File > Export > STL",
];

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
