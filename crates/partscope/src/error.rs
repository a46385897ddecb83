//! Error types for the request layer.

use std::path::PathBuf;

use partscope_analysis::AnalysisError;
use partscope_convert::ConvertError;
use partscope_mesh::MeshError;
use thiserror::Error;

/// Errors loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        /// Config file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`Config`](crate::Config).
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors processing one file.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The input path has no usable file name.
    #[error("input has no file name: {}", .0.display())]
    InvalidFileName(PathBuf),

    /// Conversion failed.
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// The converted mesh could not be loaded.
    #[error("mesh error: {0}")]
    Mesh(#[from] MeshError),

    /// The mesh could not be measured or priced.
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// The report could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred in the workspace.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessError {
    /// Suggested next steps for the user, empty unless conversion was
    /// exhausted.
    pub fn remediation(&self) -> &'static [&'static str] {
        match self {
            ProcessError::Convert(e) => e.remediation(),
            _ => &[],
        }
    }
}
