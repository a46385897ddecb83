//! Error types for analysis.

use thiserror::Error;

/// Errors that can occur while analyzing a mesh or its metrics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Mesh has no vertices.
    #[error("mesh is empty")]
    EmptyMesh,

    /// A metric is NaN or infinite.
    #[error("metric `{0}` is not finite")]
    NonFinite(&'static str),

    /// A metric has an impossible value.
    #[error("degenerate metrics: {0}")]
    Degenerate(String),

    /// Material key is not in the catalog.
    #[error("unknown material: {0}")]
    UnknownMaterial(String),
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
