#![warn(missing_docs)]

//! partscope — from a CAD upload to a manufacturing estimate
//!
//! [`process_file`] takes a STEP, IGES, STL, OBJ, or GLB file through the
//! conversion pipeline inside a throwaway [`Workspace`], then measures the
//! mesh, infers manufacturing operations, and prices the part.
//!
//! # Example
//!
//! ```rust,no_run
//! use partscope::{process_file, Config, Material, Silent};
//! use std::path::Path;
//!
//! let config = Config::default();
//! let outcome = process_file(Path::new("bracket.step"), &config, Material::Steel, &mut Silent)
//!     .unwrap();
//! for op in &outcome.operations {
//!     println!("{op}");
//! }
//! if let Some(cost) = &outcome.cost {
//!     println!("total ₹{:.2}", cost.total_cost);
//! }
//! ```

pub mod config;
pub mod error;
pub mod process;
pub mod workspace;

pub use config::Config;
pub use error::{ConfigError, ProcessError};
pub use process::{
    analyze_mesh_file, process_file, process_with, MeshAnalysis, ProcessOutcome, PART_TYPE,
};
pub use workspace::{sanitize_file_name, Workspace};

pub use partscope_analysis::{
    estimate_cost, CostBreakdown, CostRates, GeometricMetrics, Material, Operation,
    OperationKind, PartQuality,
};
pub use partscope_convert::{
    AttemptFailure, ConversionPipeline, ConvertError, Progress, Silent, Stage, StrategyFailure,
};
