#![warn(missing_docs)]

//! partscope-analysis — what a mesh is, how it would be made, what it costs
//!
//! [`analyze`] measures a [`Mesh`](partscope_mesh::Mesh), [`infer_operations`]
//! turns the measurements into a list of manufacturing steps, and
//! [`estimate_cost`] prices the part in a chosen [`Material`].
//!
//! # Example
//!
//! ```rust
//! use partscope_analysis::{analyze, estimate_cost, infer_operations, CostRates, Material};
//! use partscope_mesh::Mesh;
//!
//! let cube = Mesh::cuboid(100.0, 100.0, 100.0);
//! let metrics = analyze(&cube).unwrap();
//! let operations = infer_operations(&metrics);
//! let cost = estimate_cost(
//!     metrics.volume,
//!     Material::Steel,
//!     operations.len(),
//!     metrics.face_count,
//!     &CostRates::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(operations[0].to_string(), "Stock Size - 10.0 × 10.0 × 10.0 cm");
//! assert_eq!(format!("{:.2}", cost.total_cost), "48688.50");
//! ```

pub mod cost;
pub mod error;
pub mod material;
pub mod metrics;
pub mod operations;
pub mod units;

pub use cost::{estimate_cost, ComplexityTier, CostBreakdown, CostRates};
pub use error::{AnalysisError, Result};
pub use material::Material;
pub use metrics::{analyze, Bounds, Dimensions, GeometricMetrics, PartQuality};
pub use operations::{infer_operations, try_infer_operations, Operation, OperationKind};
