#![warn(missing_docs)]

//! partscope-convert — get a triangle mesh out of a CAD exchange file
//!
//! STEP/IGES input is handed to a chain of [`ExchangeConverter`]s tried in
//! order (OpenCASCADE, truck, FreeCAD) until one leaves a non-empty STL.
//! The STL is then re-exported as OBJ and as a tinted GLB for viewing.
//!
//! # Example
//!
//! ```rust,no_run
//! use partscope_convert::{ConversionPipeline, PipelineOutputs, Silent};
//! use std::path::Path;
//!
//! let pipeline = ConversionPipeline::default();
//! let outputs = PipelineOutputs::in_dir(Path::new("/tmp/work"));
//! match pipeline.run(Path::new("bracket.step"), &outputs, &mut Silent) {
//!     Ok(artifacts) => println!("GLB at {}", artifacts.transmission.display()),
//!     Err(e) => {
//!         eprintln!("{e}");
//!         for step in e.remediation() {
//!             eprintln!("  - {step}");
//!         }
//!     }
//! }
//! ```

pub mod error;
pub mod freecad;
pub mod kernel;
pub mod pipeline;
mod process;
pub mod progress;
pub mod strategy;

pub use error::{AttemptFailure, ConvertError, Result, StrategyFailure};
pub use freecad::{CommandSpec, FreeCadCliConverter};
pub use kernel::{OcctConverter, TruckConverter};
pub use pipeline::{
    validate_input, ConversionPipeline, ConversionSettings, InputKind, MeshSource,
    PipelineArtifacts, PipelineOutputs, Stage, DEFAULT_TINT,
};
pub use progress::{Progress, Silent};
pub use strategy::{first_success, verify_output, ConversionResult, ExchangeConverter};
