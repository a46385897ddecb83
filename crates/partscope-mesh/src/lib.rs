#![warn(missing_docs)]

//! partscope-mesh — indexed triangle meshes for part analysis
//!
//! A [`Mesh`] holds validated vertex positions and triangle indices and
//! lazily answers topological questions (edge count, Euler number,
//! watertightness, convexity). Loaders return [`LoadedGeometry`], which
//! normalizes multi-object files into a single mesh.
//!
//! # Example
//!
//! ```rust,no_run
//! use partscope_mesh::{io, Mesh};
//! use std::path::Path;
//!
//! let part = io::load_mesh(Path::new("bracket.stl")).unwrap();
//! println!("{} faces, euler {}", part.face_count(), part.euler_number());
//!
//! let block = Mesh::cuboid(100.0, 50.0, 20.0);
//! io::write_glb(&block, Some([173, 216, 230, 255]), Path::new("block.glb")).unwrap();
//! ```

pub mod error;
pub mod geometry;
pub mod io;
pub mod mesh;
mod primitives;
mod topology;

pub use error::{MeshError, Result};
pub use geometry::{LoadedGeometry, SceneGeometry};
pub use io::MeshFormat;
pub use mesh::{Aabb, Mesh};
