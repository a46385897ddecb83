//! Error types for mesh construction and I/O.

use thiserror::Error;

/// Errors that can occur while building, loading, or writing meshes.
#[derive(Error, Debug)]
pub enum MeshError {
    /// An I/O error occurred while reading or writing a mesh file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index} but mesh has {vertex_count} vertices")]
    InvalidIndex {
        /// Offending face.
        face: usize,
        /// Out-of-range vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// Vertex count does not fit in 32-bit face indices.
    #[error("mesh has {0} vertices, more than 32-bit indices can address")]
    TooManyVertices(usize),

    /// Flat vertex or index buffer length is not a multiple of three.
    #[error("malformed buffer: {0}")]
    MalformedBuffer(String),

    /// The geometry has no triangles.
    #[error("geometry has no faces")]
    EmptyGeometry,

    /// File extension is not a recognized mesh format.
    #[error("unsupported mesh format: {0}")]
    UnsupportedFormat(String),

    /// OBJ parsing failed.
    #[error("OBJ load failed: {0}")]
    Obj(#[from] tobj::LoadError),

    /// glTF parsing or binary encoding failed.
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),

    /// glTF JSON serialization failed.
    #[error("failed to encode {format}: {reason}")]
    Encode {
        /// Target format.
        format: &'static str,
        /// Encoder message.
        reason: String,
    },
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
