//! Error types for host scene access.

use thiserror::Error;
use truebend_geom::GeomError;

use crate::mesh::{DefinitionId, EdgeId, ObjectId, VertexId};

/// Errors reported by a scene host.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Object handle does not exist.
    #[error("unknown object {0:?}")]
    UnknownObject(ObjectId),

    /// Definition handle does not exist.
    #[error("unknown definition {0:?}")]
    UnknownDefinition(DefinitionId),

    /// Vertex does not exist or belongs to another mesh.
    #[error("unknown vertex {0:?}")]
    UnknownVertex(VertexId),

    /// Edge does not exist or belongs to another mesh.
    #[error("unknown edge {0:?}")]
    UnknownEdge(EdgeId),

    /// Displacement batch sizes differ.
    #[error("{vertices} vertices but {vectors} displacement vectors")]
    LengthMismatch {
        /// Number of vertices given.
        vertices: usize,
        /// Number of vectors given.
        vectors: usize,
    },

    /// A definition contains itself through nested instances.
    #[error("definition {0:?} contains itself")]
    Cycle(DefinitionId),

    /// Invalid geometry handed to the host.
    #[error(transparent)]
    Geom(#[from] GeomError),
}

/// Result type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;
