#![warn(missing_docs)]

//! Host scene contracts for the truebend engine.
//!
//! The bend engine never owns a scene. It reads meshes and nested objects
//! through [`SceneProvider`] and mutates them only through the host's
//! [`MeshCutter`] and [`VertexDisplacer`] primitives. [`MemoryScene`] is a
//! complete in-memory host used by tests and headless callers.

pub mod error;
pub mod host;
pub mod memory;
pub mod mesh;

pub use error::{Result, SceneError};
pub use host::{Host, MeshCutter, SceneProvider, VertexDisplacer};
pub use memory::MemoryScene;
pub use mesh::{CutQuad, DefinitionId, EdgeFlags, EdgeId, MeshEdge, MeshVertex, ObjectId, VertexId};
