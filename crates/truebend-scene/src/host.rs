//! Contracts the bend engine consumes from its host application.
//!
//! The host owns objects, their (possibly shared) mesh definitions and the
//! nested instance hierarchy. The engine reads snapshots through
//! [`SceneProvider`], cuts meshes through [`MeshCutter`] and moves vertices
//! through [`VertexDisplacer`]. Atomicity across a whole commit is the
//! host's undo/transaction concern.

use truebend_geom::Aabb3;
use truebend_math::{Transform, Vec3};

use crate::error::Result;
use crate::mesh::{CutQuad, EdgeFlags, EdgeId, MeshEdge, MeshVertex, ObjectId, VertexId};

/// Read access to objects and their meshes, plus ownership control.
pub trait SceneProvider {
    /// Object transform relative to its parent (world for top-level objects).
    fn transform(&self, object: ObjectId) -> Result<Transform>;

    /// Bounds of the object's definition in definition space, nested
    /// objects included.
    fn local_bounds(&self, object: ObjectId) -> Result<Aabb3>;

    /// Vertices of the object's mesh in definition space.
    fn vertices(&self, object: ObjectId) -> Result<Vec<MeshVertex>>;

    /// Edges of the object's mesh in definition space.
    fn edges(&self, object: ObjectId) -> Result<Vec<MeshEdge>>;

    /// Objects nested directly inside this object's definition.
    fn children(&self, object: ObjectId) -> Result<Vec<ObjectId>>;

    /// Give the object a mesh no other object shares.
    fn make_unique(&mut self, object: ObjectId) -> Result<()>;

    /// Replace the display flags of the given edges.
    fn set_edge_flags(&mut self, object: ObjectId, edges: &[EdgeId], flags: EdgeFlags) -> Result<()>;
}

/// The host's mesh-boolean cut.
pub trait MeshCutter {
    /// Insert edges wherever the quads intersect the object's mesh.
    ///
    /// `transform` maps the object's definition space to world space, the
    /// space the quads are given in. Returns only the edges created across
    /// faces, not the halves of edges that were split.
    fn cut(&mut self, object: ObjectId, transform: &Transform, quads: &[CutQuad]) -> Result<Vec<EdgeId>>;
}

/// The host's batch vertex move.
pub trait VertexDisplacer {
    /// Move each vertex by the matching vector, in one batch.
    ///
    /// Returns edges the host had to add to keep faces valid.
    fn displace(&mut self, object: ObjectId, vertices: &[VertexId], vectors: &[Vec3]) -> Result<Vec<EdgeId>>;
}

/// Everything the bend engine needs from a host.
pub trait Host: SceneProvider + MeshCutter + VertexDisplacer {}

impl<T: SceneProvider + MeshCutter + VertexDisplacer> Host for T {}
