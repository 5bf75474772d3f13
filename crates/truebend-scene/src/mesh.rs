//! Mesh data exchanged with the host: handles, edge flags and snapshots.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use truebend_geom::{Plane, Result as GeomResult};
use truebend_math::Point3;

new_key_type! {
    /// Handle to a placed object (group or component instance).
    pub struct ObjectId;
    /// Handle to a mesh definition, possibly shared by several objects.
    pub struct DefinitionId;
    /// Handle to a mesh vertex.
    pub struct VertexId;
    /// Handle to a mesh edge.
    pub struct EdgeId;
}

/// Display flags carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeFlags {
    /// Hidden by the user.
    pub hidden: bool,
    /// Soft edges are not drawn and let faces read as one surface.
    pub soft: bool,
    /// Smooth edges blend the shading of adjacent faces.
    pub smooth: bool,
    /// Whether the edge casts shadows.
    pub casts_shadows: bool,
    /// Whether the edge's layer is visible.
    pub layer_visible: bool,
}

impl EdgeFlags {
    /// Flags applied to seams created by a bend.
    pub fn softened() -> Self {
        Self {
            soft: true,
            smooth: true,
            casts_shadows: false,
            ..Self::default()
        }
    }

    /// Whether the edge is shown to the user (not hidden, not soft, layer on).
    pub fn is_visible(&self) -> bool {
        !self.hidden && !self.soft && self.layer_visible
    }
}

impl Default for EdgeFlags {
    fn default() -> Self {
        Self {
            hidden: false,
            soft: false,
            smooth: false,
            casts_shadows: true,
            layer_visible: true,
        }
    }
}

/// Snapshot of a vertex in its definition's coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    /// Vertex handle.
    pub id: VertexId,
    /// Position in definition space.
    pub position: Point3,
}

/// Snapshot of an edge in its definition's coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshEdge {
    /// Edge handle.
    pub id: EdgeId,
    /// Start position.
    pub start: Point3,
    /// End position.
    pub end: Point3,
    /// Display flags.
    pub flags: EdgeFlags,
}

/// A finite cutting face handed to the host's cut primitive.
///
/// Corners are in world space, counter-clockwise around the plane normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutQuad {
    /// The four corners.
    pub corners: [Point3; 4],
}

impl CutQuad {
    /// Plane through the quad, oriented by its winding.
    pub fn plane(&self) -> GeomResult<Plane> {
        let [a, b, _, d] = self.corners;
        Plane::new(a, (b - a).cross(&(d - a)))
    }
}
