//! World-space segments from host mesh edges.

use tracing::debug;
use truebend_geom::Segment;
use truebend_math::Transform;
use truebend_scene::{MeshEdge, ObjectId, SceneProvider};

use crate::error::{Result, SlicerError};

/// Visible edges as segments, carried through `transform`.
///
/// Hidden, soft and layer-hidden edges are skipped.
pub fn edge_segments(edges: &[MeshEdge], transform: &Transform) -> Vec<Segment> {
    edges
        .iter()
        .filter(|edge| edge.flags.is_visible())
        .map(|edge| Segment::new(edge.start, edge.end).transform(transform))
        .collect()
}

/// Visible edges of an object and everything nested in it, in the space
/// `transform` maps the object's definition to.
///
/// Nested objects are visited with the accumulated transform. Fails with
/// [`SlicerError::RecursionLimit`] when nesting exceeds `max_depth`, which
/// also stops self-referencing definitions.
pub fn object_segments<S: SceneProvider + ?Sized>(
    scene: &S,
    object: ObjectId,
    transform: &Transform,
    max_depth: usize,
) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    collect_segments(scene, object, transform.clone(), 0, max_depth, &mut segments)?;
    debug!(?object, segments = segments.len(), "collected edge segments");
    Ok(segments)
}

fn collect_segments<S: SceneProvider + ?Sized>(
    scene: &S,
    object: ObjectId,
    transform: Transform,
    depth: usize,
    max_depth: usize,
    out: &mut Vec<Segment>,
) -> Result<()> {
    if depth > max_depth {
        return Err(SlicerError::RecursionLimit(max_depth));
    }
    out.extend(edge_segments(&scene.edges(object)?, &transform));
    for child in scene.children(object)? {
        let inner = transform.then(&scene.transform(child)?);
        collect_segments(scene, child, inner, depth + 1, max_depth, out)?;
    }
    Ok(())
}
