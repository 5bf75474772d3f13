//! Host-delegated cuts along the slicing planes.

use tracing::{debug, warn};
use truebend_geom::{GeomError, Plane};
use truebend_math::{Point3, Transform};
use truebend_scene::{CutQuad, EdgeId, MeshCutter, ObjectId};

use crate::error::{Result, SlicerError};

/// Finite cutting faces for `planes`.
///
/// Each quad has side `3 * diagonal`, starting `diagonal` before the plane
/// origin on both in-plane axes, so it covers any mesh whose bounding
/// diagonal is `diagonal` and which the plane passes through. Winding
/// follows the plane normal.
pub fn cut_quads(planes: &[Plane], diagonal: f64) -> Result<Vec<CutQuad>> {
    let n = diagonal;
    let w = diagonal * 3.0;
    let square = [
        Point3::new(-n, -n, 0.0),
        Point3::new(-n + w, -n, 0.0),
        Point3::new(-n + w, -n + w, 0.0),
        Point3::new(-n, -n + w, 0.0),
    ];
    planes
        .iter()
        .map(|plane| {
            let frame = Transform::from_origin_normal(&plane.origin, plane.normal.as_ref())
                .ok_or(GeomError::DegenerateVector("plane normal"))?;
            Ok(CutQuad {
                corners: square.map(|p| frame.apply_point(&p)),
            })
        })
        .collect()
}

/// Cut an object's mesh along `planes` (world space).
///
/// `transform` maps the object's definition to world space and `diagonal`
/// sizes the cutting faces. Returns the edges the cut created across faces.
pub fn cut_object<H: MeshCutter + ?Sized>(
    host: &mut H,
    object: ObjectId,
    transform: &Transform,
    planes: &[Plane],
    diagonal: f64,
) -> Result<Vec<EdgeId>> {
    if planes.is_empty() {
        return Err(SlicerError::EmptyPlanes);
    }
    if !(diagonal.is_finite() && diagonal > 0.0) {
        warn!(?object, diagonal, "nothing to cut");
        return Ok(Vec::new());
    }
    let quads = cut_quads(planes, diagonal)?;
    let created = host.cut(object, transform, &quads)?;
    debug!(?object, planes = planes.len(), new_edges = created.len(), "cut object");
    Ok(created)
}
