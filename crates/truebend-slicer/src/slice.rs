//! Splitting segments against ordered sets of parallel planes.

use truebend_geom::{GeomError, Plane, Segment};

use crate::error::Result;

/// Split every segment by every plane.
///
/// Planes are applied one at a time: the fragments produced by plane `i`
/// are the input to plane `i + 1`. Fragment order follows input order, so
/// the output is deterministic. With no planes the input is returned as is.
pub fn slice_segments(segments: &[Segment], planes: &[Plane]) -> Vec<Segment> {
    let mut stack = segments.to_vec();
    for plane in planes {
        let mut result = Vec::with_capacity(stack.len());
        for segment in &stack {
            result.extend(segment.split(plane));
        }
        stack = result;
    }
    stack
}

/// Cutting planes through the subdivision points of the reference segment.
///
/// Returns `subdivisions + 1` planes, end points included, all sharing the
/// segment direction as normal.
pub fn slicing_planes(reference: &Segment, subdivisions: usize) -> Result<Vec<Plane>> {
    let normal = reference.direction();
    if normal.norm() == 0.0 {
        return Err(GeomError::DegenerateVector("reference segment").into());
    }
    reference
        .subdivide(subdivisions)
        .into_iter()
        .map(|point| Plane::new(point, normal).map_err(Into::into))
        .collect()
}
