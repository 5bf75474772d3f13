//! Line segments: the primitive every slicing and bending step works on.

use truebend_math::{arbitrary_axes, Dir3, Point3, Tolerance, Transform, Vec3};

use crate::plane::Plane;

/// A straight segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start point.
    pub start: Point3,
    /// End point.
    pub end: Point3,
}

impl Segment {
    /// Create a segment from two points.
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Both end points, start first.
    pub fn points(&self) -> [Point3; 2] {
        [self.start, self.end]
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Point halfway between the end points.
    pub fn midpoint(&self) -> Point3 {
        self.start + (self.end - self.start) * 0.5
    }

    /// Vector from start to end (not normalized).
    pub fn direction(&self) -> Vec3 {
        self.end - self.start
    }

    /// The supporting line as `(point, direction)`.
    pub fn line(&self) -> (Point3, Vec3) {
        (self.start, self.direction())
    }

    /// Intersection with a plane, strictly between the end points.
    ///
    /// Returns `None` when the segment is degenerate, parallel to the plane,
    /// or when the supporting line meets the plane at an end point or on the
    /// segment's extension.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<Point3> {
        let tol = Tolerance::DEFAULT;
        let (origin, direction) = self.line();
        if !tol.is_valid(&direction) {
            return None;
        }
        let point = plane.intersect_line(&origin, &direction)?;

        let to_start = self.start - point;
        let to_end = self.end - point;
        if !tol.is_valid(&to_start) || !tol.is_valid(&to_end) {
            return None;
        }
        // Both end points on the same side of the point: it lies on the extension.
        if to_start.dot(&to_end) > 0.0 {
            return None;
        }
        Some(point)
    }

    /// Split at the plane.
    ///
    /// Returns `[self]` when there is no valid intersection, otherwise
    /// `[start..point, point..end]`.
    pub fn split(&self, plane: &Plane) -> Vec<Segment> {
        match self.intersect_plane(plane) {
            Some(point) => vec![Segment::new(self.start, point), Segment::new(point, self.end)],
            None => vec![*self],
        }
    }

    /// Return a transformed copy.
    pub fn transform(&self, t: &Transform) -> Segment {
        Segment::new(t.apply_point(&self.start), t.apply_point(&self.end))
    }

    /// Transform in place.
    pub fn transform_mut(&mut self, t: &Transform) -> &mut Self {
        self.start = t.apply_point(&self.start);
        self.end = t.apply_point(&self.end);
        self
    }

    /// Segment-local frame (local to world).
    ///
    /// Origin at `start`, X along the segment, Y and Z from the
    /// arbitrary-axis rule. `None` for a zero-length segment.
    pub fn local_frame(&self) -> Option<Transform> {
        let (y, z, x) = arbitrary_axes(&self.direction())?;
        Some(Transform::from_axes(&self.start, x.as_ref(), y.as_ref(), z.as_ref()))
    }

    /// Segment-local frame whose Y axis points along `up` (its component
    /// perpendicular to the segment).
    ///
    /// Falls back to [`Segment::local_frame`] when `up` is parallel to the
    /// segment or zero.
    pub fn local_frame_towards(&self, up: &Vec3) -> Option<Transform> {
        let x = Dir3::try_new(self.direction(), f64::EPSILON)?;
        let perpendicular = up - x.as_ref() * up.dot(x.as_ref());
        match Dir3::try_new(perpendicular, Tolerance::DEFAULT.linear) {
            Some(y) => {
                let z = x.cross(y.as_ref());
                Some(Transform::from_axes(&self.start, x.as_ref(), y.as_ref(), &z))
            }
            None => self.local_frame(),
        }
    }

    /// `count + 1` evenly spaced points from `start` to `end`.
    pub fn subdivide(&self, count: usize) -> Vec<Point3> {
        let count = count.max(1);
        let step = self.direction() / count as f64;
        (0..=count).map(|i| self.start + step * i as f64).collect()
    }
}
