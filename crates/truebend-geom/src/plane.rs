//! Infinite planes given by a point and a unit normal.

use truebend_math::{unit_axes, Dir3, Point3, Transform, Vec3};

use crate::error::{GeomError, Result};

/// A plane through `origin` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// A point on the plane.
    pub origin: Point3,
    /// Unit normal.
    pub normal: Dir3,
}

impl Plane {
    /// Create a plane from a point and a (not necessarily unit) normal.
    pub fn new(origin: Point3, normal: Vec3) -> Result<Self> {
        let normal =
            Dir3::try_new(normal, f64::EPSILON).ok_or(GeomError::DegenerateVector("plane normal"))?;
        Ok(Self { origin, normal })
    }

    /// Signed distance from a point to this plane, positive on the normal side.
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        (p - self.origin).dot(self.normal.as_ref())
    }

    /// Intersect the infinite line `point + t * direction` with the plane.
    ///
    /// Returns `None` when the line is parallel to the plane.
    pub fn intersect_line(&self, point: &Point3, direction: &Vec3) -> Option<Point3> {
        let denom = direction.dot(self.normal.as_ref());
        if denom.abs() < 1e-12 {
            return None;
        }
        let t = (self.origin - point).dot(self.normal.as_ref()) / denom;
        Some(point + direction * t)
    }

    /// Apply an affine transform to the plane.
    pub fn transform(&self, t: &Transform) -> Result<Self> {
        let origin = t.apply_point(&self.origin);
        // Normals transform by the inverse transpose.
        let inv = t.inverse().ok_or(GeomError::SingularTransform)?;
        let m3 = inv.matrix.fixed_view::<3, 3>(0, 0).transpose();
        Self::new(origin, m3 * self.normal.as_ref())
    }

    /// Local frame of the plane: origin at `origin`, Z along the normal.
    pub fn frame(&self) -> Transform {
        let (x, y, z) = unit_axes(&self.normal);
        Transform::from_axes(&self.origin, x.as_ref(), y.as_ref(), z.as_ref())
    }
}
