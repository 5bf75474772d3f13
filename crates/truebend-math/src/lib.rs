#![warn(missing_docs)]

//! Math types for the truebend geometry engine.
//!
//! Thin wrappers around nalgebra providing the domain types used by the
//! bend engine: points, vectors, directions, affine transforms, the
//! arbitrary-axis frame construction and tolerance constants.

use nalgebra::{Matrix4, Rotation3, Translation3, Unit, Vector2, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in 2D space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// Full turn in radians.
pub const TAU: f64 = std::f64::consts::TAU;

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            matrix: Matrix4::new_translation(&Vec3::new(dx, dy, dz)),
        }
    }

    /// Scale by `(sx, sy, sz)` about the world origin.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            matrix: Matrix4::new_nonuniform_scaling(&Vec3::new(sx, sy, sz)),
        }
    }

    /// Rotation by `angle` radians about the line through `center` along
    /// `axis`.
    pub fn rotation(center: &Point3, axis: &Dir3, angle: f64) -> Self {
        let rotation = Rotation3::from_axis_angle(axis, angle);
        let shift = center.coords - rotation * center.coords;
        Self {
            matrix: Translation3::from(shift).to_homogeneous() * rotation.to_homogeneous(),
        }
    }

    /// Local-to-world frame with the given origin and axes.
    ///
    /// The axes are used as given; callers pass orthonormal vectors.
    pub fn from_axes(origin: &Point3, x_axis: &Vec3, y_axis: &Vec3, z_axis: &Vec3) -> Self {
        let mut m = Matrix4::identity();
        for row in 0..3 {
            m[(row, 0)] = x_axis[row];
            m[(row, 1)] = y_axis[row];
            m[(row, 2)] = z_axis[row];
            m[(row, 3)] = origin[row];
        }
        Self { matrix: m }
    }

    /// Frame at `origin` whose Z axis is `normal`, X/Y from [`arbitrary_axes`].
    pub fn from_origin_normal(origin: &Point3, normal: &Vec3) -> Option<Self> {
        let (x, y, z) = arbitrary_axes(normal)?;
        Some(Self::from_axes(origin, x.as_ref(), y.as_ref(), z.as_ref()))
    }

    /// Compose: `self` then `other` (self * other).
    ///
    /// Applying the result to a point applies `other` first.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (ignores translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Translation part of the transform.
    pub fn origin(&self) -> Point3 {
        Point3::new(self.matrix[(0, 3)], self.matrix[(1, 3)], self.matrix[(2, 3)])
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Deterministic orthonormal axes for a normal (the "arbitrary axis" rule).
///
/// Returns `(x, y, z)` with `z` the normalized input and `x × y = z`.
/// When the normal is close to the world Z axis, X is derived from world Y,
/// otherwise from world Z. Returns `None` for a zero-length normal.
pub fn arbitrary_axes(normal: &Vec3) -> Option<(Dir3, Dir3, Dir3)> {
    Dir3::try_new(*normal, f64::EPSILON).map(|z| unit_axes(&z))
}

/// [`arbitrary_axes`] for a normal that is already a unit vector.
pub fn unit_axes(z: &Dir3) -> (Dir3, Dir3, Dir3) {
    let limit = 1.0 / 64.0;
    let seed = if z.x.abs() < limit && z.y.abs() < limit {
        Vec3::y()
    } else {
        Vec3::z()
    };
    let x = Dir3::new_normalize(seed.cross(z.as_ref()));
    let y = Dir3::new_normalize(z.as_ref().cross(x.as_ref()));
    (x, y, *z)
}

/// Intersect two infinite 2D lines given as point + direction.
///
/// Returns `None` when the lines are parallel.
pub fn intersect_lines_2d(p: &Point2, d: &Vec2, q: &Point2, e: &Vec2) -> Option<Point2> {
    let denom = d.x * e.y - d.y * e.x;
    if denom.abs() < 1e-12 {
        return None;
    }
    let w = q - p;
    let t = (w.x * e.y - w.y * e.x) / denom;
    Some(p + d * t)
}

/// Length below which vectors and distances count as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Linear distance tolerance in model units.
    pub linear: f64,
}

impl Tolerance {
    /// 1e-6 model units.
    pub const DEFAULT: Self = Self { linear: 1e-6 };

    /// The vector is long enough to normalize and build frames from.
    pub fn is_valid(&self, v: &Vec3) -> bool {
        v.norm() >= self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_translation_moves_points_not_vectors() {
        let t = Transform::translation(10.0, 20.0, 30.0);
        assert_eq!(t.apply_point(&Point3::new(1.0, 2.0, 3.0)), Point3::new(11.0, 22.0, 33.0));
        assert_eq!(t.apply_vec(&Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.origin(), Point3::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn test_compose_applies_right_first() {
        let shift = Transform::translation(1.0, 0.0, 0.0);
        let double = Transform::scale(2.0, 3.0, 1.0);
        let p = double.then(&shift).apply_point(&Point3::new(0.0, 1.0, 0.0));
        assert_eq!(p, Point3::new(2.0, 3.0, 0.0));
    }

    #[test]
    fn test_rotation_about_offset_center() {
        let axis = Dir3::new_normalize(Vec3::z());
        let t = Transform::rotation(&Point3::new(1.0, 0.0, 4.0), &axis, PI / 2.0);
        let turned = t.apply_point(&Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(turned, Point3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
        let on_axis = t.apply_point(&Point3::new(1.0, 0.0, 7.0));
        assert_relative_eq!(on_axis, Point3::new(1.0, 0.0, 7.0), epsilon = 1e-12);
        assert_relative_eq!(t.apply_vec(&Vec3::x()), Vec3::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_from_axes_and_inverse() {
        let t = Transform::from_axes(
            &Point3::new(5.0, 0.0, 0.0),
            &Vec3::y(),
            &-Vec3::x(),
            &Vec3::z(),
        );
        let p = t.apply_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((p - Point3::new(5.0, 1.0, 0.0)).norm() < 1e-12);
        let back = t.inverse().unwrap().apply_point(&p);
        assert!((back - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
        assert_eq!(t.origin(), Point3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_arbitrary_axes_for_x() {
        let (x, y, z) = arbitrary_axes(&Vec3::new(3.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(x.into_inner(), Vec3::y(), epsilon = 1e-12);
        assert_relative_eq!(y.into_inner(), Vec3::z(), epsilon = 1e-12);
        assert_relative_eq!(z.into_inner(), Vec3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_unit_axes_match_arbitrary_axes() {
        let normal = Vec3::new(0.3, -2.0, 0.7);
        let (x, y, z) = unit_axes(&Dir3::try_new(normal, f64::EPSILON).unwrap());
        assert_eq!(Some((x, y, z)), arbitrary_axes(&normal));
        assert_relative_eq!(x.cross(y.as_ref()), z.into_inner(), epsilon = 1e-12);
    }

    #[test]
    fn test_arbitrary_axes_near_z_is_right_handed() {
        let (x, y, z) = arbitrary_axes(&Vec3::new(0.001, 0.0, 1.0)).unwrap();
        assert_relative_eq!(x.cross(y.as_ref()), z.into_inner(), epsilon = 1e-12);
        assert!(x.dot(z.as_ref()).abs() < 1e-12);
        assert!(arbitrary_axes(&Vec3::zeros()).is_none());
    }

    #[test]
    fn test_intersect_lines_2d() {
        let hit = intersect_lines_2d(
            &Point2::new(0.0, 0.0),
            &Vec2::new(1.0, 1.0),
            &Point2::new(2.0, 0.0),
            &Vec2::new(0.0, 1.0),
        )
        .unwrap();
        assert!((hit - Point2::new(2.0, 2.0)).norm() < 1e-12);

        let parallel = intersect_lines_2d(
            &Point2::new(0.0, 0.0),
            &Vec2::new(1.0, 0.0),
            &Point2::new(0.0, 1.0),
            &Vec2::new(2.0, 0.0),
        );
        assert!(parallel.is_none());
    }

    #[test]
    fn test_tolerance() {
        let tol = Tolerance::default();
        assert_eq!(tol, Tolerance::DEFAULT);
        assert!(!tol.is_valid(&Vec3::new(1e-9, 0.0, 0.0)));
        assert!(tol.is_valid(&Vec3::new(0.0, 0.5, 0.0)));
    }
}
