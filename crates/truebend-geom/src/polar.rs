//! Cartesian to polar mapping used to bend geometry around an arc.
//!
//! Points are given in the reference segment's local frame: X is the
//! distance along the segment, Y the signed offset from it and Z the offset
//! along the bend axis. X becomes arc length at radius `R`, Y becomes a
//! radial offset and Z is kept:
//!
//! ```text
//! angle = x / R
//! x'    = (R + y) * cos(angle)
//! y'    = (R + y) * sin(angle)
//! z'    = z
//! ```

use truebend_math::{arbitrary_axes, intersect_lines_2d, Dir3, Point2, Point3, Transform, Vec3, TAU};

use crate::error::{GeomError, Result};

/// Polar projection at a fixed radius with an optional target frame.
#[derive(Debug, Clone)]
pub struct PolarProjection {
    radius: f64,
    transform: Option<Transform>,
}

impl PolarProjection {
    /// Create a projection; the radius must be finite and positive.
    pub fn new(radius: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GeomError::InvalidRadius(radius));
        }
        Ok(Self {
            radius,
            transform: None,
        })
    }

    /// Radius the local X axis is wrapped onto.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Circumference at the projection radius.
    pub fn circumference(&self) -> f64 {
        TAU * self.radius
    }

    /// Target frame applied to projected points, if set.
    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    /// Set the target frame from an origin and X axis; Y and Z follow the
    /// arbitrary-axis rule for `x_axis`.
    pub fn axes(&mut self, origin: &Point3, x_axis: &Vec3) -> Result<()> {
        let (y, z, x) = arbitrary_axes(x_axis).ok_or(GeomError::DegenerateVector("polar x axis"))?;
        self.transform = Some(Transform::from_axes(origin, x.as_ref(), y.as_ref(), z.as_ref()));
        Ok(())
    }

    /// Set the target frame from an origin, X axis and bend axis.
    ///
    /// `z_axis` is made perpendicular to `x_axis`; Y completes a
    /// right-handed frame.
    pub fn axes_with_normal(&mut self, origin: &Point3, x_axis: &Vec3, z_axis: &Vec3) -> Result<()> {
        let x = Dir3::try_new(*x_axis, f64::EPSILON)
            .ok_or(GeomError::DegenerateVector("polar x axis"))?;
        let z_perp = z_axis - x.as_ref() * z_axis.dot(x.as_ref());
        let z = Dir3::try_new(z_perp, 1e-12).ok_or(GeomError::DegenerateVector("polar z axis"))?;
        let y = z.cross(x.as_ref());
        self.transform = Some(Transform::from_axes(origin, x.as_ref(), &y, z.as_ref()));
        Ok(())
    }

    /// Project points given in segment-local coordinates.
    ///
    /// `convex` selects the mirroring: convex bends mirror Y, concave bends
    /// mirror X. With `segment_angle` set (and positive), each point is
    /// snapped onto the chord of the angular cell it falls in, producing
    /// flat facets. The output is index-aligned with the input.
    pub fn project(&self, points: &[Point3], convex: bool, segment_angle: Option<f64>) -> Vec<Point3> {
        let segment_angle = segment_angle.filter(|a| a.is_finite() && *a > 0.0);
        let circumference = self.circumference();
        points
            .iter()
            .map(|local| {
                let point = if convex {
                    Point3::new(local.x, -local.y, local.z)
                } else {
                    Point3::new(-local.x, local.y, local.z)
                };
                let angle = TAU * (point.x / circumference);
                let mut polar = self.project_point(&point, angle);
                if let Some(segment_angle) = segment_angle {
                    polar = self.snap_to_chord(&point, &polar, angle, segment_angle, convex);
                }
                match &self.transform {
                    Some(t) => t.apply_point(&polar),
                    None => polar,
                }
            })
            .collect()
    }

    fn project_point(&self, point: &Point3, angle: f64) -> Point3 {
        let r = self.radius + point.y;
        Point3::new(r * angle.cos(), r * angle.sin(), point.z)
    }

    /// Intersect the radial ray through `polar` with the chord of its cell.
    ///
    /// Solved in the XY plane at the point's Z.
    fn snap_to_chord(
        &self,
        point: &Point3,
        polar: &Point3,
        angle: f64,
        segment_angle: f64,
        convex: bool,
    ) -> Point3 {
        let cell = (angle / segment_angle).trunc();
        let offset = if convex { 1.0 } else { -1.0 };
        let a1 = segment_angle * cell;
        let a2 = segment_angle * (cell + offset);
        let p1 = self.project_point(point, a1);
        let p2 = self.project_point(point, a2);

        let chord_start = Point2::new(p1.x, p1.y);
        let chord_dir = Point2::new(p2.x, p2.y) - chord_start;
        let ray_dir = Point2::new(polar.x, polar.y) - Point2::origin();
        match intersect_lines_2d(&Point2::origin(), &ray_dir, &chord_start, &chord_dir) {
            Some(hit) => Point3::new(hit.x, hit.y, point.z),
            None => *polar,
        }
    }
}
