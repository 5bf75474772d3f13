//! Planar polygons given as an ordered point loop.

use truebend_math::{Dir3, Point3, Transform, Vec3};

use crate::error::{GeomError, Result};

/// A closed polygon (the last point connects back to the first).
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    points: Vec<Point3>,
}

impl Polygon {
    /// Create a polygon; at least 3 points are required.
    pub fn new(points: Vec<Point3>) -> Result<Self> {
        if points.len() < 3 {
            return Err(GeomError::TooFewPoints(points.len()));
        }
        Ok(Self { points })
    }

    /// The loop points.
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Average of the loop points.
    pub fn center(&self) -> Point3 {
        let sum = self
            .points
            .iter()
            .fold(Vec3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / self.points.len() as f64)
    }

    /// Newell normal, counter-clockwise loops face the viewer.
    ///
    /// Uses every edge, so collinear leading points are fine. `None` when
    /// the loop encloses no area.
    pub fn normal(&self) -> Option<Dir3> {
        let n = self.points.len();
        let sum = (0..n).fold(Vec3::zeros(), |acc, i| {
            let p = self.points[i];
            let q = self.points[(i + 1) % n];
            acc + Vec3::new(
                (p.y - q.y) * (p.z + q.z),
                (p.z - q.z) * (p.x + q.x),
                (p.x - q.x) * (p.y + q.y),
            )
        });
        Dir3::try_new(sum, 1e-12)
    }

    /// Transform every point in place.
    pub fn transform_mut(&mut self, t: &Transform) -> &mut Self {
        for p in &mut self.points {
            *p = t.apply_point(p);
        }
        self
    }
}
