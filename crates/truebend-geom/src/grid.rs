//! Flat reference grid spanning an object's footprint.
//!
//! Projected through the polar mapping it shows how the flat layout maps
//! onto the bend.

use truebend_math::{Point3, Transform};

use crate::segment::Segment;

/// A `width` x `height` grid in the local XY plane.
#[derive(Debug, Clone)]
pub struct Grid {
    width: f64,
    height: f64,
    /// Number of columns.
    pub x_subdivs: usize,
    /// Number of rows.
    pub y_subdivs: usize,
    /// Grid to world transform.
    pub transform: Transform,
}

impl Grid {
    /// Create a 3 x 3 grid at the origin.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            x_subdivs: 3,
            y_subdivs: 3,
            transform: Transform::identity(),
        }
    }

    fn steps(&self) -> (f64, f64) {
        (
            self.width / self.x_subdivs.max(1) as f64,
            self.height / self.y_subdivs.max(1) as f64,
        )
    }

    fn segment(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Segment {
        Segment::new(Point3::new(x1, y1, 0.0), Point3::new(x2, y2, 0.0)).transform(&self.transform)
    }

    /// Full-length grid lines: `y_subdivs + 1` rows then `x_subdivs + 1` columns.
    pub fn lines(&self) -> Vec<Segment> {
        let (x_step, y_step) = self.steps();
        let rows = (0..=self.y_subdivs).map(|i| {
            let y = y_step * i as f64;
            self.segment(0.0, y, self.width, y)
        });
        let columns = (0..=self.x_subdivs).map(|i| {
            let x = x_step * i as f64;
            self.segment(x, 0.0, x, self.height)
        });
        rows.chain(columns).collect()
    }

    /// Grid lines broken at every cell boundary, so each piece spans one
    /// cell and follows the bend once projected.
    pub fn segments(&self) -> Vec<Segment> {
        let (x_step, y_step) = self.steps();
        let mut result = Vec::new();
        for col in 0..self.x_subdivs {
            let x1 = x_step * col as f64;
            let x2 = x_step * (col + 1) as f64;
            for row in 0..=self.y_subdivs {
                let y = y_step * row as f64;
                result.push(self.segment(x1, y, x2, y));
            }
        }
        for row in 0..self.y_subdivs {
            let y1 = y_step * row as f64;
            let y2 = y_step * (row + 1) as f64;
            for col in 0..=self.x_subdivs {
                let x = x_step * col as f64;
                result.push(self.segment(x, y1, x, y2));
            }
        }
        result
    }
}
