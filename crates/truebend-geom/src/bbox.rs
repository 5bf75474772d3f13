//! Bounding boxes.
//!
//! [`Aabb3`] is a plain axis-aligned box. [`OrientedBox`] is an object's
//! definition-space box carried into world space by the object transform;
//! it exposes the named corners, the twelve edges and the six faces used
//! to pick a bend reference.

use truebend_math::{Point3, Transform, Vec3};

use crate::polygon::Polygon;
use crate::segment::Segment;

/// Corner index: left, front, bottom (`min` corner).
pub const LEFT_FRONT_BOTTOM: usize = 0;
/// Corner index: right, front, bottom.
pub const RIGHT_FRONT_BOTTOM: usize = 1;
/// Corner index: left, back, bottom.
pub const LEFT_BACK_BOTTOM: usize = 2;
/// Corner index: right, back, bottom.
pub const RIGHT_BACK_BOTTOM: usize = 3;
/// Corner index: left, front, top.
pub const LEFT_FRONT_TOP: usize = 4;
/// Corner index: right, front, top.
pub const RIGHT_FRONT_TOP: usize = 5;
/// Corner index: left, back, top.
pub const LEFT_BACK_TOP: usize = 6;
/// Corner index: right, back, top (`max` corner).
pub const RIGHT_BACK_TOP: usize = 7;

/// Face index of the front face (minimum Y).
pub const FACE_FRONT: usize = 0;
/// Face index of the right face (maximum X).
pub const FACE_RIGHT: usize = 1;
/// Face index of the back face (maximum Y).
pub const FACE_BACK: usize = 2;
/// Face index of the left face (minimum X).
pub const FACE_LEFT: usize = 3;
/// Face index of the top face (maximum Z).
pub const FACE_TOP: usize = 4;
/// Face index of the bottom face (minimum Z).
pub const FACE_BOTTOM: usize = 5;

const EDGES: [(usize, usize); 12] = [
    (LEFT_FRONT_BOTTOM, RIGHT_FRONT_BOTTOM),
    (RIGHT_FRONT_BOTTOM, RIGHT_FRONT_TOP),
    (RIGHT_FRONT_TOP, LEFT_FRONT_TOP),
    (LEFT_FRONT_TOP, LEFT_FRONT_BOTTOM),
    (LEFT_BACK_BOTTOM, RIGHT_BACK_BOTTOM),
    (RIGHT_BACK_BOTTOM, RIGHT_BACK_TOP),
    (RIGHT_BACK_TOP, LEFT_BACK_TOP),
    (LEFT_BACK_TOP, LEFT_BACK_BOTTOM),
    (LEFT_FRONT_BOTTOM, LEFT_BACK_BOTTOM),
    (RIGHT_FRONT_BOTTOM, RIGHT_BACK_BOTTOM),
    (RIGHT_FRONT_TOP, RIGHT_BACK_TOP),
    (LEFT_FRONT_TOP, LEFT_BACK_TOP),
];

const FACES: [[usize; 4]; 6] = [
    [LEFT_FRONT_BOTTOM, RIGHT_FRONT_BOTTOM, RIGHT_FRONT_TOP, LEFT_FRONT_TOP],
    [RIGHT_FRONT_BOTTOM, RIGHT_BACK_BOTTOM, RIGHT_BACK_TOP, RIGHT_FRONT_TOP],
    [RIGHT_BACK_BOTTOM, LEFT_BACK_BOTTOM, LEFT_BACK_TOP, RIGHT_BACK_TOP],
    [LEFT_BACK_BOTTOM, LEFT_FRONT_BOTTOM, LEFT_FRONT_TOP, LEFT_BACK_TOP],
    [LEFT_FRONT_TOP, RIGHT_FRONT_TOP, RIGHT_BACK_TOP, LEFT_BACK_TOP],
    [RIGHT_BACK_BOTTOM, LEFT_BACK_BOTTOM, LEFT_FRONT_BOTTOM, RIGHT_FRONT_BOTTOM],
];

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Inverted box that any included point replaces.
    pub fn empty() -> Self {
        Self {
            min: Point3::from([f64::INFINITY; 3]),
            max: Point3::from([f64::NEG_INFINITY; 3]),
        }
    }

    /// Smallest box containing all points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.include_point(p);
        }
        aabb
    }

    /// True until a point has been included.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow to contain `p`.
    pub fn include_point(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Extent along X.
    pub fn width(&self) -> f64 {
        (self.max.x - self.min.x).max(0.0)
    }

    /// Extent along Y.
    pub fn height(&self) -> f64 {
        (self.max.y - self.min.y).max(0.0)
    }

    /// Extent along Z.
    pub fn depth(&self) -> f64 {
        (self.max.z - self.min.z).max(0.0)
    }

    /// Length of the min-max diagonal, zero when empty.
    pub fn diagonal(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (self.max - self.min).norm()
    }

    /// Center point.
    pub fn center(&self) -> Point3 {
        self.min + (self.max - self.min) * 0.5
    }

    /// Corner by index; bit 0 selects max X, bit 1 max Y, bit 2 max Z.
    pub fn corner(&self, index: usize) -> Point3 {
        Point3::new(
            if index & 1 == 0 { self.min.x } else { self.max.x },
            if index & 2 == 0 { self.min.y } else { self.max.y },
            if index & 4 == 0 { self.min.z } else { self.max.z },
        )
    }

    /// All eight corners in index order.
    pub fn corners(&self) -> [Point3; 8] {
        std::array::from_fn(|i| self.corner(i))
    }
}

/// A definition-space box placed in world space by a transform.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientedBox {
    /// Box in the object's own coordinates.
    pub local: Aabb3,
    /// Object to world transform.
    pub transform: Transform,
}

impl OrientedBox {
    /// Create from local bounds and the object transform.
    pub fn new(local: Aabb3, transform: Transform) -> Self {
        Self { local, transform }
    }

    /// Corner by index in world space.
    pub fn corner(&self, index: usize) -> Point3 {
        self.transform.apply_point(&self.local.corner(index))
    }

    /// All eight corners in world space.
    pub fn corners(&self) -> [Point3; 8] {
        std::array::from_fn(|i| self.corner(i))
    }

    /// World-space width (local X extent scaled by the transform).
    pub fn width(&self) -> f64 {
        self.local.width() * self.transform.apply_vec(&Vec3::x()).norm()
    }

    /// World-space height (local Y extent scaled by the transform).
    pub fn height(&self) -> f64 {
        self.local.height() * self.transform.apply_vec(&Vec3::y()).norm()
    }

    /// World-space depth (local Z extent scaled by the transform).
    pub fn depth(&self) -> f64 {
        self.local.depth() * self.transform.apply_vec(&Vec3::z()).norm()
    }

    /// Distance between the left-front-bottom and right-back-top corners.
    pub fn diagonal(&self) -> f64 {
        (self.corner(RIGHT_BACK_TOP) - self.corner(LEFT_FRONT_BOTTOM)).norm()
    }

    /// The twelve box edges in world space; the first runs along local X
    /// from the left-front-bottom corner.
    pub fn segments(&self) -> Vec<Segment> {
        EDGES
            .iter()
            .map(|&(a, b)| Segment::new(self.corner(a), self.corner(b)))
            .collect()
    }

    /// Face polygon by face index (see `FACE_*`).
    pub fn polygon(&self, index: usize) -> Option<Polygon> {
        let face = FACES.get(index)?;
        Polygon::new(face.iter().map(|&i| self.corner(i)).collect()).ok()
    }

    /// World-space axis-aligned bounds of the box.
    pub fn world_aabb(&self) -> Aabb3 {
        Aabb3::from_points(self.corners().iter())
    }
}
