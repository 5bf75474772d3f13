#![warn(missing_docs)]

//! Geometric primitives for the truebend engine.
//!
//! Segments and planes for slicing, bounding boxes for picking a bend
//! reference, and the polar projection that wraps flat geometry onto an
//! arc.

pub mod bbox;
pub mod error;
pub mod grid;
pub mod plane;
pub mod polar;
pub mod polygon;
pub mod segment;

pub use bbox::{Aabb3, OrientedBox};
pub use error::{GeomError, Result};
pub use grid::Grid;
pub use plane::Plane;
pub use polar::PolarProjection;
pub use polygon::Polygon;
pub use segment::Segment;
