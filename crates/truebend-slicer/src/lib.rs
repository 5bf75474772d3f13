#![warn(missing_docs)]

//! Plane slicing for the truebend engine.
//!
//! Previews split the visible mesh edges against the cutting planes without
//! touching the scene. Commits hand the same planes to the host's cut
//! primitive as finite quads.
//!
//! # Example
//!
//! ```ignore
//! use truebend_slicer::{slice_segments, slicing_planes};
//!
//! let planes = slicing_planes(&reference, 24)?;
//! let pieces = slice_segments(&edges, &planes);
//! ```

pub mod cut;
pub mod error;
pub mod extract;
pub mod slice;

pub use cut::{cut_object, cut_quads};
pub use error::{Result, SlicerError};
pub use extract::{edge_segments, object_segments};
pub use slice::{slice_segments, slicing_planes};
