#![warn(missing_docs)]

//! Bend geometry engine.
//!
//! Wraps an object's mesh around an arc defined by a reference segment and
//! a drag vector. [`Bender`] holds the bend state and computes metrics,
//! previews and the commit; [`BendSession`] adds the interactive tool
//! behaviour; [`Overlay`] turns the state into drawing data.
//!
//! # Example
//!
//! ```ignore
//! use truebend::{BendSettings, Bender};
//!
//! let settings = BendSettings::default();
//! let mut bender = Bender::for_object(&scene, object, &settings)?;
//! bender.set_angle(std::f64::consts::FRAC_PI_2)?;
//! let report = bender.commit(&mut scene)?;
//! println!("moved {} vertices", report.vertices);
//! ```

pub mod bender;
pub mod error;
pub mod input;
pub mod overlay;
pub mod session;
pub mod settings;

pub use bender::{curve_length, BendMetrics, BendState, Bender, CommitReport};
pub use error::{BendError, Result};
pub use input::{parse_input, InputValue};
pub use overlay::{Label, LineStyle, MarkerKind, Markers, Overlay, Polyline};
pub use session::BendSession;
pub use settings::{BendSettings, DebugSettings};

// Re-export lower layers so hosts depend on one crate.
pub use truebend_geom as geom;
pub use truebend_math as math;
pub use truebend_scene as scene;
pub use truebend_slicer as slicer;
