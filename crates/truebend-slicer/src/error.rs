//! Error types for the slicer.

use thiserror::Error;
use truebend_geom::GeomError;
use truebend_scene::SceneError;

/// Errors that can occur during slicing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlicerError {
    /// No cutting planes were given to a cut.
    #[error("no cutting planes")]
    EmptyPlanes,

    /// Nested objects go deeper than the allowed depth.
    #[error("nested objects exceed depth {0}")]
    RecursionLimit(usize),

    /// The host rejected a scene query or mutation.
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Geometry could not be constructed.
    #[error(transparent)]
    Geom(#[from] GeomError),
}

/// Result type for slicer operations.
pub type Result<T> = std::result::Result<T, SlicerError>;
