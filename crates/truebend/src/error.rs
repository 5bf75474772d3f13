//! Error types for the bend engine.

use thiserror::Error;
use truebend_geom::GeomError;
use truebend_scene::SceneError;
use truebend_slicer::SlicerError;

/// Errors raised while configuring, previewing or committing a bend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BendError {
    /// The reference geometry cannot define a bend.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// A requested value is out of range; state is unchanged.
    #[error("invalid value: {0}")]
    Validation(String),

    /// Text input could not be read as a value.
    #[error("cannot parse input: {0}")]
    Parse(String),

    /// Nested objects go deeper than the configured limit.
    #[error("nested objects exceed depth {0}")]
    RecursionLimit(usize),

    /// Settings could not be read or written.
    #[error("settings: {0}")]
    Settings(String),

    /// Geometry construction failed.
    #[error(transparent)]
    Geom(#[from] GeomError),

    /// The host rejected a scene query or mutation.
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Slicing failed.
    #[error(transparent)]
    Slicer(#[from] SlicerError),
}

/// Result type for bend operations.
pub type Result<T> = std::result::Result<T, BendError>;
