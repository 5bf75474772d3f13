//! Error types for geometric primitives.

use thiserror::Error;

/// Errors raised when geometry cannot be constructed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeomError {
    /// Radius is zero, negative or not finite.
    #[error("invalid radius: {0}")]
    InvalidRadius(f64),

    /// A vector that must establish a direction has zero length.
    #[error("degenerate vector: {0}")]
    DegenerateVector(&'static str),

    /// Not enough points for the requested shape.
    #[error("expected at least 3 points, got {0}")]
    TooFewPoints(usize),

    /// Transform cannot be inverted.
    #[error("transform is not invertible")]
    SingularTransform,
}

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, GeomError>;
