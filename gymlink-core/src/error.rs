//! Errors in the library.
use thiserror::Error;

/// Errors raised by types in `gymlink-core`.
#[derive(Error, Debug, PartialEq)]
pub enum GymlinkError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// A batch does not have the shape expected from the environment.
    #[error("Shape mismatch in {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// The quantity being checked.
        what: String,
        /// Expected shape.
        expected: Vec<usize>,
        /// Shape actually given.
        actual: Vec<usize>,
    },

    /// A space descriptor with an empty shape or a zero-sized dimension.
    #[error("Invalid space: {0}")]
    InvalidSpace(String),

    /// An action is outside of the action space.
    #[error("Invalid action: {0}")]
    InvalidAction(String),
}
