//! Engine error types.
//!
//! The taxonomy mirrors how failures propagate: observer and grid problems
//! are rejected before any synthesis work, normalization and tangency
//! failures indicate a data or model bug and surface unchanged, and data
//! errors bubble up from the loading layer.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur during a computation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Observer parameters outside the validated physiological range.
    #[error("domain error: {0}")]
    Domain(String),

    /// Invalid wavelength grid.
    #[error("grid error: {0}")]
    Grid(String),

    /// The constrained system for a transform matrix is singular or the
    /// solve failed to converge. Fatal; indicates a data or model bug.
    #[error("normalization error: {0}")]
    Normalization(String),

    /// No locus point satisfies the convex tangency condition.
    #[error("tangency error: {0}")]
    Tangency(String),

    /// A chromaticity normalization divisor was zero. Cannot occur on the
    /// physical domain; raised instead of propagating NaN.
    #[error("divide by zero in chromaticity normalization at {wavelength} nm")]
    DivideByZero {
        /// Wavelength of the offending row, nm.
        wavelength: f64,
    },

    /// Error from the data layer.
    #[error(transparent)]
    Data(#[from] cfb_data::DataError),
}
