//! Error types for the tile contour engine.

use contour::TraceError;
use projection::ProjectionError;
use thiserror::Error;

/// Result type for tile engine operations.
pub type Result<T> = std::result::Result<T, TileError>;

/// Errors surfaced by the tile contour engine.
#[derive(Debug, Error)]
pub enum TileError {
    /// A caller-supplied parameter is invalid. Raised before any tracing
    /// begins; nothing is cached for an invalid call.
    #[error("invalid parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    /// Every cell of the grid is masked; there is no elevation range.
    #[error("tile has no valid elevation data")]
    NoValidData,

    /// Tracing a level failed. Aborts the whole call, no partial result.
    #[error(transparent)]
    Trace(#[from] TraceError),

    /// The output transform rejected a coordinate.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// The xyz dump destination could not be opened or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TileError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}
