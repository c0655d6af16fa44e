//! Engine errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Grid-dependent work was requested before the host reported a surface size.
    #[error("board dimensions not set, unable to {operation}")]
    NotInitialized { operation: &'static str },
    #[error("cell size must be at least 1")]
    InvalidCellSize,
    #[error("shape catalog must contain at least one shape")]
    EmptyCatalog,
    #[error("block frame at ({x}, {y}) is too far outside the board")]
    OutOfRange { x: i32, y: i32 },
}

impl EngineError {
    pub(crate) fn not_initialized(operation: &'static str) -> Self {
        Self::NotInitialized { operation }
    }
}
