use thiserror::Error;

/// Main error type for the Prospector workspace
#[derive(Error, Debug)]
pub enum PrError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Prospector operations
pub type PrResult<T> = Result<T, PrError>;

/// Macro for creating validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)*) => {
        $crate::PrError::Validation(format!($($arg)*))
    };
}
