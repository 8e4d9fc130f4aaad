//! Error types for the pricecheck application layer.

use pricecheck_core::PriceError;

/// Top-level error type for configuration loading and source assembly.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration file or environment override error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by the comparison pipeline.
    #[error(transparent)]
    Core(#[from] PriceError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;
