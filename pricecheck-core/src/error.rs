//! Error types for the pricecheck-core crate.
//!
//! All errors carry stable string messages suitable for display to users
//! and programmatic handling. No API keys or credentials appear in error
//! messages.

/// Errors that can occur while comparing prices.
#[derive(Debug, thiserror::Error)]
pub enum PriceError {
    /// Every source that was invoked failed hard (panicked).
    #[error("all price sources failed: {0}")]
    AllSourcesFailed(String),

    /// A source call exceeded its time budget.
    #[error("source timed out: {0}")]
    Timeout(String),

    /// An HTTP request to a marketplace API failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse a marketplace API response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid comparison configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A listing violated the listing invariants and was rejected.
    #[error("invalid listing: {0}")]
    InvalidListing(String),

    /// The inbound comparison request was malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The caller abandoned the comparison before it settled.
    #[error("comparison cancelled")]
    Cancelled,
}

/// Convenience type alias for pricecheck-core results.
pub type Result<T> = std::result::Result<T, PriceError>;
