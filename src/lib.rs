//! pricecheck: compare marketplace prices for a product from the command line.
//!
//! The comparison pipeline itself lives in [`pricecheck_core`]. This crate
//! adds configuration loading and source assembly for the `pricecheck`
//! binary.

pub mod config;
pub mod error;

pub use config::AppConfig;
pub use error::{AppError, Result};

use std::sync::Arc;

use pricecheck_core::{PriceSource, default_sources};
use serde::Serialize;

/// Build the source registry for `config`.
///
/// # Errors
///
/// Returns an error if an HTTP client cannot be built.
pub fn build_sources(config: &AppConfig) -> Result<Vec<Arc<dyn PriceSource>>> {
    Ok(default_sources(&config.sources)?)
}

/// Availability of one configured source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStatus {
    pub name: String,
    pub available: bool,
}

/// Report which sources would be queried, in registry order.
pub fn source_status(sources: &[Arc<dyn PriceSource>]) -> Vec<SourceStatus> {
    sources
        .iter()
        .map(|source| SourceStatus {
            name: source.name().to_string(),
            available: source.is_available(),
        })
        .collect()
}
