//! Marketplace source implementations.
//!
//! Each module provides a struct implementing [`crate::source::PriceSource`]
//! for one marketplace. [`default_sources`] assembles the registry the
//! orchestrator fans out to.

pub mod ebay;
pub mod mock;
pub mod serpapi;

pub use ebay::EbaySource;
pub use mock::MockSource;
pub use serpapi::SerpApiSource;

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::config::SourceCredentials;
use crate::error::PriceError;
use crate::source::PriceSource;

/// Build the standard source registry, in query order: eBay, Google
/// Shopping, Mock. Every source is constructed; availability is decided
/// per comparison through [`PriceSource::is_available`].
///
/// # Errors
///
/// Returns [`PriceError::Http`] if an HTTP client cannot be built.
pub fn default_sources(
    credentials: &SourceCredentials,
) -> Result<Vec<Arc<dyn PriceSource>>, PriceError> {
    Ok(vec![
        Arc::new(EbaySource::new(credentials)?),
        Arc::new(SerpApiSource::new(credentials)?),
        Arc::new(MockSource::new(credentials)),
    ])
}

/// Read a JSON number or numeric string as an exact decimal.
pub(crate) fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
