//! # pricecheck-core
//!
//! Find the cheapest way to buy a product across several marketplaces.
//!
//! This crate answers one question: given a free-text product name, which
//! marketplace offers are cheapest once shipping is included? It is a
//! library; the HTTP transport to each marketplace lives inside the source
//! adapters and nothing here listens on the network.
//!
//! ## Design
//!
//! - Normalises the product name into a query plus brand/model hints
//! - Queries every available [`PriceSource`] concurrently and merges the
//!   results in source order
//! - Graceful degradation: a failing, slow or panicking source contributes
//!   nothing instead of failing the comparison
//! - Deduplicates listings by normalised URL, keeping the cheapest copy
//! - Ranks by total price (item + shipping) and caps the result count
//!
//! ## Security
//!
//! - Credentials are injected through [`SourceCredentials`] and never
//!   appear in errors or logs
//! - Product queries are logged only at trace level
//! - No state is kept between comparisons

pub mod config;
pub mod error;
pub mod http;
pub mod normalizer;
pub mod orchestrator;
pub mod source;
pub mod sources;
pub mod types;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

pub use config::{CompareConfig, SourceCredentials};
pub use error::{PriceError, Result};
pub use normalizer::{matches, normalize};
pub use source::PriceSource;
pub use sources::default_sources;
pub use types::{ComparisonRequest, ComparisonResult, Condition, Listing, NormalizedQuery};

/// Compare prices for a product across `sources`.
///
/// Normalises `product_name`, queries all available sources concurrently,
/// deduplicates by normalised URL, and returns up to `config.max_results`
/// listings sorted by total price, cheapest first.
///
/// # Errors
///
/// Returns [`PriceError::Config`] or [`PriceError::InvalidRequest`] for bad
/// input, and [`PriceError::AllSourcesFailed`] only if every invoked source
/// panicked. Individual source failures are logged and otherwise ignored.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> pricecheck_core::Result<()> {
/// use pricecheck_core::{default_sources, CompareConfig, SourceCredentials};
///
/// let sources = default_sources(&SourceCredentials::default())?;
/// let result = pricecheck_core::compare("Sony WH-1000XM5", &sources, &CompareConfig::default()).await?;
/// for listing in &result.results {
///     println!("{} {} {}", listing.total_price(), listing.source(), listing.url());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn compare(
    product_name: &str,
    sources: &[Arc<dyn PriceSource>],
    config: &CompareConfig,
) -> Result<ComparisonResult> {
    orchestrator::compare::compare(product_name, sources, config).await
}

/// Like [`compare`], but abandons the comparison when `cancel` fires.
///
/// # Errors
///
/// Same as [`compare`], plus [`PriceError::Cancelled`].
pub async fn compare_with_cancel(
    product_name: &str,
    sources: &[Arc<dyn PriceSource>],
    config: &CompareConfig,
    cancel: &CancellationToken,
) -> Result<ComparisonResult> {
    orchestrator::compare::compare_with_cancel(product_name, sources, config, cancel).await
}

/// Handle an inbound [`ComparisonRequest`].
///
/// # Errors
///
/// Returns [`PriceError::InvalidRequest`] if the product name is blank,
/// otherwise the same as [`compare`].
pub async fn handle_request(
    request: &ComparisonRequest,
    sources: &[Arc<dyn PriceSource>],
    config: &CompareConfig,
) -> Result<ComparisonResult> {
    compare(request.product_name()?, sources, config).await
}
