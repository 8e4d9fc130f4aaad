//! Trait definition for pluggable marketplace price sources.
//!
//! Each marketplace integration (eBay, Google Shopping, the mock
//! marketplace) implements [`PriceSource`] to provide a uniform interface
//! for availability checks and searching.

use async_trait::async_trait;

use crate::types::Listing;

/// A pluggable marketplace backend.
///
/// Implementors call a specific marketplace API and turn its response into
/// validated [`Listing`] values. Each source handles its own:
///
/// - request construction and credential injection
/// - per-call HTTP timeout
/// - response parsing, dropping items that fail listing validation
///
/// `search` is infallible by contract: timeouts, non-2xx statuses and
/// malformed payloads must be absorbed and reported as an empty list, so
/// one marketplace can never abort a comparison.
///
/// All implementations must be `Send + Sync` so they can be queried
/// concurrently behind an `Arc<dyn PriceSource>`.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Stable display name, e.g. `eBay`.
    fn name(&self) -> &str;

    /// Whether this source is configured well enough to be queried.
    ///
    /// Must be a pure function of the injected configuration; no I/O.
    fn is_available(&self) -> bool;

    /// Search for listings matching `query`.
    async fn search(&self, query: &str) -> Vec<Listing>;
}
