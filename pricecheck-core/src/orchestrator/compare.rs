//! Core comparison orchestrator: concurrent multi-source fan-out, dedup, rank.
//!
//! Normalises the product name, queries every available source
//! concurrently, merges their listings in source order, optionally filters
//! them for relevance, deduplicates by normalised URL and returns the
//! cheapest listings.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::config::CompareConfig;
use crate::error::PriceError;
use crate::normalizer::{matches, normalize};
use crate::source::PriceSource;
use crate::types::{ComparisonResult, Listing, NormalizedQuery};

use super::dedup::dedupe;
use super::ranking::{rank, sort_by_total_price};

/// What a single source contributed to one comparison.
#[derive(Debug)]
enum SourceOutcome {
    Listings(Vec<Listing>),
    TimedOut,
    Panicked(String),
}

/// Compare prices for `product_name` across `sources`.
///
/// See [`compare_with_cancel`] for the pipeline; this variant can only be
/// abandoned by dropping the returned future.
pub async fn compare(
    product_name: &str,
    sources: &[Arc<dyn PriceSource>],
    config: &CompareConfig,
) -> Result<ComparisonResult, PriceError> {
    compare_with_cancel(product_name, sources, config, &CancellationToken::new()).await
}

/// Compare prices, abandoning the whole request if `cancel` fires.
///
/// # Pipeline
///
/// 1. Validate `config` and normalise the product name
/// 2. Keep sources whose [`PriceSource::is_available`] is true
/// 3. Fan out `search` concurrently with [`futures::future::join_all`],
///    each call bounded by `config.source_timeout_seconds`
/// 4. Treat timed-out or panicking sources as contributing nothing
/// 5. Concatenate listings in source order (never completion order)
/// 6. Drop irrelevant titled listings if `config.relevance_filter` is set
/// 7. Stable-sort by total price, then deduplicate by normalised URL so
///    the cheapest copy of each offer survives
/// 8. Rank and truncate to `config.max_results`
///
/// No available sources, or only empty results, is a successful empty
/// comparison.
///
/// # Errors
///
/// - [`PriceError::Config`] for an invalid `config`
/// - [`PriceError::InvalidRequest`] if the product name is blank
/// - [`PriceError::Cancelled`] if `cancel` fires first; in-flight source
///   calls are dropped and nothing partial is returned
/// - [`PriceError::AllSourcesFailed`] only if **every** invoked source
///   panicked
pub async fn compare_with_cancel(
    product_name: &str,
    sources: &[Arc<dyn PriceSource>],
    config: &CompareConfig,
    cancel: &CancellationToken,
) -> Result<ComparisonResult, PriceError> {
    config.validate()?;

    let query = normalize(product_name);
    if query.query_text().is_empty() {
        return Err(PriceError::InvalidRequest(
            "product name must not be empty".into(),
        ));
    }
    tracing::trace!(
        query = query.query_text(),
        brand = query.brand(),
        model = query.model(),
        "normalised query"
    );

    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            tracing::debug!("comparison cancelled before sources settled");
            Err(PriceError::Cancelled)
        }
        result = run_pipeline(&query, sources, config) => result,
    }
}

async fn run_pipeline(
    query: &NormalizedQuery,
    sources: &[Arc<dyn PriceSource>],
    config: &CompareConfig,
) -> Result<ComparisonResult, PriceError> {
    let available: Vec<&dyn PriceSource> = sources
        .iter()
        .map(|s| &**s)
        .filter(|s| s.is_available())
        .collect();

    if available.is_empty() {
        tracing::debug!("no price sources available");
        return Ok(ComparisonResult {
            query: query.query_text().to_string(),
            results: Vec::new(),
        });
    }

    // 1. Fan out to all available sources concurrently.
    let budget = Duration::from_secs(config.source_timeout_seconds);
    let calls = available
        .iter()
        .map(|source| query_source(*source, query.query_text(), budget));
    let outcomes = futures::future::join_all(calls).await;

    // 2. Merge in source order, logging failures.
    let mut merged: Vec<Listing> = Vec::new();
    let mut panicked: Vec<String> = Vec::new();

    for (source, outcome) in available.iter().zip(outcomes) {
        let name = source.name();
        match outcome {
            SourceOutcome::Listings(listings) => {
                tracing::debug!(source = name, count = listings.len(), "source returned listings");
                merged.extend(listings);
            }
            SourceOutcome::TimedOut => {
                tracing::warn!(
                    source = name,
                    budget_secs = budget.as_secs(),
                    "source exceeded time budget"
                );
            }
            SourceOutcome::Panicked(message) => {
                tracing::warn!(source = name, error = %message, "source panicked");
                panicked.push(format!("{name}: {message}"));
            }
        }
    }

    // 3. Only a failure of every invoked source is fatal.
    if panicked.len() == available.len() {
        return Err(PriceError::AllSourcesFailed(panicked.join("; ")));
    }

    // 4. Optional relevance filter.
    if config.relevance_filter {
        let before = merged.len();
        merged.retain(|listing| listing.title().is_none_or(|title| matches(title, query)));
        tracing::debug!(dropped = before - merged.len(), "relevance filter applied");
    }

    // 5. Cheapest-first before dedup so the kept duplicate is the cheapest.
    sort_by_total_price(&mut merged);
    let unique = dedupe(merged);

    // 6. Rank and truncate.
    let results = rank(unique, config.max_results);

    Ok(ComparisonResult {
        query: query.query_text().to_string(),
        results,
    })
}

/// Run one source call, converting a blown budget or a panic into an
/// outcome instead of letting it escape.
async fn query_source(source: &dyn PriceSource, query: &str, budget: Duration) -> SourceOutcome {
    let call = AssertUnwindSafe(tokio::time::timeout(budget, source.search(query)));
    match call.catch_unwind().await {
        Ok(Ok(listings)) => SourceOutcome::Listings(listings),
        Ok(Err(_elapsed)) => SourceOutcome::TimedOut,
        Err(payload) => SourceOutcome::Panicked(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Condition;
    use async_trait::async_trait;
    use rust_decimal::Decimal;

    enum Behaviour {
        Return(Vec<Listing>),
        Panic,
        Sleep(Duration, Vec<Listing>),
    }

    struct FakeSource {
        name: &'static str,
        available: bool,
        behaviour: Behaviour,
    }

    #[async_trait]
    impl PriceSource for FakeSource {
        fn name(&self) -> &str {
            self.name
        }

        fn is_available(&self) -> bool {
            self.available
        }

        async fn search(&self, _query: &str) -> Vec<Listing> {
            match &self.behaviour {
                Behaviour::Return(listings) => listings.clone(),
                Behaviour::Panic => panic!("{} exploded", self.name),
                Behaviour::Sleep(delay, listings) => {
                    tokio::time::sleep(*delay).await;
                    listings.clone()
                }
            }
        }
    }

    fn fake(name: &'static str, behaviour: Behaviour) -> Arc<dyn PriceSource> {
        Arc::new(FakeSource {
            name,
            available: true,
            behaviour,
        })
    }

    fn listing(source: &str, url: &str, cents: i64) -> Listing {
        Listing::new(source, Decimal::new(cents, 2), Decimal::ZERO, Condition::New, url)
            .expect("valid listing")
    }

    fn urls(result: &ComparisonResult) -> Vec<&str> {
        result.results.iter().map(Listing::url).collect()
    }

    #[tokio::test]
    async fn merges_sources_and_ranks() {
        let sources = vec![
            fake(
                "A",
                Behaviour::Return(vec![
                    listing("A", "https://a.com/1", 3000),
                    listing("A", "https://a.com/2", 1000),
                ]),
            ),
            fake("B", Behaviour::Return(vec![listing("B", "https://b.com/1", 2000)])),
        ];
        let result = compare("widget", &sources, &CompareConfig::default())
            .await
            .expect("compare");
        assert_eq!(result.query, "widget");
        assert_eq!(urls(&result), ["https://a.com/2", "https://b.com/1", "https://a.com/1"]);
    }

    #[tokio::test]
    async fn panicking_source_contributes_nothing() {
        let sources = vec![
            fake(
                "A",
                Behaviour::Return(vec![
                    listing("A", "https://a.com/1", 300),
                    listing("A", "https://a.com/2", 100),
                    listing("A", "https://a.com/3", 200),
                ]),
            ),
            fake("B", Behaviour::Panic),
        ];
        let result = compare("widget", &sources, &CompareConfig::default())
            .await
            .expect("compare");
        assert_eq!(urls(&result), ["https://a.com/2", "https://a.com/3", "https://a.com/1"]);
    }

    #[tokio::test]
    async fn all_sources_panicking_is_fatal() {
        let sources = vec![fake("A", Behaviour::Panic), fake("B", Behaviour::Panic)];
        let err = compare("widget", &sources, &CompareConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PriceError::AllSourcesFailed(_)));
        assert!(err.to_string().contains("A exploded"));
        assert!(err.to_string().contains("B exploded"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_source_times_out_without_blocking_others() {
        let sources = vec![
            fake(
                "Slow",
                Behaviour::Sleep(
                    Duration::from_secs(120),
                    vec![listing("Slow", "https://slow.com/1", 1)],
                ),
            ),
            fake("Fast", Behaviour::Return(vec![listing("Fast", "https://fast.com/1", 500)])),
        ];
        let config = CompareConfig {
            source_timeout_seconds: 5,
            ..Default::default()
        };
        let result = compare("widget", &sources, &config).await.expect("compare");
        assert_eq!(urls(&result), ["https://fast.com/1"]);
    }

    #[tokio::test]
    async fn no_available_sources_is_empty_success() {
        let sources: Vec<Arc<dyn PriceSource>> = vec![Arc::new(FakeSource {
            name: "Off",
            available: false,
            behaviour: Behaviour::Panic,
        })];
        let result = compare("  widget  ", &sources, &CompareConfig::default())
            .await
            .expect("compare");
        assert_eq!(result.query, "widget");
        assert!(result.results.is_empty());
    }

    #[tokio::test]
    async fn all_empty_is_empty_success() {
        let sources = vec![
            fake("A", Behaviour::Return(vec![])),
            fake("B", Behaviour::Return(vec![])),
        ];
        let result = compare("widget", &sources, &CompareConfig::default())
            .await
            .expect("compare");
        assert!(result.results.is_empty());
    }

    #[tokio::test]
    async fn duplicate_keeps_cheapest_copy() {
        let sources = vec![
            fake("A", Behaviour::Return(vec![listing("A", "https://x.com/item/1/", 2000)])),
            fake("B", Behaviour::Return(vec![listing("B", "https://X.com/item/1", 1500)])),
        ];
        let result = compare("widget", &sources, &CompareConfig::default())
            .await
            .expect("compare");
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].source(), "B");
    }

    #[tokio::test]
    async fn equal_price_duplicate_keeps_earlier_source() {
        let sources = vec![
            fake("A", Behaviour::Return(vec![listing("A", "https://x.com/1", 1000)])),
            fake("B", Behaviour::Return(vec![listing("B", "https://x.com/1/", 1000)])),
        ];
        let result = compare("widget", &sources, &CompareConfig::default())
            .await
            .expect("compare");
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].source(), "A");
    }

    #[tokio::test]
    async fn relevance_filter_is_opt_in() {
        let relevant = listing("A", "https://a.com/1", 1000).with_title("Sony WH-1000XM5");
        let irrelevant = listing("A", "https://a.com/2", 500).with_title("Ear pads for headphones");
        let untitled = listing("A", "https://a.com/3", 700);
        let sources = vec![fake(
            "A",
            Behaviour::Return(vec![relevant, irrelevant, untitled]),
        )];

        let loose = compare("Sony WH-1000XM5", &sources, &CompareConfig::default())
            .await
            .expect("compare");
        assert_eq!(loose.results.len(), 3);

        let strict = CompareConfig {
            relevance_filter: true,
            ..Default::default()
        };
        let filtered = compare("Sony WH-1000XM5", &sources, &strict)
            .await
            .expect("compare");
        assert_eq!(urls(&filtered), ["https://a.com/3", "https://a.com/1"]);
    }

    #[tokio::test]
    async fn respects_max_results() {
        let listings: Vec<Listing> = (0..15)
            .map(|i| listing("A", &format!("https://a.com/{i}"), 100 + i))
            .collect();
        let sources = vec![fake("A", Behaviour::Return(listings))];

        let result = compare("widget", &sources, &CompareConfig::default())
            .await
            .expect("compare");
        assert_eq!(result.results.len(), 10);

        let config = CompareConfig {
            max_results: 4,
            ..Default::default()
        };
        let result = compare("widget", &sources, &config).await.expect("compare");
        assert_eq!(result.results.len(), 4);
    }

    #[tokio::test]
    async fn blank_product_name_rejected() {
        let err = compare("   ", &[], &CompareConfig::default()).await.unwrap_err();
        assert!(matches!(err, PriceError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn invalid_config_rejected() {
        let config = CompareConfig {
            max_results: 0,
            ..Default::default()
        };
        let err = compare("widget", &[], &config).await.unwrap_err();
        assert!(err.to_string().contains("max_results"));
    }

    #[tokio::test]
    async fn pre_cancelled_token_returns_cancelled() {
        let sources = vec![fake("A", Behaviour::Return(vec![listing("A", "https://a.com", 100)]))];
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = compare_with_cancel("widget", &sources, &CompareConfig::default(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, PriceError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_mid_flight_returns_nothing_partial() {
        let sources = vec![
            fake("Fast", Behaviour::Return(vec![listing("Fast", "https://fast.com", 100)])),
            fake(
                "Slow",
                Behaviour::Sleep(
                    Duration::from_secs(10),
                    vec![listing("Slow", "https://slow.com", 50)],
                ),
            ),
        ];
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let err = compare_with_cancel("widget", &sources, &CompareConfig::default(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, PriceError::Cancelled));
    }

    #[test]
    fn panic_message_extracts_str_and_string() {
        let s: Box<dyn Any + Send> = Box::new("static msg");
        assert_eq!(panic_message(s.as_ref()), "static msg");
        let s: Box<dyn Any + Send> = Box::new(String::from("owned msg"));
        assert_eq!(panic_message(s.as_ref()), "owned msg");
        let s: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(s.as_ref()), "unknown panic");
    }
}
