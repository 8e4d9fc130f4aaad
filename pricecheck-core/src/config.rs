//! Comparison and source configuration with sensible defaults.
//!
//! [`CompareConfig`] controls result capping, the per-source time budget
//! and relevance filtering. [`SourceCredentials`] carries the marketplace
//! credentials that decide which sources are available; it is built once
//! by the caller and injected into each source at construction.

use serde::{Deserialize, Serialize};

use crate::error::PriceError;

/// Default number of listings returned per comparison.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Configuration for a comparison run.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Maximum number of listings to return after deduplication and ranking.
    pub max_results: usize,
    /// Upper bound in seconds on a single source call. Sources enforce
    /// their own tighter HTTP timeouts; this only catches stragglers.
    pub source_timeout_seconds: u64,
    /// Drop titled listings that do not mention the extracted brand/model.
    pub relevance_filter: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            source_timeout_seconds: 20,
            relevance_filter: false,
        }
    }
}

impl CompareConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_results` must be greater than 0
    /// - `source_timeout_seconds` must be greater than 0
    pub fn validate(&self) -> Result<(), PriceError> {
        if self.max_results == 0 {
            return Err(PriceError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.source_timeout_seconds == 0 {
            return Err(PriceError::Config(
                "source_timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Marketplace credentials and availability flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceCredentials {
    /// eBay Finding API application id.
    pub ebay_app_id: Option<String>,
    /// SerpAPI key used for Google Shopping.
    pub serpapi_key: Option<String>,
    /// Force the mock marketplace on even when real sources are configured.
    pub mock_mode: bool,
}

impl SourceCredentials {
    pub fn ebay_available(&self) -> bool {
        is_present(self.ebay_app_id.as_deref())
    }

    pub fn serpapi_available(&self) -> bool {
        is_present(self.serpapi_key.as_deref())
    }

    pub fn any_real_source_available(&self) -> bool {
        self.ebay_available() || self.serpapi_available()
    }

    /// The mock marketplace fills in when nothing real is configured.
    pub fn mock_available(&self) -> bool {
        self.mock_mode || !self.any_real_source_available()
    }
}

fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}
