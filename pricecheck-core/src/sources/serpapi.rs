//! Google Shopping results via SerpAPI.
//!
//! SerpAPI returns a `shopping_results` array. Prices come either as a
//! numeric `extracted_price` or as a display string like `"$1,299.99"`;
//! shipping is only available as free text in `delivery`, and condition
//! has to be inferred from the title.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::config::SourceCredentials;
use crate::error::PriceError;
use crate::http;
use crate::source::PriceSource;
use crate::types::{Condition, Listing};

use super::parse_decimal;

/// Production SerpAPI search endpoint.
pub const SERPAPI_URL: &str = "https://serpapi.com/search";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

static SHIPPING_AMOUNT: OnceLock<Option<Regex>> = OnceLock::new();

/// Google Shopping integration through SerpAPI.
pub struct SerpApiSource {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl SerpApiSource {
    pub const NAME: &'static str = "Google Shopping";

    /// Create a Google Shopping source from injected credentials.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Http`] if the HTTP client cannot be built.
    pub fn new(credentials: &SourceCredentials) -> Result<Self, PriceError> {
        Ok(Self {
            api_key: credentials
                .serpapi_available()
                .then(|| credentials.serpapi_key.clone())
                .flatten(),
            base_url: SERPAPI_URL.to_string(),
            client: http::build_client(REQUEST_TIMEOUT)?,
        })
    }

    /// Point the source at a different endpoint (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch(&self, api_key: &str, query: &str) -> Result<Vec<Listing>, PriceError> {
        let params = [
            ("engine", "google_shopping"),
            ("q", query),
            ("api_key", api_key),
            ("num", "20"),
            ("gl", "us"),
            ("hl", "en"),
        ];
        let data = http::get_json(&self.client, Self::NAME, &self.base_url, &params).await?;
        Ok(parse_serpapi_response(&data))
    }
}

#[async_trait]
impl PriceSource for SerpApiSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, query: &str) -> Vec<Listing> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Vec::new();
        };
        tracing::trace!(query, "Google Shopping search");

        match self.fetch(api_key, query).await {
            Ok(listings) => listings,
            Err(err) => {
                tracing::warn!(source = Self::NAME, error = %err, "source search failed");
                Vec::new()
            }
        }
    }
}

/// Parse a SerpAPI Google Shopping response. Missing `shopping_results`
/// means no results.
pub(crate) fn parse_serpapi_response(data: &Value) -> Vec<Listing> {
    data.get("shopping_results")
        .and_then(Value::as_array)
        .map(|results| results.iter().filter_map(parse_shopping_result).collect())
        .unwrap_or_default()
}

fn parse_shopping_result(result: &Value) -> Option<Listing> {
    let price = match result.get("extracted_price").filter(|v| !v.is_null()) {
        Some(value) => parse_decimal(value)?,
        None => extract_price(result.get("price").and_then(Value::as_str)?)?,
    };

    let shipping = result
        .get("delivery")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
        .map_or(Decimal::ZERO, extract_shipping);

    let title = result.get("title").and_then(Value::as_str).unwrap_or("");
    let condition = infer_condition(title);

    let url = result.get("product_link").and_then(Value::as_str)?;

    let merchant = result
        .get("source")
        .and_then(Value::as_str)
        .unwrap_or("Unknown");

    Listing::new(
        format!("{} ({merchant})", SerpApiSource::NAME),
        price,
        shipping,
        condition,
        url,
    )
    .ok()
    .map(|listing| listing.with_title(title))
}

/// Extract a numeric price from a display string like `"$1,299.99"`.
pub fn extract_price(price: &str) -> Option<Decimal> {
    let cleaned: String = price
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Extract a shipping cost from free-text delivery info.
///
/// Anything mentioning "free" is zero; otherwise the first number found,
/// falling back to zero.
pub fn extract_shipping(delivery: &str) -> Decimal {
    if delivery.to_lowercase().contains("free") {
        return Decimal::ZERO;
    }

    let amount = SHIPPING_AMOUNT.get_or_init(|| Regex::new(r"\$?([\d.]+)").ok());
    amount
        .as_ref()
        .and_then(|re| re.captures(delivery))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(Decimal::ZERO)
}

/// Infer an item's condition from keywords in its title. Google Shopping
/// lists mostly new stock, so that is the default.
pub fn infer_condition(title: &str) -> Condition {
    let title = title.to_lowercase();
    let has_any = |words: &[&str]| words.iter().any(|w| title.contains(w));

    if has_any(&["refurbished", "renewed", "certified"]) {
        Condition::Refurbished
    } else if has_any(&["used", "pre-owned", "preowned", "open box", "open-box"]) {
        Condition::Used
    } else {
        Condition::New
    }
}
