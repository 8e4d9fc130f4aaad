//! eBay marketplace via the Finding API (`findItemsByKeywords`).
//!
//! The Finding API wraps every field in a single-element array, so the
//! parser walks `field[0]` at each level. Items that are missing a price
//! or URL, or that fail listing validation, are skipped.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::config::SourceCredentials;
use crate::error::PriceError;
use crate::http;
use crate::source::PriceSource;
use crate::types::{Condition, Listing};

use super::parse_decimal;

/// Production Finding API endpoint.
pub const FINDING_API_URL: &str = "https://svcs.ebay.com/services/search/FindingService/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const ENTRIES_PER_PAGE: &str = "20";

/// eBay Finding API integration.
pub struct EbaySource {
    app_id: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl EbaySource {
    pub const NAME: &'static str = "eBay";

    /// Create an eBay source from injected credentials.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Http`] if the HTTP client cannot be built.
    pub fn new(credentials: &SourceCredentials) -> Result<Self, PriceError> {
        Ok(Self {
            app_id: credentials
                .ebay_available()
                .then(|| credentials.ebay_app_id.clone())
                .flatten(),
            base_url: FINDING_API_URL.to_string(),
            client: http::build_client(REQUEST_TIMEOUT)?,
        })
    }

    /// Point the source at a different endpoint (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch(&self, app_id: &str, query: &str) -> Result<Vec<Listing>, PriceError> {
        let params = [
            ("OPERATION-NAME", "findItemsByKeywords"),
            ("SERVICE-VERSION", "1.0.0"),
            ("SECURITY-APPNAME", app_id),
            ("RESPONSE-DATA-FORMAT", "JSON"),
            ("REST-PAYLOAD", ""),
            ("keywords", query),
            ("paginationInput.entriesPerPage", ENTRIES_PER_PAGE),
            ("sortOrder", "PricePlusShippingLowest"),
        ];
        let data = http::get_json(&self.client, Self::NAME, &self.base_url, &params).await?;
        parse_ebay_response(&data)
    }
}

#[async_trait]
impl PriceSource for EbaySource {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_available(&self) -> bool {
        self.app_id.is_some()
    }

    async fn search(&self, query: &str) -> Vec<Listing> {
        let Some(app_id) = self.app_id.as_deref() else {
            return Vec::new();
        };
        tracing::trace!(query, "eBay search");

        match self.fetch(app_id, query).await {
            Ok(listings) => listings,
            Err(err) => {
                tracing::warn!(source = Self::NAME, error = %err, "source search failed");
                Vec::new()
            }
        }
    }
}

/// Map an eBay condition id to a [`Condition`].
pub fn condition_from_id(id: &str) -> Condition {
    match id {
        "1000" | "1500" | "1750" => Condition::New,
        "2000" | "2010" | "2020" | "2030" | "2500" => Condition::Refurbished,
        "2750" | "3000" | "4000" | "5000" | "6000" | "7000" => Condition::Used,
        _ => Condition::Unknown,
    }
}

/// `value[key][0]`, the Finding API's single-element-array convention.
fn first<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key)?.get(0)
}

/// Parse a Finding API JSON response into listings.
///
/// A response without `findItemsByKeywordsResponse` is a parse error; a
/// response with no items is an empty result.
pub(crate) fn parse_ebay_response(data: &Value) -> Result<Vec<Listing>, PriceError> {
    let response = first(data, "findItemsByKeywordsResponse").ok_or_else(|| {
        PriceError::Parse("eBay response missing findItemsByKeywordsResponse".into())
    })?;

    let items = first(response, "searchResult")
        .and_then(|result| result.get("item"))
        .and_then(Value::as_array);

    Ok(items
        .map(|items| items.iter().filter_map(parse_ebay_item).collect())
        .unwrap_or_default())
}

fn parse_ebay_item(item: &Value) -> Option<Listing> {
    let price = first(item, "sellingStatus")
        .and_then(|status| first(status, "currentPrice"))
        .and_then(|price| price.get("__value__"))
        .and_then(parse_decimal)?;

    // No shippingServiceCost means free or unspecified shipping; a cost
    // that is present but unreadable drops the item.
    let shipping = match first(item, "shippingInfo")
        .and_then(|info| first(info, "shippingServiceCost"))
        .and_then(|cost| cost.get("__value__"))
    {
        Some(value) => parse_decimal(value)?,
        None => Decimal::ZERO,
    };

    let condition = first(item, "condition")
        .and_then(|c| first(c, "conditionId"))
        .and_then(Value::as_str)
        .map_or(Condition::Unknown, condition_from_id);

    let url = first(item, "viewItemURL").and_then(Value::as_str)?;

    let listing = Listing::new(EbaySource::NAME, price, shipping, condition, url).ok()?;
    Some(match first(item, "title").and_then(Value::as_str) {
        Some(title) => listing.with_title(title),
        None => listing,
    })
}
