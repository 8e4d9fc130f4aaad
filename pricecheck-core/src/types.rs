//! Core types: listings, conditions, normalised queries, and the
//! inbound/outbound comparison shapes.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PriceError, Result};

/// Number of decimal places a listing total is rounded to.
const TOTAL_PRICE_SCALE: u32 = 2;

/// Physical condition of the item on offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Brand new, including "new other" and "new with defects".
    New,
    /// Pre-owned, open box, or for parts.
    Used,
    /// Certified or seller refurbished.
    Refurbished,
    /// The marketplace did not say.
    Unknown,
}

impl Condition {
    /// Returns the lower-case wire label of this condition.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Used => "used",
            Self::Refurbished => "refurbished",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One marketplace's offer for the queried product.
///
/// Listings are immutable. The only way to build one is [`Listing::new`],
/// which validates the inputs and computes `total_price` exactly once,
/// rounded half-up to two decimal places. Comparisons downstream use the
/// stored total and never re-round.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    shipping: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    total_price: Decimal,
    condition: Condition,
    url: String,
}

impl Listing {
    /// Build a validated listing.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::InvalidListing`] if `price <= 0`,
    /// `shipping < 0`, or `url` is empty.
    pub fn new(
        source: impl Into<String>,
        price: Decimal,
        shipping: Decimal,
        condition: Condition,
        url: impl Into<String>,
    ) -> Result<Self> {
        let url = url.into();
        if price <= Decimal::ZERO {
            return Err(PriceError::InvalidListing(format!(
                "price must be greater than 0, got {price}"
            )));
        }
        if shipping < Decimal::ZERO {
            return Err(PriceError::InvalidListing(format!(
                "shipping must not be negative, got {shipping}"
            )));
        }
        if url.trim().is_empty() {
            return Err(PriceError::InvalidListing("url must not be empty".into()));
        }

        let total_price = (price + shipping)
            .round_dp_with_strategy(TOTAL_PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);

        Ok(Self {
            source: source.into(),
            title: None,
            price,
            shipping,
            total_price,
            condition,
            url,
        })
    }

    /// Attach the marketplace's listing title. Blank titles are ignored.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        let trimmed = title.trim();
        self.title = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    /// Marketplace (and merchant, where known) offering the item.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Listing title as reported by the marketplace, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn shipping(&self) -> Decimal {
        self.shipping
    }

    /// `price + shipping`, rounded to two decimal places at construction.
    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    /// Purchase URL exactly as the marketplace returned it.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// A free-text product name reduced to a search string plus optional
/// brand and model hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedQuery {
    brand: Option<String>,
    model: Option<String>,
    query_text: String,
}

impl NormalizedQuery {
    pub(crate) fn new(brand: Option<String>, model: Option<String>, query_text: String) -> Self {
        Self {
            brand,
            model,
            query_text,
        }
    }

    /// Title-cased brand from the known-brand vocabulary, if one matched.
    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    /// Upper-cased model token, if one was found.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// The trimmed product name sent verbatim to every source.
    pub fn query_text(&self) -> &str {
        &self.query_text
    }
}

/// Inbound comparison request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRequest {
    /// Free-text product name to look up.
    pub product_name: String,
}

impl ComparisonRequest {
    /// Returns the trimmed product name.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::InvalidRequest`] if the name is empty after
    /// trimming.
    pub fn product_name(&self) -> Result<&str> {
        let trimmed = self.product_name.trim();
        if trimmed.is_empty() {
            return Err(PriceError::InvalidRequest(
                "productName must not be empty".into(),
            ));
        }
        Ok(trimmed)
    }
}

/// Outbound comparison response: the query that was sent to sources and
/// the cheapest listings, cheapest first.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub query: String,
    pub results: Vec<Listing>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("valid decimal literal")
    }

    #[test]
    fn total_price_rounded_once_at_construction() {
        let listing = Listing::new(
            "eBay",
            dec("99.999"),
            dec("5.001"),
            Condition::New,
            "https://x.com/item/1",
        )
        .expect("valid listing");
        assert_eq!(listing.total_price(), dec("105.00"));
        assert_eq!(listing.total_price().scale(), 2);
        // Inputs are stored unrounded.
        assert_eq!(listing.price(), dec("99.999"));
        assert_eq!(listing.shipping(), dec("5.001"));
    }

    #[test]
    fn total_price_rounds_half_up() {
        let listing = Listing::new(
            "eBay",
            dec("10.005"),
            Decimal::ZERO,
            Condition::Used,
            "https://x.com/a",
        )
        .expect("valid listing");
        assert_eq!(listing.total_price(), dec("10.01"));

        let listing = Listing::new(
            "eBay",
            dec("10.015"),
            Decimal::ZERO,
            Condition::Used,
            "https://x.com/b",
        )
        .expect("valid listing");
        assert_eq!(listing.total_price(), dec("10.02"));
    }

    #[test]
    fn zero_price_rejected() {
        let err = Listing::new("eBay", Decimal::ZERO, dec("1"), Condition::New, "https://x.com")
            .unwrap_err();
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn negative_price_rejected() {
        let result = Listing::new("eBay", dec("-3"), dec("1"), Condition::New, "https://x.com");
        assert!(result.is_err());
    }

    #[test]
    fn negative_shipping_rejected() {
        let err = Listing::new("eBay", dec("3"), dec("-1"), Condition::New, "https://x.com")
            .unwrap_err();
        assert!(err.to_string().contains("shipping"));
    }

    #[test]
    fn empty_url_rejected() {
        let err = Listing::new("eBay", dec("3"), dec("0"), Condition::New, "  ").unwrap_err();
        assert!(err.to_string().contains("url"));
    }

    #[test]
    fn with_title_trims_and_ignores_blank() {
        let base = Listing::new("eBay", dec("3"), dec("0"), Condition::New, "https://x.com")
            .expect("valid listing");
        assert_eq!(
            base.clone().with_title("  Sony WH-1000XM5 ").title(),
            Some("Sony WH-1000XM5")
        );
        assert_eq!(base.with_title("   ").title(), None);
    }

    #[test]
    fn listing_serializes_to_wire_shape() {
        let listing = Listing::new(
            "Google Shopping (Best Buy)",
            dec("299.99"),
            dec("5.00"),
            Condition::Refurbished,
            "https://shop.example/p?id=1",
        )
        .expect("valid listing");
        let json = serde_json::to_value(&listing).expect("serialize");
        assert_eq!(json["source"], "Google Shopping (Best Buy)");
        assert_eq!(json["price"], 299.99);
        assert_eq!(json["shipping"], 5.0);
        assert_eq!(json["totalPrice"], 304.99);
        assert_eq!(json["condition"], "refurbished");
        assert_eq!(json["url"], "https://shop.example/p?id=1");
        assert!(json.get("title").is_none());
    }

    #[test]
    fn condition_display_matches_wire_label() {
        assert_eq!(Condition::New.to_string(), "new");
        assert_eq!(Condition::Used.to_string(), "used");
        assert_eq!(Condition::Refurbished.to_string(), "refurbished");
        assert_eq!(Condition::Unknown.to_string(), "unknown");
    }

    #[test]
    fn request_rejects_blank_product_name() {
        let req: ComparisonRequest =
            serde_json::from_str(r#"{"productName": "   "}"#).expect("deserialize");
        assert!(req.product_name().is_err());
    }

    #[test]
    fn request_trims_product_name() {
        let req: ComparisonRequest =
            serde_json::from_str(r#"{"productName": "  Bose QC45 "}"#).expect("deserialize");
        assert_eq!(req.product_name().expect("valid"), "Bose QC45");
    }

    #[test]
    fn empty_result_serializes() {
        let result = ComparisonResult {
            query: "random gadget thing".into(),
            results: vec![],
        };
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["query"], "random gadget thing");
        assert_eq!(json["results"].as_array().map(Vec::len), Some(0));
    }
}
