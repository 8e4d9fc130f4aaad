//! Deterministic mock marketplace for running without API credentials.
//!
//! Results are generated from an RNG seeded with a hash of the query, so
//! the same query always produces the same listings.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use crate::config::SourceCredentials;
use crate::source::PriceSource;
use crate::types::{Condition, Listing};

/// Simulated marketplaces and their item URL prefixes.
const MOCK_MARKETPLACES: &[(&str, &str)] = &[
    ("eBay", "https://www.ebay.com/itm/"),
    ("Amazon", "https://www.amazon.com/dp/"),
    ("Best Buy", "https://www.bestbuy.com/site/"),
    ("Walmart", "https://www.walmart.com/ip/"),
    ("Target", "https://www.target.com/p/"),
    ("B&H Photo", "https://www.bhphotovideo.com/c/product/"),
    ("Newegg", "https://www.newegg.com/p/"),
];

/// Weighted towards new stock: 3 new, 2 used, 1 refurbished.
const MOCK_CONDITIONS: &[Condition] = &[
    Condition::New,
    Condition::New,
    Condition::New,
    Condition::Used,
    Condition::Used,
    Condition::Refurbished,
];

const FREE_SHIPPING_CHANCE: f64 = 0.4;

/// Mock marketplace producing plausible, reproducible listings.
pub struct MockSource {
    available: bool,
}

impl MockSource {
    pub const NAME: &'static str = "Mock";

    /// Available when mock mode is forced or no real source has credentials.
    pub fn new(credentials: &SourceCredentials) -> Self {
        Self {
            available: credentials.mock_available(),
        }
    }

    fn generate(query: &str) -> Vec<Listing> {
        let mut rng = StdRng::seed_from_u64(query_seed(query));

        let count = rng.gen_range(6..=8);
        let base_price = 100.0 + query.len() as f64 * 10.0 + rng.gen_range(-20.0..50.0);

        (0..count)
            .filter_map(|_| {
                let (marketplace, base_url) = *MOCK_MARKETPLACES.choose(&mut rng)?;

                let mut price = round_cents(base_price * rng.gen_range(0.7..1.5));
                let shipping = if rng.gen_bool(FREE_SHIPPING_CHANCE) {
                    0.0
                } else {
                    round_cents(rng.gen_range(3.99..14.99))
                };

                let condition = *MOCK_CONDITIONS.choose(&mut rng)?;
                match condition {
                    Condition::Used => price = round_cents(price * 0.7),
                    Condition::Refurbished => price = round_cents(price * 0.8),
                    Condition::New | Condition::Unknown => {}
                }

                let item_id: u32 = rng.gen_range(100_000_000..=999_999_999);

                Listing::new(
                    format!("{marketplace} (Mock)"),
                    to_decimal(price)?,
                    to_decimal(shipping)?,
                    condition,
                    format!("{base_url}{item_id}"),
                )
                .ok()
                .map(|listing| listing.with_title(format!("{query} ({condition})")))
            })
            .collect()
    }
}

#[async_trait]
impl PriceSource for MockSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn search(&self, query: &str) -> Vec<Listing> {
        if !self.available {
            return Vec::new();
        }
        let listings = Self::generate(query);
        tracing::trace!(query, count = listings.len(), "mock listings generated");
        listings
    }
}

/// Stable seed: the first eight bytes of the query's SHA-256 digest.
fn query_seed(query: &str) -> u64 {
    let digest = Sha256::digest(query.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_f64_retain(value).map(|d| d.round_dp(2))
}
