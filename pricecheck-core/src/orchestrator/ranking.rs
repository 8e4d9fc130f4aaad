//! Price ranking: cheapest total first, capped.
//!
//! The only ranking signal is `total_price`; relevance, condition and
//! source are not considered. Ties keep their input order.

use crate::types::Listing;

/// Stable-sort listings by total price, ascending.
pub fn sort_by_total_price(listings: &mut [Listing]) {
    // `sort_by_key` is a stable sort.
    listings.sort_by_key(Listing::total_price);
}

/// Rank listings cheapest-first and keep at most `max_results`.
pub fn rank(mut listings: Vec<Listing>, max_results: usize) -> Vec<Listing> {
    sort_by_total_price(&mut listings);
    listings.truncate(max_results);
    listings
}
