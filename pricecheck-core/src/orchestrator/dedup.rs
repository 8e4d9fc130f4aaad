//! Listing deduplication by normalised URL.
//!
//! Collapses listings that point at the same offer, keeping the first
//! occurrence of each normalised URL and preserving input order. Feed it
//! price-sorted input and "first" means "cheapest".

use std::collections::HashSet;

use crate::types::Listing;

use super::url_normalize::normalize_url;

/// Deduplicate listings by normalised URL, keeping the first occurrence.
///
/// The kept listings retain their original, un-normalised URLs.
pub fn dedupe(listings: Vec<Listing>) -> Vec<Listing> {
    let mut seen: HashSet<String> = HashSet::with_capacity(listings.len());
    listings
        .into_iter()
        .filter(|listing| seen.insert(normalize_url(listing.url())))
        .collect()
}
