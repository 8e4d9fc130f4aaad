//! Comparison orchestrator: concurrent fan-out, dedup, ranking.
//!
//! This module fans out a normalised query to every available price
//! source concurrently, merges the listings in source order, deduplicates
//! them by normalised URL, and returns the cheapest, capped result set.

pub mod compare;
pub mod dedup;
pub mod ranking;
pub mod url_normalize;
