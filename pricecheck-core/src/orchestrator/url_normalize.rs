//! URL normalisation for listing deduplication.
//!
//! Canonicalises listing URLs so that the same offer reached through
//! cosmetically different URLs (capitalisation, trailing slashes, a bare
//! `?`) compares equal. The query string is kept verbatim because some
//! marketplaces put the distinguishing product id there.

use url::Url;

/// Normalise a URL for deduplication comparison.
///
/// 1. Parse into scheme, host (plus any non-default port), path and query.
/// 2. Strip trailing slashes from the path.
/// 3. Keep a non-empty query string verbatim; drop the fragment.
/// 4. Reassemble as `scheme://host path ?query` and lower-case everything.
///
/// If the input cannot be parsed, or has no host, the lower-cased input is
/// returned instead. Never fails.
///
/// # Examples
///
/// ```
/// use pricecheck_core::orchestrator::url_normalize::normalize_url;
///
/// assert_eq!(
///     normalize_url("https://X.com/item/1/"),
///     normalize_url("https://x.com/item/1"),
/// );
/// ```
pub fn normalize_url(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw) else {
        return raw.to_lowercase();
    };
    let Some(host) = parsed.host_str() else {
        return raw.to_lowercase();
    };

    let port = parsed.port().map(|p| format!(":{p}")).unwrap_or_default();
    let path = parsed.path().trim_end_matches('/');
    let query = parsed
        .query()
        .filter(|q| !q.is_empty())
        .map(|q| format!("?{q}"))
        .unwrap_or_default();

    format!("{}://{host}{port}{path}{query}", parsed.scheme()).to_lowercase()
}
