//! Shared HTTP client construction for marketplace API requests.

use std::time::Duration;

use crate::error::PriceError;

/// User-Agent sent to every marketplace API.
pub const USER_AGENT: &str = concat!("pricecheck/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] for a marketplace API.
///
/// The client has:
/// - the per-source request timeout
/// - a fixed pricecheck User-Agent
/// - gzip decompression and a bounded redirect policy
///
/// # Errors
///
/// Returns [`PriceError::Http`] if the client cannot be constructed.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, PriceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| PriceError::Http(format!("failed to build HTTP client: {e}")))
}

/// Send a GET request and decode the JSON body, mapping every failure to
/// a [`PriceError`] tagged with `source`. Error text never includes the
/// request URL.
pub async fn get_json(
    client: &reqwest::Client,
    source: &str,
    url: &str,
    params: &[(&str, &str)],
) -> Result<serde_json::Value, PriceError> {
    // Request URLs carry credentials in the query string, so every
    // reqwest error is stripped of its URL before formatting.
    let response = client
        .get(url)
        .query(params)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                PriceError::Timeout(format!("{source} request timed out"))
            } else {
                PriceError::Http(format!("{source} request failed: {}", e.without_url()))
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(PriceError::Http(format!("{source} returned {status}")));
    }

    let body = response.text().await.map_err(|e| {
        PriceError::Http(format!("{source} response read failed: {}", e.without_url()))
    })?;

    tracing::trace!(source, bytes = body.len(), "response received");

    serde_json::from_str(&body)
        .map_err(|e| PriceError::Parse(format!("{source} returned invalid JSON: {e}")))
}
