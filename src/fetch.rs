//! Primary fetcher — concurrent lightweight HTTP fetch plus extraction.
//!
//! One GET per item, fanned out concurrently and joined at a single
//! barrier: the caller receives all outcomes together, in input order,
//! only once every request has completed or failed. Non-200 responses,
//! transport errors, and extraction below the word threshold all map to
//! `None`; the batch never fails as a whole.

use crate::content::extract_article;
use crate::types::ResultItem;

/// Fetch and extract every item in the batch concurrently.
///
/// Output order matches input order; `results[i]` corresponds to
/// `items[i]`. `min_words` is the extraction quality gate (normally
/// [`crate::content::MIN_WORDS_ARTICLE`]).
pub async fn fetch_all(
    client: &reqwest::Client,
    items: &[ResultItem],
    min_words: usize,
) -> Vec<Option<String>> {
    let futures: Vec<_> = items
        .iter()
        .map(|item| fetch_one(client, &item.url, min_words))
        .collect();

    futures::future::join_all(futures).await
}

/// Fetch a single page and extract its article text.
///
/// Any failure — request error, non-200 status, unreadable body,
/// content below the word threshold — is logged and returned as `None`.
pub async fn fetch_one(
    client: &reqwest::Client,
    url: &str,
    min_words: usize,
) -> Option<String> {
    let response = match client.get(url).send().await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::warn!(url, error = %e, "fetch failed");
            return None;
        }
    };

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(url, %status, "non-success status");
        return None;
    }

    let html = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(url, error = %e, "response body read failed");
            return None;
        }
    };

    let content = extract_article(&html, min_words);
    if content.is_none() {
        tracing::debug!(url, "insufficient or unreadable content");
    }
    content
}
