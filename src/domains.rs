//! Domain classification — decides the fetch strategy for a URL.
//!
//! Social networks, paywalled news aggregators, video platforms, wikis,
//! and marketplaces either block plain HTTP scrapers or bury their text
//! behind scripts. URLs matching the blocklist take the rendered-browser
//! fallback path instead of the lightweight fetch.

use crate::types::Classification;

/// Domain substrings that route a URL to the fallback fetcher.
///
/// `amazon.` is deliberately TLD-agnostic.
const BLOCKED_DOMAINS: &[&str] = &[
    "facebook.com",
    "x.com",
    "instagram.com",
    "linkedin.com",
    "youtube.com",
    "wikipedia.org",
    "amazon.",
    "reddit.com",
    "tiktok.com",
    "news.google.com",
];

/// Classify a URL as usable or blocked.
///
/// Blocked iff the URL does not start with an http(s) scheme, or contains
/// any blocklisted domain substring. Pure and total — never fails.
pub fn classify(url: &str) -> Classification {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Classification::Blocked;
    }
    if BLOCKED_DOMAINS.iter().any(|domain| url.contains(domain)) {
        return Classification::Blocked;
    }
    Classification::Usable
}
