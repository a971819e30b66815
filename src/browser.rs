//! Headless browser rendering for script-populated pages.
//!
//! Two callers: SERP discovery (results are injected by script, so a
//! plain GET sees an empty shell) and the fallback fetcher for blocked
//! domains. Rendering is resource-heavy, so each call launches one
//! isolated browser, uses it for a single page, and tears it down —
//! callers are expected to render strictly sequentially.

use crate::config::SiftConfig;
use crate::error::{Result, SiftError};
use crate::http::DESKTOP_UA;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use scraper::{Html, Selector};
use std::time::Duration;

/// Word floor below which rendered fallback content is discarded.
const FALLBACK_MIN_WORDS: usize = 5;

/// Rendered fallback content is truncated to this many words.
const FALLBACK_MAX_WORDS: usize = 200;

/// How a page render should wait for content to appear.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Navigation timeout.
    pub nav_timeout: Duration,
    /// Fixed settle period after navigation for script-driven content.
    pub settle: Duration,
    /// Optional CSS selector to poll for, with its own timeout. The
    /// render fails if the selector never appears — a results page
    /// without its result container is a bot wall, not content.
    pub wait_selector: Option<(String, Duration)>,
}

impl RenderOptions {
    /// Options for the blocked-domain fallback fetch: no selector wait,
    /// timeouts from config.
    pub fn fallback(config: &SiftConfig) -> Self {
        Self {
            nav_timeout: Duration::from_secs(config.nav_timeout_seconds),
            settle: Duration::from_millis(config.settle_ms),
            wait_selector: None,
        }
    }

    /// Options for SERP rendering: wait for `selector` to be populated.
    pub fn serp(config: &SiftConfig, selector: &str) -> Self {
        Self {
            nav_timeout: Duration::from_secs(config.nav_timeout_seconds),
            settle: Duration::from_millis(config.settle_ms),
            wait_selector: Some((
                selector.to_owned(),
                Duration::from_secs(config.selector_timeout_seconds),
            )),
        }
    }
}

/// Render a page in an isolated headless browser and return its HTML.
///
/// Launches a browser, navigates with a timeout, optionally polls for a
/// selector, waits the settle period, and captures the final DOM. The
/// browser is always torn down before returning.
///
/// # Errors
///
/// Returns [`SiftError::Render`] if the browser cannot be launched, the
/// navigation times out, the awaited selector never appears, or the
/// final content cannot be captured.
pub async fn render_page(url: &str, opts: &RenderOptions) -> Result<String> {
    tracing::debug!(url, "launching headless browser");

    let config = BrowserConfig::builder()
        .viewport(Some(Viewport {
            width: 1200,
            height: 800,
            device_scale_factor: Some(1.0),
            ..Default::default()
        }))
        .arg(format!("--user-agent={DESKTOP_UA}"))
        .build()
        .map_err(|e| SiftError::Render(format!("browser config error: {e}")))?;

    let (mut browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| SiftError::Render(format!("failed to launch browser: {e}")))?;

    // The handler must be polled for the browser connection to make progress.
    let handle = tokio::spawn(async move { while handler.next().await.is_some() {} });

    let outcome = render_on(&browser, url, opts).await;

    browser.close().await.ok();
    handle.abort();

    outcome
}

/// Drive a single page through navigation, waits, and capture.
async fn render_on(browser: &Browser, url: &str, opts: &RenderOptions) -> Result<String> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| SiftError::Render(format!("failed to create page: {e}")))?;

    page.set_user_agent(DESKTOP_UA)
        .await
        .map_err(|e| SiftError::Render(format!("failed to set user agent: {e}")))?;

    tokio::time::timeout(opts.nav_timeout, page.goto(url))
        .await
        .map_err(|_| SiftError::Render(format!("navigation to {url} timed out")))?
        .map_err(|e| SiftError::Render(format!("navigation failed: {e}")))?;

    if let Some((selector, timeout)) = &opts.wait_selector {
        if !wait_for_selector(&page, selector, *timeout).await {
            return Err(SiftError::Render(format!(
                "selector '{selector}' did not appear within {}s",
                timeout.as_secs()
            )));
        }
    }

    tokio::time::sleep(opts.settle).await;

    page.content()
        .await
        .map_err(|e| SiftError::Render(format!("failed to capture page content: {e}")))
}

/// Poll until `selector` matches an element or the timeout elapses.
/// Returns whether the selector appeared.
async fn wait_for_selector(page: &chromiumoxide::Page, selector: &str, timeout: Duration) -> bool {
    let expr = format!(
        "document.querySelector({}) !== null",
        serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".into())
    );
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        match page.evaluate(expr.as_str()).await {
            Ok(result) => {
                if result.into_value::<bool>().unwrap_or(false) {
                    return true;
                }
            }
            Err(e) => {
                tracing::trace!(selector, error = %e, "selector poll failed");
            }
        }
        if tokio::time::Instant::now() >= deadline {
            tracing::warn!(selector, "selector did not appear before timeout");
            return false;
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}

/// Fetch a blocked-domain URL through the rendered-browser fallback.
///
/// Best-effort exception path: renders the page, scrapes all visible
/// `<body>` text, and keeps the first 200 words. Returns `None` when
/// fewer than 5 words are recovered or any stage fails.
pub async fn fetch_rendered_text(url: &str, config: &SiftConfig) -> Option<String> {
    let opts = RenderOptions::fallback(config);
    let html = match render_page(url, &opts).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!(url, error = %e, "fallback render failed");
            return None;
        }
    };

    let text = visible_body_text(&html);
    if text.is_none() {
        tracing::debug!(url, "fallback render recovered too few words");
    }
    text
}

/// All visible `<body>` text, whitespace-joined and truncated to the
/// first 200 words. `None` below the 5-word floor.
pub fn visible_body_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("body").ok()?;
    let body = document.select(&selector).next()?;

    let text: String = body.text().collect::<Vec<_>>().join(" ");
    let words: Vec<&str> = text.split_whitespace().collect();

    if words.len() < FALLBACK_MIN_WORDS {
        return None;
    }

    let keep = words.len().min(FALLBACK_MAX_WORDS);
    Some(words[..keep].join(" "))
}
