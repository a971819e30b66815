//! Result discovery — renders the Bing SERP and classifies entries.
//!
//! Bing populates its result list with script, so the SERP is rendered
//! in the headless browser rather than fetched directly. Parsed entries
//! are classified into usable and blocked sets with two caps: at most 7
//! usable results, scanning at most 15 entries overall. A single attempt
//! per call — page-load failures are not retried.

use crate::browser::{render_page, RenderOptions};
use crate::config::SiftConfig;
use crate::domains;
use crate::error::{Result, SiftError};
use crate::types::{Classification, ResultItem};
use scraper::{Html, Selector};
use url::Url;

/// Usable results are capped here; scanning stops once reached.
pub const USABLE_CAP: usize = 7;

/// At most this many well-formed entries are scanned per discovery.
pub const SCAN_CAP: usize = 15;

/// CSS selector for organic result containers on the Bing SERP.
const RESULT_SELECTOR: &str = "li.b_algo";

/// Usable and blocked results from one discovery pass, in page order.
#[derive(Debug, Clone, Default)]
pub struct Discovered {
    pub usable: Vec<ResultItem>,
    pub blocked: Vec<ResultItem>,
}

/// Render the SERP for `query` and return classified results.
///
/// # Errors
///
/// Returns [`SiftError::Render`] if the SERP cannot be rendered or its
/// result container never appears (a bot wall), or [`SiftError::Parse`]
/// if the result selectors are invalid.
pub async fn discover(query: &str, config: &SiftConfig) -> Result<Discovered> {
    let serp_url = Url::parse_with_params("https://www.bing.com/search", &[("q", query)])
        .map_err(|e| SiftError::Parse(format!("invalid query url: {e}")))?;

    tracing::trace!(query, "query text");
    tracing::info!("rendering search results page");

    let opts = RenderOptions::serp(config, RESULT_SELECTOR);
    let html = render_page(serp_url.as_str(), &opts).await?;

    let discovered = parse_serp(&html)?;
    tracing::info!(
        usable = discovered.usable.len(),
        blocked = discovered.blocked.len(),
        "discovery complete"
    );
    Ok(discovered)
}

/// Parse a rendered SERP into classified results.
///
/// Extracted as a separate function for testability with mock HTML.
/// Entries missing a title or href are skipped without consuming the
/// scan cap; scanning stops at 7 usable or 15 scanned entries,
/// whichever comes first.
pub fn parse_serp(html: &str) -> Result<Discovered> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(RESULT_SELECTOR)
        .map_err(|e| SiftError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse("h2")
        .map_err(|e| SiftError::Parse(format!("invalid title selector: {e:?}")))?;
    let link_sel = Selector::parse("a")
        .map_err(|e| SiftError::Parse(format!("invalid link selector: {e:?}")))?;

    let mut discovered = Discovered::default();
    let mut scanned = 0usize;

    for element in document.select(&result_sel) {
        if scanned >= SCAN_CAP {
            break;
        }

        let title_el = match element.select(&title_sel).next() {
            Some(el) => el,
            None => continue,
        };

        let title = title_el.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let url = element
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string);

        let url = match url {
            Some(u) if u.starts_with("http://") || u.starts_with("https://") => u,
            _ => continue,
        };

        scanned += 1;

        let classification = domains::classify(&url);
        let item = ResultItem {
            title,
            url,
            classification,
        };

        match classification {
            Classification::Blocked => discovered.blocked.push(item),
            Classification::Usable => {
                discovered.usable.push(item);
                if discovered.usable.len() >= USABLE_CAP {
                    tracing::debug!(scanned, "usable cap reached");
                    break;
                }
            }
        }
    }

    if discovered.usable.len() < USABLE_CAP {
        tracing::debug!(
            usable = discovered.usable.len(),
            scanned,
            "fewer usable results than cap"
        );
    }

    discovered.usable.truncate(USABLE_CAP);
    Ok(discovered)
}
