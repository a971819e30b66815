//! # deepsift
//!
//! Web search, article extraction, and staged LLM distillation.
//!
//! deepsift discovers pages relevant to a query, extracts readable
//! article text, and distills the results into an answer report via
//! staged language-model summarization. Everything persists to numbered
//! flat-file session directories — no database, no external services
//! beyond the search engine itself.
//!
//! ## Design
//!
//! - SERP discovery renders Bing in a headless browser (results are
//!   script-populated) and classifies entries against a domain blocklist
//! - Usable URLs take a concurrent lightweight HTTP fetch with
//!   readability-style extraction; blocked URLs degrade to a sequential
//!   rendered-browser fallback
//! - Oversized documents are chunked before summarization; per-document
//!   summaries are folded into one file each, then synthesized into a
//!   single report
//! - Model access is a single-flight slot; the deep-search stages poll a
//!   cooperative cancellation token between items, never mid-generation
//! - Partial results beat total failure: per-item errors are logged and
//!   skipped, only missing session directories are hard errors
//!
//! ## Security
//!
//! - No API keys or secrets to leak
//! - No network listeners — this is a library, not a server
//! - Search queries are logged only at trace level

pub mod answer;
pub mod browser;
pub mod chunk;
pub mod config;
pub mod content;
pub mod discovery;
pub mod domains;
pub mod error;
pub mod fetch;
pub mod http;
pub mod model;
pub mod store;
pub mod summarize;
pub mod types;

pub use answer::{answer_from_summaries, AnswerRun};
pub use config::{GenerationParams, SiftConfig};
pub use discovery::Discovered;
pub use error::{Result, SiftError};
pub use model::{ModelSlot, TextGenerator};
pub use store::SessionStore;
pub use summarize::{summarize_attempt, SummaryRun};
pub use types::{Classification, ChatMessage, ConversationHistory, Document, ResultItem, Role};

use content::MIN_WORDS_ARTICLE;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Outcome of one web search session.
#[derive(Debug, Clone)]
pub struct SearchRun {
    /// The allocated attempt id.
    pub attempt_id: u32,
    /// The attempt directory documents were saved into.
    pub attempt_dir: PathBuf,
    /// Usable results discovered (capped at 7).
    pub usable_found: usize,
    /// Blocked results discovered.
    pub blocked_found: usize,
    /// Documents saved, across both fetch strategies.
    pub documents_saved: usize,
}

/// Outcome of a deep-search pass over the latest attempt.
#[derive(Debug, Clone)]
pub struct DeepSearchRun {
    /// The summarization stage outcome.
    pub summary: SummaryRun,
    /// The synthesis stage outcome. `None` when summarization aborted
    /// or produced nothing to synthesize.
    pub answers: Option<AnswerRun>,
}

/// Run a web search session: discover, fetch, extract, persist.
///
/// Allocates a new attempt directory, renders the SERP, writes the
/// result index, fetches usable results concurrently, then walks the
/// blocked results sequentially through the rendered-browser fallback.
/// Documents are saved with 1-based save-order indices; items that fail
/// to fetch or extract are skipped without consuming an index.
///
/// # Errors
///
/// Returns an error for invalid configuration, an unrenderable SERP, or
/// a session directory that cannot be created. Per-URL failures are
/// logged and skipped.
pub async fn run_web_search(query: &str, config: &SiftConfig) -> Result<SearchRun> {
    config.validate()?;
    let store = SessionStore::new(config);

    let (attempt_id, attempt_dir) = store.create_attempt().await?;
    tracing::trace!(query, "query text");
    tracing::info!(attempt_id, "searching");

    let discovered = discovery::discover(query, config).await?;
    store
        .write_result_index(&attempt_dir, &discovered.usable)
        .await?;

    let saved = capture_documents(&store, &attempt_dir, &discovered, config).await?;

    tracing::info!(saved, dir = %attempt_dir.display(), "search session complete");
    Ok(SearchRun {
        attempt_id,
        attempt_dir,
        usable_found: discovered.usable.len(),
        blocked_found: discovered.blocked.len(),
        documents_saved: saved,
    })
}

/// Fetch and persist every discovered result into the attempt directory.
///
/// Usable results go through the concurrent lightweight fetch first;
/// blocked results then take the sequential rendered-browser fallback.
/// Save indices are 1-based and contiguous in save order across both
/// strategies — a result that yields no content, or whose file cannot
/// be written, does not consume an index.
async fn capture_documents(
    store: &SessionStore,
    attempt_dir: &Path,
    discovered: &Discovered,
    config: &SiftConfig,
) -> Result<usize> {
    let mut saved = 0usize;

    let client = http::build_client(config)?;
    let contents = fetch::fetch_all(&client, &discovered.usable, MIN_WORDS_ARTICLE).await;
    for (item, content) in discovered.usable.iter().zip(contents) {
        match content {
            Some(text) => match store.save_document(attempt_dir, saved + 1, item, &text).await {
                Ok(_) => saved += 1,
                Err(e) => tracing::error!(title = %item.title, error = %e, "document save failed"),
            },
            None => tracing::warn!(title = %item.title, "skipped: insufficient or unreadable content"),
        }
    }

    if !discovered.blocked.is_empty() {
        tracing::info!(count = discovered.blocked.len(), "processing blocked-domain results");
        for item in &discovered.blocked {
            tracing::info!(title = %item.title, "trying blocked domain via rendered fallback");
            match browser::fetch_rendered_text(&item.url, config).await {
                Some(text) => {
                    match store.save_document(attempt_dir, saved + 1, item, &text).await {
                        Ok(_) => saved += 1,
                        Err(e) => {
                            tracing::error!(title = %item.title, error = %e, "document save failed")
                        }
                    }
                }
                None => tracing::warn!(title = %item.title, "skipped blocked-domain result"),
            }
        }
    }

    Ok(saved)
}

/// Run the deep-search pipeline over the latest search attempt.
///
/// Two stages: summarize every saved document, then synthesize answers
/// from the summaries. The cancellation token is observed between
/// stages and between items inside each stage; an abort leaves all
/// already-written files intact and returns the partial outcome rather
/// than an error. On completion with a non-empty report, a condensed
/// note is appended to `history`.
///
/// # Errors
///
/// Returns [`SiftError::NotFound`] if the search base directory or the
/// latest attempt is missing (and, for the synthesis stage, if the
/// summary directory vanished underneath it).
pub async fn deep_search(
    model: &ModelSlot,
    config: &SiftConfig,
    cancel: &CancellationToken,
    history: Option<&mut ConversationHistory>,
) -> Result<DeepSearchRun> {
    config.validate()?;
    let store = SessionStore::new(config);

    let summary = summarize_attempt(model, &store, cancel).await?;
    if summary.aborted {
        tracing::info!("deep search aborted during summarization");
        return Ok(DeepSearchRun {
            summary,
            answers: None,
        });
    }
    if summary.documents_summarized == 0 {
        tracing::warn!("no summaries generated, skipping answer synthesis");
        return Ok(DeepSearchRun {
            summary,
            answers: None,
        });
    }

    let answers = answer_from_summaries(model, &store, cancel).await?;
    if !answers.aborted && !answers.report.is_empty() {
        if let Some(history) = history {
            history.push_deep_search_note(&answers.report);
            tracing::info!("deep search findings noted in conversation context");
        }
    }

    Ok(DeepSearchRun {
        summary,
        answers: Some(answers),
    })
}
