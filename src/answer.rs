//! Answer synthesizer — distills per-document summaries into a report.
//!
//! Walks the most recent summary directory, asks the model a fixed
//! three-question analysis per summary, and concatenates the labeled
//! answer blocks into one report. The report is persisted inside the
//! summary directory (overwriting any prior report) unless no blocks
//! were produced at all — the caller treats an empty report as
//! "nothing to report", not an error.

use crate::error::Result;
use crate::model::ModelSlot;
use crate::store::{SessionStore, ANSWERS_FILE, SUMMARY_SUFFIX};
use tokio_util::sync::CancellationToken;

/// Generation cap for one answer block.
pub const ANSWER_MAX_TOKENS: usize = 350;

/// Separator line under each answer block.
const BLOCK_RULE: &str = "------------------------------------------------------------";

/// Outcome of an answer-synthesis pass.
#[derive(Debug, Clone)]
pub struct AnswerRun {
    /// The concatenated report. Empty when no summaries yielded answers.
    pub report: String,
    /// Summary files that produced an answer block.
    pub answered: usize,
    /// True when the pass stopped at a cancellation poll point.
    pub aborted: bool,
}

/// Generate answers from every summary in the latest summary directory.
///
/// Summary files that are empty or whose generation fails are skipped
/// and logged without aborting the scan. Cancellation is polled between
/// files only.
///
/// # Errors
///
/// Returns [`crate::error::SiftError::NotFound`] if the summary base
/// directory is absent or holds no summary attempts.
pub async fn answer_from_summaries(
    model: &ModelSlot,
    store: &SessionStore,
    cancel: &CancellationToken,
) -> Result<AnswerRun> {
    tracing::info!("finding latest summary directory");
    let summary_dir = store.find_latest_summary().await?;
    tracing::info!(dir = %summary_dir.display(), "reading summaries");

    let mut filenames = summary_filenames(&summary_dir).await;
    filenames.sort();

    let mut report = String::new();
    let mut answered = 0usize;

    for filename in filenames {
        if cancel.is_cancelled() {
            tracing::info!("answer synthesis cancelled between summaries");
            return Ok(AnswerRun {
                report: report.trim().to_owned(),
                answered,
                aborted: true,
            });
        }

        let path = summary_dir.join(&filename);
        let summary = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents.trim().to_owned(),
            Err(e) => {
                tracing::warn!(file = filename, error = %e, "unreadable summary, skipping");
                continue;
            }
        };

        if summary.is_empty() {
            tracing::warn!(file = filename, "empty summary, skipping");
            continue;
        }

        tracing::info!(file = filename, "generating answer");
        match model.generate(&answer_prompt(&summary), ANSWER_MAX_TOKENS).await {
            Ok(response) if !response.trim().is_empty() => {
                answered += 1;
                report.push_str(&format!(
                    "Answer based on '{filename}':\n{}\n{BLOCK_RULE}\n",
                    response.trim()
                ));
            }
            Ok(_) => {
                tracing::warn!(file = filename, "empty model response");
            }
            Err(e) => {
                tracing::error!(file = filename, error = %e, "model call failed");
            }
        }
    }

    let report = report.trim().to_owned();
    if report.is_empty() {
        tracing::warn!("no valid answers generated from any summary");
        return Ok(AnswerRun {
            report,
            answered,
            aborted: false,
        });
    }

    let output_path = summary_dir.join(ANSWERS_FILE);
    match tokio::fs::write(&output_path, &report).await {
        Ok(()) => tracing::info!(path = %output_path.display(), "answer report saved"),
        Err(e) => tracing::error!(error = %e, "failed to save answer report"),
    }

    Ok(AnswerRun {
        report,
        answered,
        aborted: false,
    })
}

/// Fixed three-question analysis prompt for one summary.
fn answer_prompt(summary: &str) -> String {
    format!(
        "<|system|>\n\
         You are an AI assistant. Your task is to analyze the provided document summary \
         and answer the questions clearly and concisely.\n\
         <|end|>\n\
         <|user|>\n\
         Document Summary:\n\
         ---\n\
         {summary}\n\
         ---\n\
         Based *only* on the summary provided above, please answer the following questions:\n\
         1. What is this document primarily about?\n\
         2. What are the key ideas, facts, or conclusions presented in this summary?\n\
         3. Is there any new or particularly interesting information mentioned in this summary? \
         If so, what is it?\n\
         Provide your answer for these three points.\n\
         <|end|>\n\
         <|assistant|>\n"
    )
}

/// `*_summary.txt` files in the summary directory.
async fn summary_filenames(summary_dir: &std::path::Path) -> Vec<String> {
    let mut names = Vec::new();
    let Ok(mut entries) = tokio::fs::read_dir(summary_dir).await else {
        return names;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if name.ends_with(&format!("{SUMMARY_SUFFIX}.txt")) {
            names.push(name);
        }
    }
    names
}
