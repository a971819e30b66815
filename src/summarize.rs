//! Summary pipeline — drives the model over saved documents.
//!
//! Scans the latest attempt's document files in lexicographic order,
//! chunks oversized bodies, and asks the model for one summary fragment
//! per chunk. Fragments for a document are folded into a single combined
//! summary file. Model calls are strictly sequential — the collaborator
//! accepts one in-flight generation — and the cancellation token is
//! polled only between documents and chunks, never mid-generation.

use crate::chunk::chunk_if_needed;
use crate::error::Result;
use crate::model::ModelSlot;
use crate::store::{parse_document, SessionStore, DOCUMENT_PREFIX};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Generation cap for one summary fragment.
pub const SUMMARY_MAX_TOKENS: usize = 200;

/// Outcome of a summarization pass.
#[derive(Debug, Clone)]
pub struct SummaryRun {
    /// Directory the summary files were written to.
    pub summary_dir: PathBuf,
    /// Documents that produced a summary file.
    pub documents_summarized: usize,
    /// True when the pass stopped at a cancellation poll point. Files
    /// already written are left intact.
    pub aborted: bool,
}

/// Summarize every document in the latest search attempt.
///
/// Documents with empty bodies, failed generations, or unwritable
/// summaries are skipped; the pass continues. The created summary
/// directory is returned even when some documents were skipped.
///
/// # Errors
///
/// Returns [`crate::error::SiftError::NotFound`] if the search base
/// directory or the latest attempt is missing.
pub async fn summarize_attempt(
    model: &ModelSlot,
    store: &SessionStore,
    cancel: &CancellationToken,
) -> Result<SummaryRun> {
    tracing::info!("finding latest search attempt");
    let attempt_dir = store.find_latest_attempt().await?;
    let attempt_name = attempt_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_owned();

    let summary_dir = store.create_summary_dir(&attempt_name).await?;
    tracing::info!(
        from = %attempt_dir.display(),
        to = %summary_dir.display(),
        "summarizing attempt"
    );

    let mut filenames = document_filenames(&attempt_dir).await;
    filenames.sort();

    let mut documents_summarized = 0usize;

    for filename in filenames {
        if cancel.is_cancelled() {
            tracing::info!("summarization cancelled between documents");
            return Ok(SummaryRun {
                summary_dir,
                documents_summarized,
                aborted: true,
            });
        }

        let path = attempt_dir.join(&filename);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(file = filename, error = %e, "unreadable document, skipping");
                continue;
            }
        };

        let doc = parse_document(&contents);
        if doc.body.trim().is_empty() {
            tracing::warn!(file = filename, "empty body after header, skipping");
            continue;
        }

        let (chunks, was_split) = chunk_if_needed(&doc.body, &filename, &attempt_dir).await;
        let label = if was_split { "Chunk" } else { "Document" };

        let mut combined = String::new();
        let mut fragments = 0usize;

        for (idx, chunk) in chunks.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(file = filename, "summarization cancelled between chunks");
                return Ok(SummaryRun {
                    summary_dir,
                    documents_summarized,
                    aborted: true,
                });
            }

            let prompt = summary_prompt(&doc.title, &doc.url, chunk);
            tracing::info!(
                file = filename,
                part = idx + 1,
                total = chunks.len(),
                split = was_split,
                "summarizing"
            );

            match model.generate(&prompt, SUMMARY_MAX_TOKENS).await {
                Ok(response) if !response.trim().is_empty() => {
                    fragments += 1;
                    combined.push_str(&format!(
                        "[{label} {} Summary for '{filename}']:\n{}\n\n",
                        idx + 1,
                        response.trim()
                    ));
                }
                Ok(_) => {
                    tracing::warn!(file = filename, part = idx + 1, "empty model response");
                }
                Err(e) => {
                    tracing::error!(file = filename, part = idx + 1, error = %e, "model call failed");
                }
            }
        }

        if fragments == 0 {
            tracing::warn!(file = filename, "no valid fragments, skipping summary file");
            continue;
        }

        let summary_name = format!("{}_summary.txt", filename.trim_end_matches(".txt"));
        let summary_path = summary_dir.join(&summary_name);
        match tokio::fs::write(&summary_path, combined.trim()).await {
            Ok(()) => {
                documents_summarized += 1;
                tracing::info!(file = summary_name, "combined summary saved");
            }
            Err(e) => {
                tracing::error!(file = summary_name, error = %e, "failed to persist summary");
            }
        }
    }

    tracing::info!(documents_summarized, "summarization pass complete");
    Ok(SummaryRun {
        summary_dir,
        documents_summarized,
        aborted: false,
    })
}

/// Fixed instruction prompt for one chunk.
fn summary_prompt(title: &str, url: &str, chunk: &str) -> String {
    format!(
        "<|system|>\n\
         You are an AI assistant that summarizes technical documents concisely. \
         Aim for around 100-150 words per summary.\n\
         Focus on the key information and main points of the provided text.\n\
         Input document title: {title}\n\
         Input document URL: {url}\n\
         <|end|>\n\
         <|user|>\n\
         Summarize this document chunk:\n\
         ---\n\
         {chunk}\n\
         ---\n\
         <|end|>\n\
         <|assistant|>\n"
    )
}

/// Document files in the attempt directory: `search_data_<k>.txt` only,
/// sibling chunk files excluded.
async fn document_filenames(attempt_dir: &std::path::Path) -> Vec<String> {
    let mut names = Vec::new();
    let Ok(mut entries) = tokio::fs::read_dir(attempt_dir).await else {
        return names;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if is_document_filename(&name) {
            names.push(name);
        }
    }
    names
}

/// True for `search_data_<k>.txt` with a purely numeric `<k>`.
fn is_document_filename(name: &str) -> bool {
    name.strip_prefix(DOCUMENT_PREFIX)
        .and_then(|rest| rest.strip_suffix(".txt"))
        .is_some_and(|k| !k.is_empty() && k.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiftConfig;
    use crate::error::SiftError;
    use crate::model::TextGenerator;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct EchoModel;

    #[async_trait::async_trait]
    impl TextGenerator for EchoModel {
        async fn generate(&self, _prompt: &str, _max_tokens: usize) -> Result<String> {
            Ok("A concise summary.".into())
        }
    }

    struct FailingModel;

    #[async_trait::async_trait]
    impl TextGenerator for FailingModel {
        async fn generate(&self, _prompt: &str, _max_tokens: usize) -> Result<String> {
            Err(SiftError::Model("backend down".into()))
        }
    }

    fn fixture(tmp: &TempDir) -> (SessionStore, SiftConfig) {
        let config = SiftConfig {
            search_dir: tmp.path().join("web_searches"),
            summary_dir: tmp.path().join("model_search_summary"),
            ..Default::default()
        };
        (SessionStore::new(&config), config)
    }

    async fn write_doc(dir: &std::path::Path, index: usize, body: &str) {
        let contents = format!("Title {index}\nhttps://site{index}.example/\n{body}");
        tokio::fs::write(dir.join(format!("search_data_{index}.txt")), contents)
            .await
            .expect("write doc");
    }

    #[test]
    fn document_filename_matching() {
        assert!(is_document_filename("search_data_1.txt"));
        assert!(is_document_filename("search_data_12.txt"));
        assert!(!is_document_filename("search_data_1_chunk2.txt"));
        assert!(!is_document_filename("search_data_1_summary.txt"));
        assert!(!is_document_filename("urls_n_headlines.txt"));
    }

    #[test]
    fn prompt_embeds_title_url_and_chunk() {
        let prompt = summary_prompt("My Title", "https://a.example/", "chunk body");
        assert!(prompt.contains("Input document title: My Title"));
        assert!(prompt.contains("Input document URL: https://a.example/"));
        assert!(prompt.contains("chunk body"));
    }

    #[tokio::test]
    async fn single_short_document_yields_one_document_fragment() {
        let tmp = TempDir::new().expect("tempdir");
        let (store, _) = fixture(&tmp);
        let (_, attempt_dir) = store.create_attempt().await.expect("attempt");
        write_doc(&attempt_dir, 1, "some body text under the split threshold").await;

        let model = ModelSlot::new(Arc::new(EchoModel));
        let run = summarize_attempt(&model, &store, &CancellationToken::new())
            .await
            .expect("summarize");

        assert!(!run.aborted);
        assert_eq!(run.documents_summarized, 1);
        let summary = tokio::fs::read_to_string(run.summary_dir.join("search_data_1_summary.txt"))
            .await
            .expect("read summary");
        assert!(summary.contains("[Document 1 Summary for 'search_data_1.txt']:"));
        assert!(summary.contains("A concise summary."));
        assert!(!summary.contains("Chunk"));
    }

    #[tokio::test]
    async fn long_document_yields_chunk_fragments() {
        let tmp = TempDir::new().expect("tempdir");
        let (store, _) = fixture(&tmp);
        let (_, attempt_dir) = store.create_attempt().await.expect("attempt");
        let body = (0..3200).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        write_doc(&attempt_dir, 1, &body).await;

        let model = ModelSlot::new(Arc::new(EchoModel));
        let run = summarize_attempt(&model, &store, &CancellationToken::new())
            .await
            .expect("summarize");

        assert_eq!(run.documents_summarized, 1);
        let summary = tokio::fs::read_to_string(run.summary_dir.join("search_data_1_summary.txt"))
            .await
            .expect("read summary");
        assert!(summary.contains("[Chunk 1 Summary for 'search_data_1.txt']:"));
        assert!(summary.contains("[Chunk 3 Summary for 'search_data_1.txt']:"));
    }

    #[tokio::test]
    async fn empty_body_document_skipped() {
        let tmp = TempDir::new().expect("tempdir");
        let (store, _) = fixture(&tmp);
        let (_, attempt_dir) = store.create_attempt().await.expect("attempt");
        write_doc(&attempt_dir, 1, "").await;
        write_doc(&attempt_dir, 2, "a real body").await;

        let model = ModelSlot::new(Arc::new(EchoModel));
        let run = summarize_attempt(&model, &store, &CancellationToken::new())
            .await
            .expect("summarize");

        assert_eq!(run.documents_summarized, 1);
        assert!(!run.summary_dir.join("search_data_1_summary.txt").exists());
        assert!(run.summary_dir.join("search_data_2_summary.txt").exists());
    }

    #[tokio::test]
    async fn failing_model_skips_documents_without_failing_pass() {
        let tmp = TempDir::new().expect("tempdir");
        let (store, _) = fixture(&tmp);
        let (_, attempt_dir) = store.create_attempt().await.expect("attempt");
        write_doc(&attempt_dir, 1, "body one").await;
        write_doc(&attempt_dir, 2, "body two").await;

        let model = ModelSlot::new(Arc::new(FailingModel));
        let run = summarize_attempt(&model, &store, &CancellationToken::new())
            .await
            .expect("summarize");

        assert!(!run.aborted);
        assert_eq!(run.documents_summarized, 0);
        // Summary directory still created and returned.
        assert!(run.summary_dir.is_dir());
    }

    #[tokio::test]
    async fn missing_base_dir_is_not_found() {
        let tmp = TempDir::new().expect("tempdir");
        let (store, _) = fixture(&tmp);
        let model = ModelSlot::new(Arc::new(EchoModel));
        let err = summarize_attempt(&model, &store, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SiftError::NotFound(_)));
    }

    #[tokio::test]
    async fn pre_cancelled_token_aborts_before_any_model_call() {
        let tmp = TempDir::new().expect("tempdir");
        let (store, _) = fixture(&tmp);
        let (_, attempt_dir) = store.create_attempt().await.expect("attempt");
        write_doc(&attempt_dir, 1, "body text").await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let model = ModelSlot::new(Arc::new(EchoModel));
        let run = summarize_attempt(&model, &store, &cancel)
            .await
            .expect("summarize returns, not raises");

        assert!(run.aborted);
        assert_eq!(run.documents_summarized, 0);
    }
}
