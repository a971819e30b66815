//! Session store — numbered attempt directories and file layout.
//!
//! Layout, relative to the configured base directories:
//!
//! ```text
//! web_searches/search_attempt_<n>/urls_n_headlines.txt
//! web_searches/search_attempt_<n>/search_data_<k>.txt
//! model_search_summary/search_attempt_<n>_summary/search_data_<k>_summary.txt
//! model_search_summary/search_attempt_<n>_summary/all_deep_search_answers.txt
//! ```
//!
//! Attempt ids are allocated behind an async lock by scanning existing
//! directories for the numerically largest suffix. Sessions are
//! single-writer; the lock only serialises allocations within one
//! process. Directories are created once, written incrementally, and
//! never deleted here.

use crate::config::SiftConfig;
use crate::error::{Result, SiftError};
use crate::types::{Document, ResultItem};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Prefix of per-session attempt directories.
pub const ATTEMPT_PREFIX: &str = "search_attempt_";

/// Result-index file inside an attempt directory.
pub const RESULT_INDEX_FILE: &str = "urls_n_headlines.txt";

/// Prefix of saved document files.
pub const DOCUMENT_PREFIX: &str = "search_data_";

/// Suffix of summary directories, keyed to their originating attempt.
pub const SUMMARY_SUFFIX: &str = "_summary";

/// Final synthesized report file inside a summary directory.
pub const ANSWERS_FILE: &str = "all_deep_search_answers.txt";

/// Manages attempt directories for search sessions and summaries.
pub struct SessionStore {
    search_dir: PathBuf,
    summary_dir: PathBuf,
    alloc_lock: Mutex<()>,
}

impl SessionStore {
    /// Create a store over the configured base directories. Nothing is
    /// created on disk until an attempt is allocated.
    pub fn new(config: &SiftConfig) -> Self {
        Self {
            search_dir: config.search_dir.clone(),
            summary_dir: config.summary_dir.clone(),
            alloc_lock: Mutex::new(()),
        }
    }

    /// Base directory of search attempts.
    pub fn search_dir(&self) -> &Path {
        &self.search_dir
    }

    /// Base directory of summary attempts.
    pub fn summary_dir(&self) -> &Path {
        &self.summary_dir
    }

    /// Allocate the next attempt id and create its directory.
    ///
    /// The id is one past the numerically largest existing suffix, so a
    /// gap left by a crashed run can never cause an id to be re-issued.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::Io`] if the directories cannot be created
    /// or scanned.
    pub async fn create_attempt(&self) -> Result<(u32, PathBuf)> {
        let _guard = self.alloc_lock.lock().await;

        tokio::fs::create_dir_all(&self.search_dir)
            .await
            .map_err(|e| SiftError::Io(format!("creating {}: {e}", self.search_dir.display())))?;

        let names = list_dir_names(&self.search_dir).await?;
        let next = names
            .iter()
            .filter_map(|name| attempt_number(name))
            .max()
            .unwrap_or(0)
            + 1;

        let attempt_dir = self.search_dir.join(format!("{ATTEMPT_PREFIX}{next}"));
        tokio::fs::create_dir_all(&attempt_dir)
            .await
            .map_err(|e| SiftError::Io(format!("creating {}: {e}", attempt_dir.display())))?;

        tracing::info!(attempt = next, dir = %attempt_dir.display(), "attempt created");
        Ok((next, attempt_dir))
    }

    /// Write the result index: one title/url pair per usable item,
    /// blank-line separated, in discovery order.
    pub async fn write_result_index(&self, attempt_dir: &Path, items: &[ResultItem]) -> Result<()> {
        let mut contents = String::new();
        for item in items {
            contents.push_str(&item.title);
            contents.push('\n');
            contents.push_str(&item.url);
            contents.push_str("\n\n");
        }

        let path = attempt_dir.join(RESULT_INDEX_FILE);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| SiftError::Io(format!("writing {}: {e}", path.display())))?;

        tracing::info!(count = items.len(), path = %path.display(), "result index saved");
        Ok(())
    }

    /// Save a document as `search_data_<index>.txt`: two-line header
    /// (title, url) followed by the body.
    pub async fn save_document(
        &self,
        attempt_dir: &Path,
        index: usize,
        item: &ResultItem,
        text: &str,
    ) -> Result<PathBuf> {
        let path = attempt_dir.join(format!("{DOCUMENT_PREFIX}{index}.txt"));
        let contents = format!("{}\n{}\n{}", item.title, item.url, text);

        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| SiftError::Io(format!("writing {}: {e}", path.display())))?;

        tracing::info!(
            title = %item.title,
            words = text.split_whitespace().count(),
            "document saved"
        );
        Ok(path)
    }

    /// Find the most recent `search_attempt_<n>` directory.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::NotFound`] if the base directory is absent
    /// or holds no attempts.
    pub async fn find_latest_attempt(&self) -> Result<PathBuf> {
        let names = list_dir_names(&self.search_dir)
            .await
            .map_err(|_| SiftError::NotFound(format!("base directory {}", self.search_dir.display())))?;

        let attempts: Vec<String> = names
            .into_iter()
            .filter(|name| name.starts_with(ATTEMPT_PREFIX))
            .collect();
        if attempts.is_empty() {
            return Err(SiftError::NotFound(format!(
                "no search attempts in {}",
                self.search_dir.display()
            )));
        }

        let latest = latest_name(attempts, attempt_number);
        Ok(self.search_dir.join(latest))
    }

    /// Find the most recent `search_attempt_<n>_summary` directory.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::NotFound`] if the summary base directory is
    /// absent or holds no summary attempts.
    pub async fn find_latest_summary(&self) -> Result<PathBuf> {
        let names = list_dir_names(&self.summary_dir)
            .await
            .map_err(|_| {
                SiftError::NotFound(format!("summary directory {}", self.summary_dir.display()))
            })?;

        let summaries: Vec<String> = names
            .into_iter()
            .filter(|name| name.ends_with(SUMMARY_SUFFIX))
            .collect();
        if summaries.is_empty() {
            return Err(SiftError::NotFound(format!(
                "no summary attempts in {}",
                self.summary_dir.display()
            )));
        }

        let latest = latest_name(summaries, summary_number);
        Ok(self.summary_dir.join(latest))
    }

    /// Create (if needed) the summary directory keyed to an attempt
    /// directory name, e.g. `search_attempt_3` → `search_attempt_3_summary`.
    pub async fn create_summary_dir(&self, attempt_name: &str) -> Result<PathBuf> {
        let dir = self
            .summary_dir
            .join(format!("{attempt_name}{SUMMARY_SUFFIX}"));
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| SiftError::Io(format!("creating {}: {e}", dir.display())))?;
        Ok(dir)
    }
}

/// Parse a saved document: two-line header (title, url), rest is body.
///
/// Degenerate files keep the original tolerant behaviour: with two or
/// fewer lines the whole trimmed content is treated as the body.
pub fn parse_document(contents: &str) -> Document {
    let trimmed = contents.trim();
    let lines: Vec<&str> = trimmed.lines().collect();

    let title = lines.first().copied().unwrap_or("Unknown Title").to_owned();
    let url = lines.get(1).copied().unwrap_or("Unknown URL").to_owned();
    let body = if lines.len() > 2 {
        lines[2..].join("\n").trim().to_owned()
    } else {
        trimmed.to_owned()
    };

    Document { title, url, body }
}

/// Names of all entries directly under `dir`.
async fn list_dir_names(dir: &Path) -> Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| SiftError::Io(format!("reading {}: {e}", dir.display())))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SiftError::Io(format!("reading {}: {e}", dir.display())))?
    {
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_owned());
        }
    }
    Ok(names)
}

/// Pick the latest of `names`: numerically largest suffix when every
/// name parses, lexicographic max otherwise.
fn latest_name(mut names: Vec<String>, parse: fn(&str) -> Option<u32>) -> String {
    let all_numeric = names.iter().all(|name| parse(name).is_some());
    if all_numeric {
        names.sort_by_key(|name| parse(name).unwrap_or(0));
    } else {
        tracing::warn!("non-numeric attempt suffix, falling back to lexicographic order");
        names.sort();
    }
    names.pop().unwrap_or_default()
}

/// Numeric suffix of `search_attempt_<n>`.
fn attempt_number(name: &str) -> Option<u32> {
    name.strip_prefix(ATTEMPT_PREFIX)?.parse().ok()
}

/// Numeric component of `search_attempt_<n>_summary`.
fn summary_number(name: &str) -> Option<u32> {
    name.strip_prefix(ATTEMPT_PREFIX)?
        .strip_suffix(SUMMARY_SUFFIX)?
        .parse()
        .ok()
}
