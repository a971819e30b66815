//! Pipeline configuration with sensible defaults.
//!
//! [`SiftConfig`] enumerates every knob the pipeline reads: storage
//! directories, fetch/render timeouts, model generation parameters, and
//! the chat prompt scaffolding consumed by the presentation layer. The
//! defaults mirror the shipped configuration.

use crate::error::SiftError;
use std::path::PathBuf;

/// Sampling parameters forwarded to the model collaborator.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    /// Hard cap on total sequence length (prompt + generated tokens).
    pub max_length: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub do_sample: bool,
    pub repetition_penalty: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_length: 4096,
            temperature: 0.7,
            top_p: 0.9,
            do_sample: true,
            repetition_penalty: 1.1,
        }
    }
}

/// Configuration for search, storage, and distillation.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour. Read-only to the pipeline.
#[derive(Debug, Clone)]
pub struct SiftConfig {
    /// Base directory holding `search_attempt_<n>` session directories.
    pub search_dir: PathBuf,
    /// Base directory holding `search_attempt_<n>_summary` directories.
    pub summary_dir: PathBuf,
    /// Directory where the presentation layer persists chat transcripts.
    pub chat_dir: PathBuf,
    /// Model sampling parameters.
    pub generation: GenerationParams,
    /// Per-turn prompt template with `{role}` and `{content}` placeholders.
    pub prompt_template: String,
    /// System prompt for the chat session.
    pub system_prompt: String,
    /// Per-request timeout for the lightweight HTTP fetch, in seconds.
    pub fetch_timeout_seconds: u64,
    /// Browser navigation timeout, in seconds.
    pub nav_timeout_seconds: u64,
    /// Fixed settle period after navigation for script-driven content.
    pub settle_ms: u64,
    /// How long to wait for the results container on the SERP, in seconds.
    pub selector_timeout_seconds: u64,
    /// Custom User-Agent. If `None`, rotates through a built-in list of
    /// realistic browser User-Agents for HTTP requests; browser rendering
    /// always uses a fixed desktop UA.
    pub user_agent: Option<String>,
}

impl Default for SiftConfig {
    fn default() -> Self {
        Self {
            search_dir: PathBuf::from("web_searches"),
            summary_dir: PathBuf::from("model_search_summary"),
            chat_dir: PathBuf::from("chat_history"),
            generation: GenerationParams::default(),
            prompt_template: "<|{role}|>\n{content}<|end|>\n".into(),
            system_prompt: "You are a helpful AI assistant.".into(),
            fetch_timeout_seconds: 20,
            nav_timeout_seconds: 20,
            settle_ms: 3000,
            selector_timeout_seconds: 10,
            user_agent: None,
        }
    }
}

impl SiftConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `fetch_timeout_seconds`, `nav_timeout_seconds`, and
    ///   `selector_timeout_seconds` must be greater than 0
    /// - `search_dir` and `summary_dir` must not be empty paths
    /// - `generation.max_length` must be greater than 0
    pub fn validate(&self) -> Result<(), SiftError> {
        if self.fetch_timeout_seconds == 0 {
            return Err(SiftError::Config(
                "fetch_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.nav_timeout_seconds == 0 {
            return Err(SiftError::Config(
                "nav_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.selector_timeout_seconds == 0 {
            return Err(SiftError::Config(
                "selector_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.search_dir.as_os_str().is_empty() {
            return Err(SiftError::Config("search_dir must not be empty".into()));
        }
        if self.summary_dir.as_os_str().is_empty() {
            return Err(SiftError::Config("summary_dir must not be empty".into()));
        }
        if self.generation.max_length == 0 {
            return Err(SiftError::Config(
                "generation.max_length must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
