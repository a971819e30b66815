//! Core types for search results, saved documents, and conversation notes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of domain classification for a discovered URL.
///
/// Determines the fetch strategy: usable URLs go through the lightweight
/// HTTP fetch, blocked URLs through the rendered-browser fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// A well-formed http(s) URL outside the blocklist.
    Usable,
    /// Non-http(s) scheme or a blocklisted domain (social, paywalled, video).
    Blocked,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Usable => "usable",
            Self::Blocked => "blocked",
        })
    }
}

/// A single entry parsed from a search engine results page.
///
/// Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultItem {
    /// The title of the result page.
    pub title: String,
    /// The URL of the result.
    pub url: String,
    /// Whether the URL's domain is usable or blocked.
    pub classification: Classification,
}

/// A document saved from a successful page extraction.
///
/// Persisted as a two-line header (title, url) followed by the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Title taken from the originating search result.
    pub title: String,
    /// URL the body was extracted from.
    pub url: String,
    /// Cleaned article text.
    pub body: String,
}

/// Role of a conversation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single `{role, content}` record in the chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Ordered chat history owned by the model-interaction collaborator.
///
/// The distillation pipeline only ever appends a single condensed note
/// after a completed deep search; everything else is the presentation
/// layer's business.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationHistory {
    messages: Vec<ChatMessage>,
}

/// Maximum characters of the answer report carried into the chat note.
const NOTE_CHAR_CAP: usize = 1000;

impl ConversationHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role,
            content: content.into(),
        });
    }

    /// Append the condensed deep-search note, truncating the report to
    /// its first 1000 characters (on a char boundary).
    pub fn push_deep_search_note(&mut self, report: &str) {
        let mut end = NOTE_CHAR_CAP.min(report.len());
        while !report.is_char_boundary(end) && end > 0 {
            end -= 1;
        }
        self.push(
            Role::Assistant,
            format!("[Deep Search Summary Note]: {}...", &report[..end]),
        );
    }

    /// All messages in order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}
