//! Error types for the deepsift crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. Transient per-item failures (a page that
//! fails to fetch, a chunk that fails to summarize) are not errors at
//! this level — they degrade to skipped items inside the pipeline.

/// Errors that can occur during search, extraction, or distillation.
#[derive(Debug, thiserror::Error)]
pub enum SiftError {
    /// A required directory or attempt does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Headless browser rendering failed.
    #[error("render error: {0}")]
    Render(String),

    /// Failed to parse HTML or a persisted file.
    #[error("parse error: {0}")]
    Parse(String),

    /// The language-model collaborator failed to generate.
    #[error("model error: {0}")]
    Model(String),

    /// A filesystem read or write failed.
    #[error("io error: {0}")]
    Io(String),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for deepsift results.
pub type Result<T> = std::result::Result<T, SiftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_not_found() {
        let err = SiftError::NotFound("base directory web_searches".into());
        assert_eq!(err.to_string(), "not found: base directory web_searches");
    }

    #[test]
    fn display_http() {
        let err = SiftError::Http("connection refused".into());
        assert_eq!(err.to_string(), "HTTP error: connection refused");
    }

    #[test]
    fn display_render() {
        let err = SiftError::Render("navigation timed out".into());
        assert_eq!(err.to_string(), "render error: navigation timed out");
    }

    #[test]
    fn display_model() {
        let err = SiftError::Model("generation failed".into());
        assert_eq!(err.to_string(), "model error: generation failed");
    }

    #[test]
    fn display_io() {
        let err = SiftError::Io("permission denied".into());
        assert_eq!(err.to_string(), "io error: permission denied");
    }

    #[test]
    fn display_config() {
        let err = SiftError::Config("fetch_timeout_seconds must be > 0".into());
        assert_eq!(
            err.to_string(),
            "config error: fetch_timeout_seconds must be > 0"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SiftError>();
    }
}
