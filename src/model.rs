//! Model collaborator boundary — single-flight text generation.
//!
//! The language-model runtime lives outside this crate; the pipeline
//! consumes it through [`TextGenerator`]. Failures are a proper error
//! variant at this boundary, never an error-tagged string. The runtime
//! supports exactly one in-flight generation, so access goes through
//! [`ModelSlot`], a one-permit resource that makes the serialisation
//! visible at the API boundary instead of hiding it behind an ambient
//! lock. There is no timeout on generation.

use crate::error::{Result, SiftError};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Synchronous text generation from a prompt, with a max-token bound.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate up to `max_tokens` tokens of completion for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::Model`] when the runtime fails internally.
    async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String>;
}

/// One-capacity slot in front of a [`TextGenerator`].
///
/// Cloneable handle; all clones share the same permit, so at most one
/// generation is ever in flight regardless of how many pipeline stages
/// hold the slot.
#[derive(Clone)]
pub struct ModelSlot {
    generator: Arc<dyn TextGenerator>,
    permit: Arc<Semaphore>,
}

impl ModelSlot {
    /// Wrap a generator in a single-flight slot.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            permit: Arc::new(Semaphore::new(1)),
        }
    }

    /// Acquire the slot and run one generation.
    ///
    /// Waits if another generation is in flight. Cancellation is
    /// cooperative and coarse: callers poll their token between
    /// generations, never mid-flight.
    pub async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String> {
        let _permit = self
            .permit
            .acquire()
            .await
            .map_err(|_| SiftError::Model("model slot closed".into()))?;
        self.generator.generate(prompt, max_tokens).await
    }
}
