//! Reply generation: the only component that calls out over the network.
//!
//! [`ReplyGenerator`] turns a finished prompt into reply text. The Gemini
//! adapter is the production backend; [`StubGenerator`] serves offline
//! runs and tests.

pub mod gemini;
pub mod stub;

use std::sync::Arc;

use async_trait::async_trait;

pub use gemini::GeminiGenerator;
pub use stub::StubGenerator;

use crate::config::{GeneratorBackend, GeneratorConfig};

/// Failures of a single generation call. Nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// The provider could not be reached.
    #[error("generation request failed: {0}")]
    Transport(String),

    /// The provider did not answer within the configured timeout.
    #[error("generation request timed out")]
    Timeout,

    /// The provider answered with a non-success status.
    #[error("generation API returned {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("invalid generation response: {0}")]
    InvalidResponse(String),

    /// The provider returned no text.
    #[error("generation returned an empty reply")]
    Empty,

    /// Generator could not be constructed from configuration.
    #[error("generator misconfigured: {0}")]
    Config(String),
}

/// Produces reply text from a prompt.
#[async_trait]
pub trait ReplyGenerator: Send + Sync + std::fmt::Debug {
    /// Model or backend label for logs.
    fn model(&self) -> &str;

    /// Runs one generation and returns the whitespace-trimmed text.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] when the provider is unreachable,
    /// reports an error, or returns empty or unparseable content.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Builds the generator selected by configuration.
///
/// # Errors
///
/// Returns [`GenerationError::Config`] if the HTTP client cannot be built
/// or credentials are missing.
pub fn from_config(config: &GeneratorConfig) -> Result<Arc<dyn ReplyGenerator>, GenerationError> {
    match config.backend {
        GeneratorBackend::Gemini => Ok(Arc::new(GeminiGenerator::new(config)?)),
        GeneratorBackend::Stub => Ok(Arc::new(StubGenerator::canned())),
    }
}

/// Trims provider output and rejects blank text.
pub(crate) fn finish(text: &str) -> Result<String, GenerationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(trimmed.to_string())
}
