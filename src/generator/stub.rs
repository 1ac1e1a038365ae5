//! Stub generator for offline mode and tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{GenerationError, ReplyGenerator, finish};

/// Reply returned by [`StubGenerator::canned`].
pub const CANNED_REPLY: &str = "Love this! Thanks for sharing 🙌";

/// In-process generator with a fixed outcome.
///
/// Counts every call and remembers the last prompt so callers can assert
/// on what would have been sent to a real provider.
#[derive(Debug)]
pub struct StubGenerator {
    outcome: Result<String, GenerationError>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl StubGenerator {
    /// Always returns `reply` (trimmed).
    #[must_use]
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self::with_outcome(Ok(reply.into()))
    }

    /// Always returns [`CANNED_REPLY`].
    #[must_use]
    pub fn canned() -> Self {
        Self::with_reply(CANNED_REPLY)
    }

    /// Always fails with `error`.
    #[must_use]
    pub fn failing(error: GenerationError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<String, GenerationError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Number of `generate` calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompt passed to the most recent call.
    #[must_use]
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt
            .lock()
            .map_or_else(|poisoned| poisoned.into_inner().clone(), |guard| guard.clone())
    }
}

impl Default for StubGenerator {
    fn default() -> Self {
        Self::canned()
    }
}

#[async_trait]
impl ReplyGenerator for StubGenerator {
    fn model(&self) -> &str {
        "stub"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }
        match &self.outcome {
            Ok(reply) => finish(reply),
            Err(e) => Err(e.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_calls_and_records_prompt() {
        let stub = StubGenerator::with_reply("  ok  ");
        assert_eq!(stub.calls(), 0);
        assert_eq!(stub.generate("first").await, Ok("ok".to_string()));
        assert_eq!(stub.generate("second").await, Ok("ok".to_string()));
        assert_eq!(stub.calls(), 2);
        assert_eq!(stub.last_prompt().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn failing_stub_returns_error() {
        let stub = StubGenerator::failing(GenerationError::Timeout);
        assert_eq!(stub.generate("x").await, Err(GenerationError::Timeout));
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn blank_canned_reply_is_empty_error() {
        let stub = StubGenerator::with_reply("   ");
        assert_eq!(stub.generate("x").await, Err(GenerationError::Empty));
    }
}
