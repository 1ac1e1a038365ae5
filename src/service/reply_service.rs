//! Reply service: validate → prompt → generate → persist.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::ReplyConfig;
use crate::domain::{NewReply, PostInput, ReplyRecord};
use crate::error::{ReplyError, StartupError};
use crate::generator::{self, ReplyGenerator};
use crate::persistence::{self, ReplyQuery, ReplyStore};
use crate::prompt;

/// Orchestrates one reply from validated input to stored record.
///
/// Holds no per-request state; concurrent calls each run their own
/// sequence. The sequence per call is: build prompt → exactly one
/// generation call → on success, exactly one store write.
#[derive(Debug, Clone)]
pub struct ReplyService {
    generator: Arc<dyn ReplyGenerator>,
    store: Arc<dyn ReplyStore>,
}

impl ReplyService {
    /// Creates a service over an already-initialized store.
    #[must_use]
    pub fn new(generator: Arc<dyn ReplyGenerator>, store: Arc<dyn ReplyStore>) -> Self {
        Self { generator, store }
    }

    /// Builds the generator and store selected by `config` and initializes
    /// the store.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::Generator`] if the generator cannot be built
    /// and [`StartupError::Store`] if the store cannot be opened or
    /// initialized.
    pub async fn from_config(config: &ReplyConfig) -> Result<Self, StartupError> {
        let generator =
            generator::from_config(&config.generator).map_err(StartupError::Generator)?;
        let store = persistence::open(&config.store)
            .await
            .map_err(StartupError::Store)?;
        tracing::info!(
            model = generator.model(),
            backend = store.backend(),
            "reply service ready"
        );
        Ok(Self::new(generator, store))
    }

    /// Generates and stores a reply for a validated post.
    ///
    /// The timestamp is taken when generation succeeds. If the write fails
    /// the generated text is discarded and the error returned.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError::Generation`] if the provider fails (nothing is
    /// written) or [`ReplyError::Persistence`] if the write fails.
    pub async fn create_reply(&self, input: PostInput) -> Result<ReplyRecord, ReplyError> {
        let prompt = prompt::build(input.platform, &input.post_text);
        let platform = input.platform;

        let generated = self
            .generator
            .generate(&prompt)
            .await
            .inspect_err(|e| tracing::warn!(%platform, error = %e, "reply generation failed"))?;

        let reply = NewReply::generated_now(input, generated);
        let reply_len = reply.generated_reply.len();

        let record = self.store.record(reply).await.inspect_err(|e| {
            tracing::warn!(%platform, reply_len, error = %e, "generated reply could not be stored");
        })?;

        tracing::info!(id = record.id, %platform, reply_len, "reply generated");
        Ok(record)
    }

    /// Validates raw labels then runs [`ReplyService::create_reply`].
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError::Validation`] before any side effect, otherwise
    /// the errors of [`ReplyService::create_reply`].
    pub async fn create_reply_raw(
        &self,
        platform: &str,
        post_text: &str,
    ) -> Result<ReplyRecord, ReplyError> {
        let input = PostInput::parse(platform, post_text)?;
        self.create_reply(input).await
    }

    /// Reads stored replies.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError::Persistence`] on store failure.
    pub async fn list_replies(&self, query: &ReplyQuery) -> Result<Vec<ReplyRecord>, ReplyError> {
        Ok(self.store.list(query).await?)
    }

    /// Stored reply counts keyed by platform label.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError::Persistence`] on store failure.
    pub async fn platform_counts(&self) -> Result<BTreeMap<String, u64>, ReplyError> {
        Ok(self.store.platform_counts().await?)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Platform;
    use crate::generator::{GenerationError, StubGenerator};
    use crate::persistence::{MemoryStore, PersistenceError};

    fn service(
        generator: StubGenerator,
        store: MemoryStore,
    ) -> (ReplyService, Arc<StubGenerator>, Arc<MemoryStore>) {
        let generator = Arc::new(generator);
        let store = Arc::new(store);
        let svc = ReplyService::new(
            Arc::clone(&generator) as Arc<dyn ReplyGenerator>,
            Arc::clone(&store) as Arc<dyn ReplyStore>,
        );
        (svc, generator, store)
    }

    #[tokio::test]
    async fn successful_reply_is_generated_then_stored() {
        let (svc, generator, store) =
            service(StubGenerator::with_reply("  Congrats! 🎉 "), MemoryStore::new());

        let Ok(record) = svc.create_reply_raw("Twitter", "Launched my app!").await else {
            panic!("reply should succeed");
        };
        assert_eq!(record.platform, Platform::Twitter);
        assert_eq!(record.post_text, "Launched my app!");
        assert_eq!(record.generated_reply, "Congrats! 🎉");
        assert_eq!(generator.calls(), 1);
        assert_eq!(store.rows().await, vec![record]);
    }

    #[tokio::test]
    async fn prompt_reaches_generator() {
        let (svc, generator, _) = service(StubGenerator::canned(), MemoryStore::new());
        let _ = svc.create_reply_raw("Instagram", "Beach day").await;
        let Some(prompt) = generator.last_prompt() else {
            panic!("generator not called");
        };
        assert_eq!(prompt, prompt::build(Platform::Instagram, "Beach day"));
    }

    #[tokio::test]
    async fn invalid_input_has_no_side_effects() {
        let (svc, generator, store) = service(StubGenerator::canned(), MemoryStore::new());

        for (platform, text) in [("Facebook", "hello"), ("Twitter", ""), ("LinkedIn", "   ")] {
            let result = svc.create_reply_raw(platform, text).await;
            assert!(matches!(result, Err(ReplyError::Validation(_))));
        }
        assert_eq!(generator.calls(), 0);
        assert_eq!(store.record_calls(), 0);
    }

    #[tokio::test]
    async fn generation_failure_skips_store() {
        let (svc, generator, store) = service(
            StubGenerator::failing(GenerationError::Transport("dns".to_string())),
            MemoryStore::new(),
        );
        let result = svc.create_reply_raw("Twitter", "hi").await;
        assert!(matches!(result, Err(ReplyError::Generation(_))));
        assert_eq!(generator.calls(), 1);
        assert_eq!(store.record_calls(), 0);
    }

    #[tokio::test]
    async fn missing_api_key_fails_at_startup() {
        let Ok(config) = ReplyConfig::from_lookup(|_| None) else {
            panic!("empty environment should load");
        };
        let result = ReplyService::from_config(&config).await;
        let Err(err) = result else {
            panic!("gemini without a key must not start");
        };
        assert!(matches!(err, StartupError::Generator(GenerationError::Config(_))));
        assert!(err.to_string().starts_with("cannot build reply generator"));
    }

    #[tokio::test]
    async fn stub_backend_starts_over_sqlite_file() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("replies.db");
        let path = path.to_string_lossy().into_owned();
        let Ok(config) = ReplyConfig::from_lookup(|key| match key {
            "GENERATOR_BACKEND" => Some("stub".to_string()),
            "SQLITE_PATH" => Some(path.clone()),
            _ => None,
        }) else {
            panic!("config should load");
        };
        let Ok(svc) = ReplyService::from_config(&config).await else {
            panic!("service should start");
        };
        let Ok(record) = svc.create_reply_raw("Twitter", "hello").await else {
            panic!("reply should be stored");
        };
        assert_eq!(record.id, 1);
    }

    #[tokio::test]
    async fn store_failure_discards_generated_reply() {
        let (svc, generator, store) = service(
            StubGenerator::canned(),
            MemoryStore::failing(PersistenceError::Connect("refused".to_string())),
        );
        let result = svc.create_reply_raw("LinkedIn", "New role").await;
        assert!(matches!(result, Err(ReplyError::Persistence(_))));
        assert_eq!(generator.calls(), 1);
        assert_eq!(store.record_calls(), 1);
    }
}
