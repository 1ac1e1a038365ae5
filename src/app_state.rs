//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::ReplyService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Reply service for all business logic.
    pub reply_service: Arc<ReplyService>,
}

impl AppState {
    /// Wraps a service for sharing across handlers.
    #[must_use]
    pub fn new(reply_service: ReplyService) -> Self {
        Self {
            reply_service: Arc::new(reply_service),
        }
    }
}
