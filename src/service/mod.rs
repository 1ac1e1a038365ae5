//! Service layer: business logic orchestration.
//!
//! [`ReplyService`] runs the prompt → generate → persist sequence shared
//! by the HTTP handler and the batch runner.

pub mod reply_service;

pub use reply_service::ReplyService;
