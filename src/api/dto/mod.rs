//! Data Transfer Objects for REST request/response serialization.
//!
//! Timestamps are serialized as RFC 3339 strings exactly as stored.

pub mod reply_dto;

pub use reply_dto::*;
