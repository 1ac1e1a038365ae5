//! Domain layer: platforms, validated posts and stored replies.
//!
//! These types are shared by the HTTP handlers, the batch runner and the
//! persistence backends. None of them perform I/O.

pub mod platform;
pub mod reply_record;

pub use platform::{Platform, UnknownPlatform};
pub use reply_record::{
    NewReply, PostInput, ReplyRecord, ValidationError, format_timestamp, now_utc, parse_timestamp,
};
