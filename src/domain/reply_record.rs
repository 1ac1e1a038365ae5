//! Inbound post and persisted reply types.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::Serialize;

use super::Platform;

/// A validated post waiting for a reply.
///
/// Construct with [`PostInput::parse`]; holding a `PostInput` means the
/// platform is supported and the text is not blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostInput {
    /// Target platform.
    pub platform: Platform,
    /// Original post text, kept verbatim.
    pub post_text: String,
}

/// Why a `(platform, post_text)` pair was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Platform label outside the supported set.
    #[error(transparent)]
    Platform(#[from] super::platform::UnknownPlatform),

    /// Post text missing, empty or whitespace-only.
    #[error("post_text must not be empty")]
    EmptyPostText,
}

impl PostInput {
    /// Validates raw labels coming from HTTP bodies or CSV rows.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for an unsupported platform or a blank
    /// post text.
    pub fn parse(platform: &str, post_text: &str) -> Result<Self, ValidationError> {
        let platform = platform.parse::<Platform>()?;
        Self::new(platform, post_text)
    }

    /// Validates the post text for an already-typed platform.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyPostText`] for a blank post text.
    pub fn new(platform: Platform, post_text: &str) -> Result<Self, ValidationError> {
        if post_text.trim().is_empty() {
            return Err(ValidationError::EmptyPostText);
        }
        Ok(Self {
            platform,
            post_text: post_text.to_string(),
        })
    }
}

/// A reply ready to be written; everything except the store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReply {
    /// Target platform.
    pub platform: Platform,
    /// Original post text.
    pub post_text: String,
    /// Trimmed generator output.
    pub generated_reply: String,
    /// Moment generation succeeded.
    pub timestamp: DateTime<Utc>,
}

impl NewReply {
    /// Stamps a successful generation with the current UTC time.
    #[must_use]
    pub fn generated_now(input: PostInput, generated_reply: String) -> Self {
        Self {
            platform: input.platform,
            post_text: input.post_text,
            generated_reply,
            timestamp: now_utc(),
        }
    }
}

/// A stored row of the `replies` table. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyRecord {
    /// Store-assigned, monotonically increasing id.
    pub id: i64,
    /// Target platform.
    pub platform: Platform,
    /// Original post text.
    pub post_text: String,
    /// Trimmed generator output.
    pub generated_reply: String,
    /// Moment generation succeeded.
    pub timestamp: DateTime<Utc>,
}

impl ReplyRecord {
    /// Attaches a store id to a written reply.
    #[must_use]
    pub fn from_new(id: i64, reply: NewReply) -> Self {
        Self {
            id,
            platform: reply.platform,
            post_text: reply.post_text,
            generated_reply: reply.generated_reply,
            timestamp: reply.timestamp,
        }
    }
}

/// Current UTC time at the precision the stores keep (microseconds).
#[must_use]
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Renders a timestamp as RFC 3339 with microseconds and a `Z` suffix.
///
/// This is the on-disk and on-the-wire form.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses the text written by [`format_timestamp`].
///
/// Any RFC 3339 offset is normalized to UTC. Offset-less ISO-8601 text,
/// as found in older databases, is read as UTC.
///
/// # Errors
///
/// Returns the underlying [`chrono::ParseError`] on malformed input.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").map(|ts| ts.and_utc())
        })
}
