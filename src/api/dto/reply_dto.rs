//! Reply request and response DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Platform, ReplyRecord, format_timestamp};

/// Request body for `POST /reply`.
///
/// Fields are kept as raw strings so validation failures render through
/// the common error envelope.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReplyRequest {
    /// One of `Twitter`, `LinkedIn`, `Instagram`.
    #[schema(example = "Twitter")]
    pub platform: String,
    /// Text of the post to reply to. Must not be blank.
    #[serde(default)]
    #[schema(example = "Just launched my new app! 🚀 So excited! #Tech")]
    pub post_text: String,
}

/// Response body for `POST /reply`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReplyResponse {
    /// Echo of the requested platform.
    pub platform: Platform,
    /// Echo of the requested post text.
    pub post_text: String,
    /// Trimmed generated reply.
    pub generated_reply: String,
    /// Generation time, RFC 3339 UTC.
    pub timestamp: String,
}

impl From<ReplyRecord> for ReplyResponse {
    fn from(record: ReplyRecord) -> Self {
        Self {
            platform: record.platform,
            timestamp: format_timestamp(&record.timestamp),
            post_text: record.post_text,
            generated_reply: record.generated_reply,
        }
    }
}

/// Query parameters for `GET /replies`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListRepliesParams {
    /// Only replies for this platform.
    #[serde(default)]
    pub platform: Option<String>,
    /// Maximum rows (1-100). Defaults to 20.
    #[serde(default)]
    pub limit: Option<u32>,
}

impl ListRepliesParams {
    /// Default page size.
    pub const DEFAULT_LIMIT: u32 = 20;
    /// Largest allowed page size.
    pub const MAX_LIMIT: u32 = 100;

    /// Clamps `limit` to `1..=100`.
    #[must_use]
    pub fn clamped_limit(&self) -> u32 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

/// One stored reply.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReplyRecordDto {
    /// Store-assigned id.
    pub id: i64,
    /// Target platform.
    pub platform: Platform,
    /// Original post text.
    pub post_text: String,
    /// Generated reply.
    pub generated_reply: String,
    /// Generation time, RFC 3339 UTC.
    pub timestamp: String,
}

impl From<ReplyRecord> for ReplyRecordDto {
    fn from(record: ReplyRecord) -> Self {
        Self {
            id: record.id,
            platform: record.platform,
            timestamp: format_timestamp(&record.timestamp),
            post_text: record.post_text,
            generated_reply: record.generated_reply,
        }
    }
}

/// Response body for `GET /replies`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReplyListResponse {
    /// Replies, newest first.
    pub replies: Vec<ReplyRecordDto>,
    /// Number of replies returned.
    pub total: usize,
}

/// Response body for `GET /replies/stats`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReplyStatsResponse {
    /// Total stored replies.
    pub total: u64,
    /// Replies per stored platform label.
    pub platforms: BTreeMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(ListRepliesParams::default().clamped_limit(), 20);
        let zero = ListRepliesParams {
            limit: Some(0),
            ..ListRepliesParams::default()
        };
        assert_eq!(zero.clamped_limit(), 1);
        let huge = ListRepliesParams {
            limit: Some(5000),
            ..ListRepliesParams::default()
        };
        assert_eq!(huge.clamped_limit(), 100);
    }

    #[test]
    fn missing_post_text_deserializes_as_empty() {
        let req: Result<CreateReplyRequest, _> =
            serde_json::from_str(r#"{"platform":"Twitter"}"#);
        assert!(req.is_ok_and(|r| r.post_text.is_empty()));
    }
}
