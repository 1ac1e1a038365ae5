//! Reply endpoint handlers: generate, list, stats.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreateReplyRequest, ListRepliesParams, ReplyListResponse, ReplyRecordDto, ReplyResponse,
    ReplyStatsResponse,
};
use crate::app_state::AppState;
use crate::domain::Platform;
use crate::error::{ErrorResponse, ReplyError};
use crate::persistence::ReplyQuery;

/// `POST /reply` — Generate, store and return a reply.
///
/// # Errors
///
/// Returns [`ReplyError::Validation`] for an unknown platform, blank post
/// text or malformed body, and a 500 envelope when generation or storage
/// fails.
#[utoipa::path(
    post,
    path = "/reply",
    tag = "Replies",
    summary = "Generate a reply",
    description = "Drafts a platform-appropriate reply to the given post, stores the interaction and returns it.",
    request_body = CreateReplyRequest,
    responses(
        (status = 200, description = "Reply generated", body = ReplyResponse),
        (status = 422, description = "Unsupported platform or empty post text", body = ErrorResponse),
        (status = 500, description = "Generation or storage failed", body = ErrorResponse),
    )
)]
pub async fn create_reply(
    State(state): State<AppState>,
    payload: Result<Json<CreateReplyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ReplyError> {
    let Json(req) = payload.map_err(|e| ReplyError::Validation(e.body_text()))?;

    let record = state
        .reply_service
        .create_reply_raw(&req.platform, &req.post_text)
        .await?;

    Ok(Json(ReplyResponse::from(record)))
}

/// `GET /replies` — List stored replies, newest first.
///
/// # Errors
///
/// Returns [`ReplyError::Validation`] for an unknown platform filter and a
/// 500 envelope on storage failure.
#[utoipa::path(
    get,
    path = "/replies",
    tag = "Replies",
    summary = "List replies",
    description = "Returns the most recent stored replies, optionally filtered by platform.",
    params(ListRepliesParams),
    responses(
        (status = 200, description = "Stored replies", body = ReplyListResponse),
        (status = 422, description = "Unsupported platform filter", body = ErrorResponse),
        (status = 500, description = "Storage failed", body = ErrorResponse),
    )
)]
pub async fn list_replies(
    State(state): State<AppState>,
    params: Result<Query<ListRepliesParams>, QueryRejection>,
) -> Result<impl IntoResponse, ReplyError> {
    let Query(params) = params.map_err(|e| ReplyError::Validation(e.body_text()))?;

    let mut query = ReplyQuery::newest(params.clamped_limit());
    if let Some(label) = params.platform.as_deref() {
        let platform = label
            .parse::<Platform>()
            .map_err(|e| ReplyError::Validation(e.to_string()))?;
        query = query.for_platform(platform);
    }

    let replies: Vec<ReplyRecordDto> = state
        .reply_service
        .list_replies(&query)
        .await?
        .into_iter()
        .map(ReplyRecordDto::from)
        .collect();

    Ok(Json(ReplyListResponse {
        total: replies.len(),
        replies,
    }))
}

/// `GET /replies/stats` — Reply counts per platform.
///
/// # Errors
///
/// Returns a 500 envelope on storage failure.
#[utoipa::path(
    get,
    path = "/replies/stats",
    tag = "Replies",
    summary = "Reply statistics",
    description = "Returns the total number of stored replies and the count per platform.",
    responses(
        (status = 200, description = "Counts", body = ReplyStatsResponse),
        (status = 500, description = "Storage failed", body = ErrorResponse),
    )
)]
pub async fn reply_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ReplyError> {
    let platforms = state.reply_service.platform_counts().await?;
    Ok(Json(ReplyStatsResponse {
        total: platforms.values().sum(),
        platforms,
    }))
}

/// Reply routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reply", post(create_reply))
        .route("/replies", get(list_replies))
        .route("/replies/stats", get(reply_stats))
}
