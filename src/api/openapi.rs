//! OpenAPI document for the REST surface.

use axum::Json;
use utoipa::OpenApi;

use crate::api::dto::{
    CreateReplyRequest, ReplyListResponse, ReplyRecordDto, ReplyResponse, ReplyStatsResponse,
};
use crate::api::handlers::{reply, system};
use crate::domain::Platform;
use crate::error::ErrorResponse;

/// Generated OpenAPI specification.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Social Media Reply Generator",
        description = "Drafts human-sounding replies to social media posts and records every interaction."
    ),
    paths(
        reply::create_reply,
        reply::list_replies,
        reply::reply_stats,
        system::root_handler,
        system::health_handler,
    ),
    components(schemas(
        Platform,
        CreateReplyRequest,
        ReplyResponse,
        ReplyRecordDto,
        ReplyListResponse,
        ReplyStatsResponse,
        ErrorResponse,
    )),
    tags(
        (name = "Replies", description = "Reply generation and history"),
        (name = "System", description = "Liveness and health"),
    )
)]
pub struct ApiDoc;

/// `GET /api-docs/openapi.json` — The OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
