//! Moderation console endpoints, mounted under `/api/admin` behind
//! [`require_admin`](super::caller::require_admin).

use super::{
    AppState,
    error::{ApiError, ApiResult},
};
use crate::{
    core::{
        campaign, chat, community,
        moderation::Decision,
        news::{self, NewsArticle},
        organization::{self, RequestReview},
    },
    entities::{
        CampaignModel, ChatMessageModel, ChatModel, NewsModel, OrganizationRequestModel, PostModel,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ReplyBody {
    pub text: String,
}

/// Body of every moderation endpoint.
#[derive(Debug, Deserialize)]
pub struct ModerationBody {
    pub status: Decision,
}

/// `GET /api/admin/campaigns/pending`
pub async fn pending_campaigns(State(state): State<AppState>) -> ApiResult<Vec<CampaignModel>> {
    Ok(Json(campaign::list_pending_campaigns(&state.db).await?))
}

/// `POST /api/admin/campaigns/:id/moderation`
pub async fn moderate_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ModerationBody>,
) -> ApiResult<CampaignModel> {
    Ok(Json(
        campaign::moderate_campaign(&state.db, &id, body.status).await?,
    ))
}

/// `POST /api/admin/posts/:id/moderation`
pub async fn moderate_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ModerationBody>,
) -> ApiResult<PostModel> {
    Ok(Json(community::moderate_post(&state.db, &id, body.status).await?))
}

/// `GET /api/admin/organization-requests`
pub async fn pending_organization_requests(
    State(state): State<AppState>,
) -> ApiResult<Vec<OrganizationRequestModel>> {
    Ok(Json(organization::list_pending_requests(&state.db).await?))
}

/// `POST /api/admin/organization-requests/:id/moderation`
pub async fn moderate_organization_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ModerationBody>,
) -> ApiResult<RequestReview> {
    Ok(Json(
        organization::moderate_request(&state.db, &id, body.status).await?,
    ))
}

/// `POST /api/admin/news`
pub async fn publish_news(
    State(state): State<AppState>,
    Json(body): Json<NewsArticle>,
) -> ApiResult<NewsModel> {
    Ok(Json(news::publish_news(&state.db, body).await?))
}

/// `PUT /api/admin/news/:id`
pub async fn update_news(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<NewsArticle>,
) -> ApiResult<NewsModel> {
    Ok(Json(news::update_news(&state.db, &id, body).await?))
}

/// `DELETE /api/admin/campaigns/:id`
pub async fn delete_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    campaign::delete_campaign(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/admin/posts/:id`
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    community::delete_post(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/admin/news/:id`
pub async fn delete_news(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    news::delete_news(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/admin/chats`
pub async fn list_chats(State(state): State<AppState>) -> ApiResult<Vec<ChatModel>> {
    Ok(Json(chat::list_chats(&state.db).await?))
}

/// `GET /api/admin/chats/:uid`
pub async fn read_chat(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> ApiResult<Vec<ChatMessageModel>> {
    Ok(Json(chat::read_as_admin(&state.db, &uid).await?))
}

/// `POST /api/admin/chats/:uid`
pub async fn reply_chat(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(body): Json<ReplyBody>,
) -> ApiResult<ChatMessageModel> {
    Ok(Json(
        chat::send_admin_message(&state.db, &uid, &body.text).await?,
    ))
}
