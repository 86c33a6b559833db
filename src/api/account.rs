//! Endpoints acting on behalf of a signed-in account.

use super::{AppState, caller::Caller, error::ApiResult};
use crate::{
    core::{
        campaign::{self, NewCampaign},
        chat,
        community::{self, LikeState, NewPost},
        donation,
        notification::{self, NotificationView},
        organization::{self, NewOrganizationRequest, OrganizationProfile},
        user::{self, UserProfile},
    },
    entities::{
        CampaignModel, ChatMessageModel, CommentModel, DonationModel, OrganizationModel,
        OrganizationRequestModel, PostModel, UserModel,
    },
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub phone_number: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub text: String,
}

async fn owned_organization(
    db: &DatabaseConnection,
    caller: &Caller,
    id: &str,
) -> Result<OrganizationModel> {
    let found = organization::get_organization(db, id)
        .await?
        .ok_or_else(|| Error::OrganizationNotFound { id: id.to_string() })?;
    if found.user_id != caller.0 {
        return Err(Error::Forbidden {
            message: "not the owner of this organization".to_string(),
        });
    }
    Ok(found)
}

/// Campaign `id`, provided the caller owns the organization running it.
async fn owned_campaign(db: &DatabaseConnection, caller: &Caller, id: &str) -> Result<CampaignModel> {
    let found = campaign::get_campaign(db, id)
        .await?
        .ok_or_else(|| Error::CampaignNotFound { id: id.to_string() })?;
    let Some(organization_id) = found.organization_id.as_deref() else {
        return Err(Error::Forbidden {
            message: "campaign has no owning organization".to_string(),
        });
    };
    owned_organization(db, caller, organization_id).await?;
    Ok(found)
}

/// `PUT /api/users/me`
pub async fn update_profile(
    State(state): State<AppState>,
    caller: Caller,
    Json(body): Json<ProfileBody>,
) -> ApiResult<UserModel> {
    let profile = UserProfile {
        uid: caller.0,
        email: body.email,
        full_name: body.full_name,
        avatar: body.avatar,
        phone_number: body.phone_number,
    };
    Ok(Json(user::upsert_profile(&state.db, profile).await?))
}

/// `GET /api/users/:uid/donations`
pub async fn user_donations(
    State(state): State<AppState>,
    caller: Caller,
    Path(uid): Path<String>,
) -> ApiResult<Vec<DonationModel>> {
    caller.ensure_is(&uid)?;
    Ok(Json(donation::list_for_user(&state.db, &uid).await?))
}

/// `GET /api/users/:uid/notifications`
pub async fn user_notifications(
    State(state): State<AppState>,
    caller: Caller,
    Path(uid): Path<String>,
) -> ApiResult<Vec<NotificationView>> {
    caller.ensure_is(&uid)?;
    Ok(Json(notification::list_for_user(&state.db, &uid).await?))
}

/// `POST /api/notifications/:id/read`
pub async fn mark_notification_read(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> std::result::Result<StatusCode, super::error::ApiError> {
    notification::mark_read(&state.db, &caller.0, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/posts`
pub async fn create_post(
    State(state): State<AppState>,
    caller: Caller,
    Json(body): Json<NewPost>,
) -> ApiResult<PostModel> {
    Ok(Json(community::create_post(&state.db, &caller.0, body).await?))
}

/// `POST /api/posts/:id/like`
pub async fn toggle_like(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<LikeState> {
    Ok(Json(community::toggle_like(&state.db, &id, &caller.0).await?))
}

/// `POST /api/posts/:id/comments`
pub async fn add_comment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(body): Json<CommentBody>,
) -> ApiResult<CommentModel> {
    Ok(Json(
        community::add_comment(&state.db, &id, &caller.0, &body.content).await?,
    ))
}

/// `POST /api/organization-requests`
pub async fn submit_organization_request(
    State(state): State<AppState>,
    caller: Caller,
    Json(body): Json<NewOrganizationRequest>,
) -> ApiResult<OrganizationRequestModel> {
    Ok(Json(
        organization::submit_request(&state.db, &caller.0, body).await?,
    ))
}

/// `PUT /api/organizations/:id`
pub async fn update_organization(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(body): Json<OrganizationProfile>,
) -> ApiResult<OrganizationModel> {
    owned_organization(&state.db, &caller, &id).await?;
    Ok(Json(organization::update_profile(&state.db, &id, body).await?))
}

/// `POST /api/organizations/:id/campaigns`
pub async fn create_campaign(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(body): Json<NewCampaign>,
) -> ApiResult<CampaignModel> {
    owned_organization(&state.db, &caller, &id).await?;
    Ok(Json(campaign::create_campaign(&state.db, &id, body).await?))
}

/// `PUT /api/campaigns/:id`
pub async fn update_campaign(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(body): Json<NewCampaign>,
) -> ApiResult<CampaignModel> {
    owned_campaign(&state.db, &caller, &id).await?;
    Ok(Json(campaign::update_campaign(&state.db, &id, body).await?))
}

/// `DELETE /api/campaigns/:id`
pub async fn delete_campaign(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> std::result::Result<StatusCode, super::error::ApiError> {
    owned_campaign(&state.db, &caller, &id).await?;
    campaign::delete_campaign(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/users/:uid/chat`
pub async fn read_chat(
    State(state): State<AppState>,
    caller: Caller,
    Path(uid): Path<String>,
) -> ApiResult<Vec<ChatMessageModel>> {
    caller.ensure_is(&uid)?;
    Ok(Json(chat::read_as_user(&state.db, &uid).await?))
}

/// `POST /api/users/:uid/chat`
pub async fn send_chat_message(
    State(state): State<AppState>,
    caller: Caller,
    Path(uid): Path<String>,
    Json(body): Json<ChatBody>,
) -> ApiResult<ChatMessageModel> {
    caller.ensure_is(&uid)?;
    Ok(Json(
        chat::send_user_message(&state.db, &uid, &body.text).await?,
    ))
}
