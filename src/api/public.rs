//! Read-only endpoints for anonymous visitors.

use super::{
    AppState,
    error::{ApiError, ApiResult},
};
use crate::{
    core::{
        campaign,
        community::{self, PostView},
        donation::{self, CampaignAudit, DonationView, TopDonor},
        news, organization,
    },
    entities::{CampaignModel, CommentModel, NewsModel, OrganizationModel},
    errors::Error,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

const DEFAULT_TOP_DONORS: usize = 3;
const MAX_TOP_DONORS: usize = 50;

#[derive(Debug, Deserialize)]
pub struct TopDonorsQuery {
    pub limit: Option<usize>,
}

/// `GET /healthz`
pub async fn health() -> &'static str {
    "OK"
}

/// `GET /api/campaigns`
pub async fn list_campaigns(State(state): State<AppState>) -> ApiResult<Vec<CampaignModel>> {
    Ok(Json(campaign::list_approved_campaigns(&state.db).await?))
}

/// `GET /api/campaigns/:id`
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<CampaignModel> {
    let found = campaign::get_campaign(&state.db, &id).await?;
    found
        .map(Json)
        .ok_or_else(|| ApiError(Error::CampaignNotFound { id }))
}

/// `GET /api/campaigns/:id/donations`
pub async fn campaign_donations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<DonationView>> {
    Ok(Json(donation::list_for_campaign(&state.db, &id).await?))
}

/// `GET /api/campaigns/:id/top-donors?limit=n`
pub async fn campaign_top_donors(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<TopDonorsQuery>,
) -> ApiResult<Vec<TopDonor>> {
    let limit = query.limit.unwrap_or(DEFAULT_TOP_DONORS).min(MAX_TOP_DONORS);
    Ok(Json(donation::top_donors(&state.db, &id, limit).await?))
}

/// `GET /api/campaigns/:id/audit`
pub async fn campaign_audit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<CampaignAudit> {
    Ok(Json(donation::audit_campaign(&state.db, &id).await?))
}

/// `GET /api/organizations`
pub async fn list_organizations(
    State(state): State<AppState>,
) -> ApiResult<Vec<OrganizationModel>> {
    Ok(Json(organization::list_organizations(&state.db).await?))
}

/// `GET /api/organizations/:id`
pub async fn get_organization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<OrganizationModel> {
    let found = organization::get_organization(&state.db, &id).await?;
    found
        .map(Json)
        .ok_or_else(|| ApiError(Error::OrganizationNotFound { id }))
}

/// `GET /api/organizations/:id/campaigns`
pub async fn organization_campaigns(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<CampaignModel>> {
    Ok(Json(
        campaign::list_campaigns_for_organization(&state.db, &id).await?,
    ))
}

/// `GET /api/news`
pub async fn list_news(State(state): State<AppState>) -> ApiResult<Vec<NewsModel>> {
    Ok(Json(news::list_news(&state.db).await?))
}

/// `GET /api/news/:id`
pub async fn get_news(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<NewsModel> {
    let found = news::get_news(&state.db, &id).await?;
    found
        .map(Json)
        .ok_or_else(|| {
            ApiError(Error::NotFound {
                entity: "news",
                id,
            })
        })
}

/// `GET /api/posts`
pub async fn list_posts(State(state): State<AppState>) -> ApiResult<Vec<PostView>> {
    Ok(Json(community::list_approved_posts(&state.db).await?))
}

/// `GET /api/posts/:id/comments`
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<CommentModel>> {
    Ok(Json(community::list_comments(&state.db, &id).await?))
}
