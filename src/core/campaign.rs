//! Campaign business logic - creation by organizations, public listings and
//! admin moderation.
//!
//! Nothing in this module writes `raised` or `donors` after creation; those
//! columns belong to the ledger writer.

use crate::{
    core::{
        moderation::{Decision, transition_error},
        notification,
    },
    entities::{
        Campaign, CampaignColumn, ModerationStatus, NotificationKind, Organization,
        OrganizationColumn, campaign,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// Fields an organization submits for a new campaign.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
    pub title: String,
    pub description: String,
    pub goal: i64,
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub story_images: Vec<String>,
    pub date_end: DateTime<Utc>,
}

fn validate(campaign: &NewCampaign) -> Result<()> {
    if campaign.title.trim().is_empty() {
        return Err(Error::Validation {
            message: "Campaign title cannot be empty".to_string(),
        });
    }
    if campaign.goal <= 0 {
        return Err(Error::InvalidAmount {
            amount: campaign.goal,
        });
    }
    Ok(())
}

/// Creates a pending campaign for `organization_id` with zeroed aggregates.
///
/// The organization's `campaign_count` is bumped in the same transaction.
#[instrument(skip(db, campaign), fields(title = %campaign.title))]
pub async fn create_campaign(
    db: &DatabaseConnection,
    organization_id: &str,
    campaign: NewCampaign,
) -> Result<campaign::Model> {
    validate(&campaign)?;

    let txn = db.begin().await?;

    let counted = Organization::update_many()
        .col_expr(
            OrganizationColumn::CampaignCount,
            Expr::col(OrganizationColumn::CampaignCount).add(1),
        )
        .filter(OrganizationColumn::Id.eq(organization_id))
        .exec(&txn)
        .await?;
    if counted.rows_affected == 0 {
        return Err(Error::OrganizationNotFound {
            id: organization_id.to_string(),
        });
    }

    let created = campaign::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        title: Set(campaign.title.trim().to_string()),
        description: Set(campaign.description),
        goal: Set(campaign.goal),
        raised: Set(0),
        donors: Set(0),
        organization_id: Set(Some(organization_id.to_string())),
        status: Set(ModerationStatus::Pending),
        category: Set(campaign.category),
        image: Set(campaign.image),
        story_images: Set(campaign.story_images.into()),
        date_created: Set(Utc::now()),
        date_end: Set(campaign.date_end),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(campaign_id = %created.id, organization_id, "Campaign submitted for review");
    Ok(created)
}

/// Replaces the editable fields of a campaign.
///
/// Only the story fields are written, so donations booked concurrently keep
/// their `raised` and `donors` increments. Review state is left as is.
#[instrument(skip(db, changes), fields(title = %changes.title))]
pub async fn update_campaign(
    db: &DatabaseConnection,
    id: &str,
    changes: NewCampaign,
) -> Result<campaign::Model> {
    validate(&changes)?;
    let existing = get_campaign(db, id)
        .await?
        .ok_or_else(|| Error::CampaignNotFound { id: id.to_string() })?;

    let mut active: campaign::ActiveModel = existing.into();
    active.title = Set(changes.title.trim().to_string());
    active.description = Set(changes.description);
    active.goal = Set(changes.goal);
    active.category = Set(changes.category);
    active.image = Set(changes.image);
    active.story_images = Set(changes.story_images.into());
    active.date_end = Set(changes.date_end);
    let updated = active.update(db).await?;
    info!(campaign_id = id, "Campaign updated");
    Ok(updated)
}

/// Deletes a campaign that has not received any donation, and decrements its
/// organization's `campaign_count` in the same transaction.
///
/// Campaigns with donations are kept so the ledger and the organization's
/// `total_raised` stay consistent.
#[instrument(skip(db))]
pub async fn delete_campaign(db: &DatabaseConnection, id: &str) -> Result<()> {
    let txn = db.begin().await?;

    let existing = Campaign::find_by_id(id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::CampaignNotFound { id: id.to_string() })?;

    // `donors` moves together with every booked donation
    let deleted = Campaign::delete_many()
        .filter(CampaignColumn::Id.eq(id))
        .filter(CampaignColumn::Donors.eq(0))
        .exec(&txn)
        .await?;
    if deleted.rows_affected == 0 {
        return Err(Error::Conflict {
            message: "Không thể xoá dự án đã nhận quyên góp.".to_string(),
        });
    }

    if let Some(organization_id) = &existing.organization_id {
        Organization::update_many()
            .col_expr(
                OrganizationColumn::CampaignCount,
                Expr::col(OrganizationColumn::CampaignCount).sub(1),
            )
            .filter(OrganizationColumn::Id.eq(organization_id.as_str()))
            .filter(OrganizationColumn::CampaignCount.gt(0))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    info!(campaign_id = id, "Campaign deleted");
    Ok(())
}

/// Finds a campaign by id regardless of status.
pub async fn get_campaign(db: &DatabaseConnection, id: &str) -> Result<Option<campaign::Model>> {
    Campaign::find_by_id(id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Publicly visible campaigns, newest first.
pub async fn list_approved_campaigns(db: &DatabaseConnection) -> Result<Vec<campaign::Model>> {
    list_by_status(db, ModerationStatus::Approved).await
}

/// Campaigns awaiting review, newest first.
pub async fn list_pending_campaigns(db: &DatabaseConnection) -> Result<Vec<campaign::Model>> {
    list_by_status(db, ModerationStatus::Pending).await
}

async fn list_by_status(
    db: &DatabaseConnection,
    status: ModerationStatus,
) -> Result<Vec<campaign::Model>> {
    Campaign::find()
        .filter(CampaignColumn::Status.eq(status))
        .order_by_desc(CampaignColumn::DateCreated)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All campaigns of one organization, for its dashboard.
pub async fn list_campaigns_for_organization(
    db: &DatabaseConnection,
    organization_id: &str,
) -> Result<Vec<campaign::Model>> {
    Campaign::find()
        .filter(CampaignColumn::OrganizationId.eq(organization_id))
        .order_by_desc(CampaignColumn::DateCreated)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Approves or rejects a pending campaign.
///
/// Approval announces the campaign to every user. The announcement is
/// best-effort: a failure is logged and the decision still stands.
#[instrument(skip(db))]
pub async fn moderate_campaign(
    db: &DatabaseConnection,
    id: &str,
    decision: Decision,
) -> Result<campaign::Model> {
    let moved = Campaign::update_many()
        .col_expr(CampaignColumn::Status, Expr::value(decision.status()))
        .filter(CampaignColumn::Id.eq(id))
        .filter(CampaignColumn::Status.eq(ModerationStatus::Pending))
        .exec(db)
        .await?;

    let current = get_campaign(db, id).await?;
    if moved.rows_affected == 0 {
        return Err(match current {
            Some(c) => transition_error("campaign", id, Some(c.status)),
            None => Error::CampaignNotFound { id: id.to_string() },
        });
    }
    let campaign = current.ok_or_else(|| Error::CampaignNotFound { id: id.to_string() })?;
    info!(campaign_id = id, status = campaign.status.as_str(), "Campaign moderated");

    if decision.is_approval() {
        if let Err(e) = notification::broadcast(
            db,
            NotificationKind::NewCampaign,
            format!("Dự án mới: {}", campaign.title),
            Some(format!("/du-an/{}", campaign.id)),
        )
        .await
        {
            error!(campaign_id = id, "Failed to announce approved campaign: {}", e);
        }
    }
    Ok(campaign)
}
