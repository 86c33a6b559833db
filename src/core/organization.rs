//! Organization business logic - registration requests, their review and the
//! organization profile.

use crate::{
    core::{
        moderation::{Decision, transition_error},
        notification, user,
    },
    entities::{
        ModerationStatus, NotificationKind, Organization, OrganizationColumn,
        OrganizationRequest, OrganizationRequestColumn, UserRole, organization,
        organization_request,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Application submitted by a user who wants an organization account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganizationRequest {
    pub organization_name: String,
    pub description: String,
    #[serde(default)]
    pub logo: String,
    /// URL of the uploaded registration document
    #[serde(default)]
    pub document: String,
}

/// Editable organization profile fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationProfile {
    pub name: String,
    pub description: String,
    pub logo: String,
}

/// Result of reviewing a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestReview {
    pub request: organization_request::Model,
    /// Organization created by an approval
    pub organization: Option<organization::Model>,
}

/// Files a registration request. A user may only have one pending request.
#[instrument(skip(db, request))]
pub async fn submit_request(
    db: &DatabaseConnection,
    user_id: &str,
    request: NewOrganizationRequest,
) -> Result<organization_request::Model> {
    if request.organization_name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Organization name cannot be empty".to_string(),
        });
    }

    let open = OrganizationRequest::find()
        .filter(OrganizationRequestColumn::UserId.eq(user_id))
        .filter(OrganizationRequestColumn::Status.eq(ModerationStatus::Pending))
        .one(db)
        .await?;
    if open.is_some() {
        return Err(Error::Conflict {
            message: "Bạn đã gửi yêu cầu trước đó, vui lòng chờ duyệt.".to_string(),
        });
    }

    let created = organization_request::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        user_id: Set(user_id.to_string()),
        organization_name: Set(request.organization_name.trim().to_string()),
        description: Set(request.description),
        logo: Set(request.logo),
        document: Set(request.document),
        status: Set(ModerationStatus::Pending),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;
    info!(request_id = %created.id, "Organization request submitted");
    Ok(created)
}

/// Pending requests, oldest first.
pub async fn list_pending_requests(
    db: &DatabaseConnection,
) -> Result<Vec<organization_request::Model>> {
    OrganizationRequest::find()
        .filter(OrganizationRequestColumn::Status.eq(ModerationStatus::Pending))
        .order_by_asc(OrganizationRequestColumn::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Approves or rejects a pending request in one transaction.
///
/// Approval promotes the requester to the organization role and creates the
/// organization from the request. Either way the requester is notified.
#[instrument(skip(db))]
pub async fn moderate_request(
    db: &DatabaseConnection,
    id: &str,
    decision: Decision,
) -> Result<RequestReview> {
    let txn = db.begin().await?;

    let moved = OrganizationRequest::update_many()
        .col_expr(OrganizationRequestColumn::Status, Expr::value(decision.status()))
        .filter(OrganizationRequestColumn::Id.eq(id))
        .filter(OrganizationRequestColumn::Status.eq(ModerationStatus::Pending))
        .exec(&txn)
        .await?;
    let current = OrganizationRequest::find_by_id(id.to_string())
        .one(&txn)
        .await?;
    if moved.rows_affected == 0 {
        return Err(transition_error(
            "organization request",
            id,
            current.map(|r| r.status),
        ));
    }
    let request = current.ok_or_else(|| transition_error("organization request", id, None))?;

    let organization = if decision.is_approval() {
        if !user::set_role(&txn, &request.user_id, UserRole::Organization).await? {
            warn!(uid = %request.user_id, "Approved request for a user without profile");
        }
        let created = organization::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(request.organization_name.clone()),
            description: Set(request.description.clone()),
            logo: Set(request.logo.clone()),
            user_id: Set(request.user_id.clone()),
            campaign_count: Set(0),
            total_raised: Set(0),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;
        Some(created)
    } else {
        None
    };

    let message = if decision.is_approval() {
        format!(
            "Yêu cầu đăng ký tổ chức \"{}\" đã được duyệt!",
            request.organization_name
        )
    } else {
        format!(
            "Yêu cầu đăng ký tổ chức \"{}\" đã bị từ chối.",
            request.organization_name
        )
    };
    notification::notify(
        &txn,
        &request.user_id,
        NotificationKind::Approved,
        message,
        None,
    )
    .await?;

    txn.commit().await?;
    info!(request_id = id, status = request.status.as_str(), "Organization request reviewed");
    Ok(RequestReview {
        request,
        organization,
    })
}

/// Finds an organization by id.
pub async fn get_organization(
    db: &DatabaseConnection,
    id: &str,
) -> Result<Option<organization::Model>> {
    Organization::find_by_id(id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the organization owned by account `user_id`.
pub async fn find_by_owner(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Option<organization::Model>> {
    Organization::find()
        .filter(OrganizationColumn::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All organizations, largest fundraisers first.
pub async fn list_organizations(db: &DatabaseConnection) -> Result<Vec<organization::Model>> {
    Organization::find()
        .order_by_desc(OrganizationColumn::TotalRaised)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Updates name, description and logo. Aggregates are left untouched.
pub async fn update_profile(
    db: &DatabaseConnection,
    id: &str,
    profile: OrganizationProfile,
) -> Result<organization::Model> {
    if profile.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Organization name cannot be empty".to_string(),
        });
    }
    let existing = get_organization(db, id)
        .await?
        .ok_or_else(|| Error::OrganizationNotFound { id: id.to_string() })?;

    let mut active: organization::ActiveModel = existing.into();
    active.name = Set(profile.name.trim().to_string());
    active.description = Set(profile.description);
    active.logo = Set(profile.logo);
    active.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::notification::list_for_user;
    use crate::test_utils::*;

    fn sample_request(name: &str) -> NewOrganizationRequest {
        NewOrganizationRequest {
            organization_name: name.to_string(),
            description: "Hỗ trợ trẻ em vùng cao".to_string(),
            logo: "https://img/logo.png".to_string(),
            document: "https://files/doc.pdf".to_string(),
        }
    }

    #[tokio::test]
    async fn test_only_one_pending_request_per_user() -> Result<()> {
        let db = setup_test_db().await?;
        submit_request(&db, "u1", sample_request("Quỹ 1")).await?;
        let second = submit_request(&db, "u1", sample_request("Quỹ 2")).await;
        assert!(matches!(second, Err(Error::Conflict { .. })));
        assert_eq!(list_pending_requests(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_approve_request_creates_organization() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "u1").await?;
        let request = submit_request(&db, "u1", sample_request("Quỹ Ánh Sáng")).await?;

        let review = moderate_request(&db, &request.id, Decision::Approved).await?;
        assert_eq!(review.request.status, ModerationStatus::Approved);
        let org = review.organization.unwrap();
        assert_eq!(org.name, "Quỹ Ánh Sáng");
        assert_eq!(org.user_id, "u1");
        assert_eq!(org.total_raised, 0);

        let owner = user::get_user(&db, "u1").await?.unwrap();
        assert_eq!(owner.role, UserRole::Organization);
        assert_eq!(find_by_owner(&db, "u1").await?.unwrap().id, org.id);

        let feed = list_for_user(&db, "u1").await?;
        assert_eq!(feed.len(), 1);
        assert!(feed[0].message.contains("đã được duyệt"));
        Ok(())
    }

    #[tokio::test]
    async fn test_reject_request_only_notifies() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "u2").await?;
        let request = submit_request(&db, "u2", sample_request("Quỹ X")).await?;

        let review = moderate_request(&db, &request.id, Decision::Rejected).await?;
        assert!(review.organization.is_none());
        assert!(list_organizations(&db).await?.is_empty());
        assert_eq!(
            user::get_user(&db, "u2").await?.unwrap().role,
            UserRole::User
        );
        let feed = list_for_user(&db, "u2").await?;
        assert!(feed[0].message.contains("bị từ chối"));

        let again = moderate_request(&db, &request.id, Decision::Approved).await;
        assert!(matches!(again, Err(Error::InvalidTransition { .. })));
        assert!(list_organizations(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile_keeps_totals() -> Result<()> {
        let db = setup_test_db().await?;
        let org = create_test_organization(&db, "Quỹ Cũ").await?;
        let updated = update_profile(
            &db,
            &org.id,
            OrganizationProfile {
                name: "Quỹ Mới".to_string(),
                description: "mô tả".to_string(),
                logo: String::new(),
            },
        )
        .await?;
        assert_eq!(updated.name, "Quỹ Mới");
        assert_eq!(updated.total_raised, org.total_raised);
        Ok(())
    }
}
