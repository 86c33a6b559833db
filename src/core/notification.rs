//! Notification business logic.
//!
//! Direct notifications are one row per recipient. Announcements that concern
//! every user (a new campaign, a news article) are stored once as a broadcast
//! and merged into each user's feed at read time, so publishing costs one write
//! regardless of how many users exist. A user sees every broadcast created at
//! or after their registration.

use crate::{
    entities::{
        Notification, NotificationColumn, NotificationKind, NotificationRead,
        NotificationReadColumn, User, notification, notification_read,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

/// One entry of a user's feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub link: Option<String>,
    pub read: bool,
    /// Whether the entry is a broadcast rather than addressed to the user
    pub broadcast: bool,
    pub created_at: DateTime<Utc>,
}

async fn insert<C: ConnectionTrait>(
    db: &C,
    recipient: Option<String>,
    kind: NotificationKind,
    message: String,
    link: Option<String>,
) -> Result<notification::Model> {
    notification::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        user_id: Set(recipient),
        kind: Set(kind),
        message: Set(message),
        read: Set(false),
        link: Set(link),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Sends a notification to a single user.
pub async fn notify<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    kind: NotificationKind,
    message: String,
    link: Option<String>,
) -> Result<notification::Model> {
    let created = insert(db, Some(user_id.to_string()), kind, message, link).await?;
    debug!(user_id, kind = ?kind, "Sent notification {}", created.id);
    Ok(created)
}

/// Publishes a notification to every registered user.
pub async fn broadcast<C: ConnectionTrait>(
    db: &C,
    kind: NotificationKind,
    message: String,
    link: Option<String>,
) -> Result<notification::Model> {
    let created = insert(db, None, kind, message, link).await?;
    info!(kind = ?kind, "Broadcast notification {}", created.id);
    Ok(created)
}

/// Returns the user's feed, newest first.
pub async fn list_for_user(db: &DatabaseConnection, user_id: &str) -> Result<Vec<NotificationView>> {
    let user = User::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "user",
            id: user_id.to_string(),
        })?;

    let rows = Notification::find()
        .filter(
            Condition::any()
                .add(NotificationColumn::UserId.eq(user_id))
                .add(
                    Condition::all()
                        .add(NotificationColumn::UserId.is_null())
                        .add(NotificationColumn::CreatedAt.gte(user.created_at)),
                ),
        )
        .order_by_desc(NotificationColumn::CreatedAt)
        .all(db)
        .await?;

    let receipts: HashSet<String> = NotificationRead::find()
        .filter(NotificationReadColumn::UserId.eq(user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|r| r.notification_id)
        .collect();

    Ok(rows
        .into_iter()
        .map(|n| {
            let broadcast = n.user_id.is_none();
            let read = if broadcast {
                receipts.contains(&n.id)
            } else {
                n.read
            };
            NotificationView {
                id: n.id,
                kind: n.kind,
                message: n.message,
                link: n.link,
                read,
                broadcast,
                created_at: n.created_at,
            }
        })
        .collect())
}

/// Number of unread entries in the user's feed.
pub async fn unread_count(db: &DatabaseConnection, user_id: &str) -> Result<usize> {
    Ok(list_for_user(db, user_id)
        .await?
        .iter()
        .filter(|n| !n.read)
        .count())
}

/// Marks one feed entry as read for `user_id`. Marking twice is a no-op.
pub async fn mark_read(db: &DatabaseConnection, user_id: &str, notification_id: &str) -> Result<()> {
    let not_found = || Error::NotFound {
        entity: "notification",
        id: notification_id.to_string(),
    };
    let found = Notification::find_by_id(notification_id.to_string())
        .one(db)
        .await?
        .ok_or_else(not_found)?;

    match found.user_id.as_deref() {
        Some(recipient) if recipient == user_id => {
            if !found.read {
                let mut active: notification::ActiveModel = found.into();
                active.read = Set(true);
                active.update(db).await?;
            }
        }
        // Someone else's notification
        Some(_) => return Err(not_found()),
        None => {
            let already = NotificationRead::find()
                .filter(NotificationReadColumn::NotificationId.eq(notification_id))
                .filter(NotificationReadColumn::UserId.eq(user_id))
                .one(db)
                .await?;
            if already.is_none() {
                notification_read::ActiveModel {
                    id: Set(Uuid::new_v4().to_string()),
                    notification_id: Set(notification_id.to_string()),
                    user_id: Set(user_id.to_string()),
                    read_at: Set(Utc::now()),
                }
                .insert(db)
                .await?;
            }
        }
    }
    Ok(())
}
