//! User profile business logic.
//!
//! Accounts are authenticated elsewhere; this module only keeps the profile
//! row that other features read names, avatars and roles from.

use crate::{
    entities::{User, UserColumn, UserRole, user},
    errors::{Error, Result},
};
use sea_orm::sea_query::Expr;
use sea_orm::{Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Editable profile fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub phone_number: String,
}

/// Creates the profile on first call, updates the editable fields afterwards.
///
/// Role and registration time are never changed here.
pub async fn upsert_profile(db: &DatabaseConnection, profile: UserProfile) -> Result<user::Model> {
    if profile.uid.trim().is_empty() {
        return Err(Error::Validation {
            message: "uid is required".to_string(),
        });
    }

    if let Some(existing) = User::find_by_id(profile.uid.clone()).one(db).await? {
        let mut active: user::ActiveModel = existing.into();
        active.email = Set(profile.email);
        active.full_name = Set(profile.full_name);
        active.avatar = Set(profile.avatar);
        active.phone_number = Set(profile.phone_number);
        return active.update(db).await.map_err(Into::into);
    }

    let created = user::ActiveModel {
        uid: Set(profile.uid),
        email: Set(profile.email),
        full_name: Set(profile.full_name),
        avatar: Set(profile.avatar),
        phone_number: Set(profile.phone_number),
        role: Set(UserRole::User),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(db)
    .await?;
    info!(uid = %created.uid, "Registered user profile");
    Ok(created)
}

/// Finds a profile by uid.
pub async fn get_user<C: ConnectionTrait>(db: &C, uid: &str) -> Result<Option<user::Model>> {
    User::find_by_id(uid.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Display name for notifications and posts, `fallback` when unknown or blank.
pub async fn display_name<C: ConnectionTrait>(db: &C, uid: &str, fallback: &str) -> Result<String> {
    Ok(get_user(db, uid)
        .await?
        .map(|u| u.full_name)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string()))
}

/// Sets the role of `uid`. Returns `false` when no such profile exists.
pub async fn set_role<C: ConnectionTrait>(db: &C, uid: &str, role: UserRole) -> Result<bool> {
    let result = User::update_many()
        .col_expr(UserColumn::Role, Expr::value(role))
        .filter(UserColumn::Uid.eq(uid))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_upsert_profile_keeps_role() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_user(&db, "u1").await?;
        assert_eq!(created.role, UserRole::User);

        set_role(&db, "u1", UserRole::Organization).await?;
        let updated = upsert_profile(
            &db,
            UserProfile {
                uid: "u1".to_string(),
                email: "new@example.com".to_string(),
                full_name: "Renamed".to_string(),
                avatar: String::new(),
                phone_number: String::new(),
            },
        )
        .await?;
        assert_eq!(updated.full_name, "Renamed");
        assert_eq!(updated.role, UserRole::Organization);
        assert_eq!(updated.created_at, created.created_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_role_unknown_user() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(!set_role(&db, "ghost", UserRole::Admin).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_display_name_fallback() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "u2").await?;
        assert_eq!(display_name(&db, "u2", "Ai đó").await?, "Test User u2");
        assert_eq!(display_name(&db, "nobody", "Ai đó").await?, "Ai đó");
        Ok(())
    }
}
