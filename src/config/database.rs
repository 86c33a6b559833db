//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without hand-written SQL. Creation is idempotent (`IF NOT EXISTS`),
//! which lets the server call it on every start.

use crate::entities::{
    Campaign, Chat, ChatMessage, Comment, Donation, News, Notification, NotificationRead, Organization,
    OrganizationRequest, PendingDonation, Post, PostLike, PostLikeColumn, ProcessedPayment, User,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, TableCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::{debug, info};

/// Default `SQLite` location used when neither `DATABASE_URL` nor config.toml set one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/nuoi_em.sqlite?mode=rwc";

/// Establishes a connection to the database at `database_url`.
///
/// For file-backed `SQLite` URLs the parent directory is created first.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(dir) = sqlite_parent_dir(database_url) {
        std::fs::create_dir_all(dir)?;
    }
    debug!("Connecting to database at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

fn sqlite_parent_dir(database_url: &str) -> Option<&Path> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next()?;
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

fn table_for<E: EntityTrait>(schema: &Schema, entity: E) -> TableCreateStatement {
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    statement
}

/// Creates all tables (and the composite like index) if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        table_for(&schema, PendingDonation),
        table_for(&schema, Donation),
        table_for(&schema, ProcessedPayment),
        table_for(&schema, Campaign),
        table_for(&schema, Organization),
        table_for(&schema, User),
        table_for(&schema, Notification),
        table_for(&schema, NotificationRead),
        table_for(&schema, OrganizationRequest),
        table_for(&schema, Post),
        table_for(&schema, PostLike),
        table_for(&schema, Comment),
        table_for(&schema, News),
        table_for(&schema, Chat),
        table_for(&schema, ChatMessage),
    ];
    for table in &tables {
        db.execute(builder.build(table)).await?;
    }

    // One like per user per post
    let like_index = Index::create()
        .name("idx_post_likes_post_user")
        .table(PostLike)
        .col(PostLikeColumn::PostId)
        .col(PostLikeColumn::UserId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&like_index)).await?;

    info!("Database tables ensured ({} tables).", tables.len());
    Ok(())
}
