//! News articles. Publishing announces the article to every user.

use crate::{
    core::notification,
    entities::{News, NewsColumn, NotificationKind, news},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// Article fields written by an admin.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub summary: String,
    pub content: String,
}

fn validate(article: &NewsArticle) -> Result<()> {
    if article.title.trim().is_empty() {
        return Err(Error::Validation {
            message: "News title cannot be empty".to_string(),
        });
    }
    Ok(())
}

fn news_not_found(id: &str) -> Error {
    Error::NotFound {
        entity: "news",
        id: id.to_string(),
    }
}

/// Publishes an article and broadcasts it.
#[instrument(skip(db, article), fields(title = %article.title))]
pub async fn publish_news(db: &DatabaseConnection, article: NewsArticle) -> Result<news::Model> {
    validate(&article)?;
    let created = news::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        title: Set(article.title.trim().to_string()),
        category: Set(article.category),
        image: Set(article.image),
        summary: Set(article.summary),
        content: Set(article.content),
        date: Set(Utc::now()),
    }
    .insert(db)
    .await?;
    info!(news_id = %created.id, "News published");

    if let Err(e) = notification::broadcast(
        db,
        NotificationKind::NewNews,
        format!("Tin tức mới: {}", created.title),
        Some(format!("/tin-tuc/{}", created.id)),
    )
    .await
    {
        error!(news_id = %created.id, "Failed to announce news: {}", e);
    }
    Ok(created)
}

/// Replaces an article's fields. The publication date is kept.
pub async fn update_news(
    db: &DatabaseConnection,
    id: &str,
    article: NewsArticle,
) -> Result<news::Model> {
    validate(&article)?;
    let existing = get_news(db, id).await?.ok_or_else(|| news_not_found(id))?;
    let mut active: news::ActiveModel = existing.into();
    active.title = Set(article.title.trim().to_string());
    active.category = Set(article.category);
    active.image = Set(article.image);
    active.summary = Set(article.summary);
    active.content = Set(article.content);
    active.update(db).await.map_err(Into::into)
}

/// Removes an article. Announcements already sent keep their link.
pub async fn delete_news(db: &DatabaseConnection, id: &str) -> Result<()> {
    let deleted = News::delete_by_id(id.to_string()).exec(db).await?;
    if deleted.rows_affected == 0 {
        return Err(news_not_found(id));
    }
    info!(news_id = id, "News deleted");
    Ok(())
}

/// All articles, newest first.
pub async fn list_news(db: &DatabaseConnection) -> Result<Vec<news::Model>> {
    News::find()
        .order_by_desc(NewsColumn::Date)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn get_news(db: &DatabaseConnection, id: &str) -> Result<Option<news::Model>> {
    News::find_by_id(id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}
