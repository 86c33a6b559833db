//! Community feed business logic - posts go through moderation, approved
//! posts collect likes and comments, and authors are notified of both.

use crate::{
    core::{
        moderation::{Decision, transition_error},
        notification, user,
    },
    entities::{
        Comment, CommentColumn, ModerationStatus, NotificationKind, Post, PostColumn, PostLike,
        PostLikeColumn, comment, post, post_like,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{QueryOrder, Set, SqlErr, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info, instrument};
use uuid::Uuid;

const DEFAULT_AUTHOR_NAME: &str = "Người dùng";
const UNKNOWN_ACTOR_NAME: &str = "Ai đó";
const COMMUNITY_LINK: &str = "/cong-dong";

/// A post as submitted by its author.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// An approved post with its like count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: post::Model,
    pub likes: u64,
}

/// Like state of a post after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub likes: u64,
}

fn post_not_found(id: &str) -> Error {
    Error::NotFound {
        entity: "post",
        id: id.to_string(),
    }
}

async fn find_post<C: ConnectionTrait>(db: &C, id: &str) -> Result<post::Model> {
    Post::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| post_not_found(id))
}

async fn count_likes<C: ConnectionTrait>(db: &C, post_id: &str) -> Result<u64> {
    PostLike::find()
        .filter(PostLikeColumn::PostId.eq(post_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Submits a post for review. Author name and avatar are copied from the profile.
#[instrument(skip(db, new_post))]
pub async fn create_post(
    db: &DatabaseConnection,
    user_id: &str,
    new_post: NewPost,
) -> Result<post::Model> {
    if new_post.content.trim().is_empty() && new_post.images.is_empty() {
        return Err(Error::Validation {
            message: "Post needs content or images".to_string(),
        });
    }

    let profile = user::get_user(db, user_id).await?;
    let author_name = profile
        .as_ref()
        .map(|u| u.full_name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_AUTHOR_NAME.to_string());
    let author_avatar = profile.map(|u| u.avatar).unwrap_or_default();

    let created = post::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        user_id: Set(user_id.to_string()),
        author_name: Set(author_name),
        author_avatar: Set(author_avatar),
        content: Set(new_post.content.trim().to_string()),
        images: Set(new_post.images.into()),
        comment_count: Set(0),
        status: Set(ModerationStatus::Pending),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;
    info!(post_id = %created.id, "Post submitted for review");
    Ok(created)
}

/// Approves or rejects a pending post. Approval notifies the author.
#[instrument(skip(db))]
pub async fn moderate_post(
    db: &DatabaseConnection,
    id: &str,
    decision: Decision,
) -> Result<post::Model> {
    let moved = Post::update_many()
        .col_expr(PostColumn::Status, Expr::value(decision.status()))
        .filter(PostColumn::Id.eq(id))
        .filter(PostColumn::Status.eq(ModerationStatus::Pending))
        .exec(db)
        .await?;
    let current = Post::find_by_id(id.to_string()).one(db).await?;
    if moved.rows_affected == 0 {
        return Err(match current {
            Some(p) => transition_error("post", id, Some(p.status)),
            None => post_not_found(id),
        });
    }
    let moderated = current.ok_or_else(|| post_not_found(id))?;
    info!(post_id = id, status = moderated.status.as_str(), "Post moderated");

    if decision.is_approval() {
        if let Err(e) = notification::notify(
            db,
            &moderated.user_id,
            NotificationKind::Approved,
            "Bài viết của bạn đã được duyệt và hiển thị trên cộng đồng.".to_string(),
            Some(COMMUNITY_LINK.to_string()),
        )
        .await
        {
            error!(post_id = id, "Failed to notify post author: {}", e);
        }
    }
    Ok(moderated)
}

/// Removes a post together with its likes and comments.
#[instrument(skip(db))]
pub async fn delete_post(db: &DatabaseConnection, id: &str) -> Result<()> {
    let txn = db.begin().await?;
    let deleted = Post::delete_by_id(id.to_string()).exec(&txn).await?;
    if deleted.rows_affected == 0 {
        return Err(post_not_found(id));
    }
    PostLike::delete_many()
        .filter(PostLikeColumn::PostId.eq(id))
        .exec(&txn)
        .await?;
    Comment::delete_many()
        .filter(CommentColumn::PostId.eq(id))
        .exec(&txn)
        .await?;
    txn.commit().await?;
    info!(post_id = id, "Post deleted");
    Ok(())
}

/// Approved posts, newest first, with like counts.
pub async fn list_approved_posts(db: &DatabaseConnection) -> Result<Vec<PostView>> {
    let posts = Post::find()
        .filter(PostColumn::Status.eq(ModerationStatus::Approved))
        .order_by_desc(PostColumn::CreatedAt)
        .all(db)
        .await?;

    let ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
    let mut likes: HashMap<String, u64> = HashMap::new();
    for like in PostLike::find()
        .filter(PostLikeColumn::PostId.is_in(ids))
        .all(db)
        .await?
    {
        *likes.entry(like.post_id).or_default() += 1;
    }

    Ok(posts
        .into_iter()
        .map(|post| {
            let count = likes.get(&post.id).copied().unwrap_or(0);
            PostView { post, likes: count }
        })
        .collect())
}

async fn notify_like(db: &DatabaseConnection, author_id: &str, liker_id: &str) -> Result<()> {
    let name = user::display_name(db, liker_id, UNKNOWN_ACTOR_NAME).await?;
    notification::notify(
        db,
        author_id,
        NotificationKind::Like,
        format!("{name} đã thích bài viết của bạn."),
        Some(COMMUNITY_LINK.to_string()),
    )
    .await?;
    Ok(())
}

/// Likes the post for `user_id`, or removes the like if it already exists.
///
/// A new like by someone other than the author notifies the author. The
/// notification is best-effort: the like stands even if it fails.
#[instrument(skip(db))]
pub async fn toggle_like(db: &DatabaseConnection, post_id: &str, user_id: &str) -> Result<LikeState> {
    let target = find_post(db, post_id).await?;
    if target.status != ModerationStatus::Approved {
        return Err(post_not_found(post_id));
    }

    let existing = PostLike::find()
        .filter(PostLikeColumn::PostId.eq(post_id))
        .filter(PostLikeColumn::UserId.eq(user_id))
        .one(db)
        .await?;

    let liked = match existing {
        Some(like) => {
            PostLike::delete_by_id(like.id).exec(db).await?;
            false
        }
        None => {
            let inserted = post_like::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                post_id: Set(post_id.to_string()),
                user_id: Set(user_id.to_string()),
            }
            .insert(db)
            .await;
            match inserted {
                Ok(_) => {
                    if target.user_id != user_id {
                        if let Err(e) = notify_like(db, &target.user_id, user_id).await {
                            error!(post_id, "Failed to notify post author of like: {}", e);
                        }
                    }
                }
                // A concurrent request liked it first
                Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {}
                Err(e) => return Err(e.into()),
            }
            true
        }
    };

    Ok(LikeState {
        liked,
        likes: count_likes(db, post_id).await?,
    })
}

/// Adds a comment and bumps the post's comment count in one transaction.
#[instrument(skip(db, content))]
pub async fn add_comment(
    db: &DatabaseConnection,
    post_id: &str,
    user_id: &str,
    content: &str,
) -> Result<comment::Model> {
    let content = content.trim();
    if content.is_empty() {
        return Err(Error::Validation {
            message: "Comment cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;
    let target = find_post(&txn, post_id).await?;
    if target.status != ModerationStatus::Approved {
        return Err(post_not_found(post_id));
    }

    let profile = user::get_user(&txn, user_id).await?;
    let author_name = profile
        .as_ref()
        .map(|u| u.full_name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_AUTHOR_NAME.to_string());

    let created = comment::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        post_id: Set(post_id.to_string()),
        user_id: Set(user_id.to_string()),
        author_name: Set(author_name),
        author_avatar: Set(profile.map(|u| u.avatar).unwrap_or_default()),
        content: Set(content.to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(&txn)
    .await?;

    Post::update_many()
        .col_expr(
            PostColumn::CommentCount,
            Expr::col(PostColumn::CommentCount).add(1),
        )
        .filter(PostColumn::Id.eq(post_id))
        .exec(&txn)
        .await?;

    if target.user_id != user_id {
        let name = user::display_name(&txn, user_id, UNKNOWN_ACTOR_NAME).await?;
        notification::notify(
            &txn,
            &target.user_id,
            NotificationKind::Comment,
            format!("{name} đã bình luận về bài viết của bạn."),
            Some(COMMUNITY_LINK.to_string()),
        )
        .await?;
    }

    txn.commit().await?;
    info!(post_id, comment_id = %created.id, "Comment added");
    Ok(created)
}

/// Comments of a post, oldest first.
pub async fn list_comments(db: &DatabaseConnection, post_id: &str) -> Result<Vec<comment::Model>> {
    Comment::find()
        .filter(CommentColumn::PostId.eq(post_id))
        .order_by_asc(CommentColumn::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::notification::list_for_user;
    use crate::test_utils::*;

    async fn approved_post(db: &DatabaseConnection, author: &str) -> Result<post::Model> {
        let created = create_post(
            db,
            author,
            NewPost {
                content: "Chuyến thiện nguyện tháng 10".to_string(),
                images: vec![],
            },
        )
        .await?;
        moderate_post(db, &created.id, Decision::Approved).await
    }

    #[tokio::test]
    async fn test_create_post_requires_content() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_post(
            &db,
            "u1",
            NewPost {
                content: "  ".to_string(),
                images: vec![],
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_post_author_defaults() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "u1").await?;
        let known = create_post(
            &db,
            "u1",
            NewPost {
                content: "xin chào".to_string(),
                images: vec![],
            },
        )
        .await?;
        assert_eq!(known.author_name, "Test User u1");
        assert_eq!(known.status, ModerationStatus::Pending);

        let stranger = create_post(
            &db,
            "ghost",
            NewPost {
                content: String::new(),
                images: vec!["https://img/1.png".to_string()],
            },
        )
        .await?;
        assert_eq!(stranger.author_name, DEFAULT_AUTHOR_NAME);
        Ok(())
    }

    #[tokio::test]
    async fn test_only_approved_posts_are_listed() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "author").await?;
        let shown = approved_post(&db, "author").await?;
        let hidden = create_post(
            &db,
            "author",
            NewPost {
                content: "spam".to_string(),
                images: vec![],
            },
        )
        .await?;
        moderate_post(&db, &hidden.id, Decision::Rejected).await?;

        let listed = list_approved_posts(&db).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].post.id, shown.id);

        let again = moderate_post(&db, &hidden.id, Decision::Approved).await;
        assert!(matches!(again, Err(Error::InvalidTransition { .. })));

        let feed = list_for_user(&db, "author").await?;
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].link.as_deref(), Some(COMMUNITY_LINK));
        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_like() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "author").await?;
        create_test_user(&db, "fan").await?;
        let post = approved_post(&db, "author").await?;

        let state = toggle_like(&db, &post.id, "fan").await?;
        assert_eq!(state, LikeState { liked: true, likes: 1 });
        assert_eq!(list_approved_posts(&db).await?[0].likes, 1);

        let state = toggle_like(&db, &post.id, "fan").await?;
        assert_eq!(state, LikeState { liked: false, likes: 0 });

        // Own likes do not notify
        toggle_like(&db, &post.id, "author").await?;

        let likes: Vec<_> = list_for_user(&db, "author")
            .await?
            .into_iter()
            .filter(|n| n.kind == NotificationKind::Like)
            .collect();
        assert_eq!(likes.len(), 1);
        assert_eq!(likes[0].message, "Test User fan đã thích bài viết của bạn.");
        Ok(())
    }

    #[tokio::test]
    async fn test_like_stands_when_notification_fails() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        create_test_user(&db, "author").await?;
        create_test_user(&db, "fan").await?;
        let post = approved_post(&db, "author").await?;

        db.execute_unprepared("DROP TABLE notifications").await?;

        let state = toggle_like(&db, &post.id, "fan").await?;
        assert_eq!(state, LikeState { liked: true, likes: 1 });
        assert_eq!(count_likes(&db, &post.id).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_comment_counts_and_notifies() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "author").await?;
        let post = approved_post(&db, "author").await?;

        add_comment(&db, &post.id, "anon", "Cố lên!").await?;
        add_comment(&db, &post.id, "author", "Cảm ơn").await?;

        let comments = list_comments(&db, &post.id).await?;
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].content, "Cố lên!");
        assert_eq!(find_post(&db, &post.id).await?.comment_count, 2);

        let notes: Vec<_> = list_for_user(&db, "author")
            .await?
            .into_iter()
            .filter(|n| n.kind == NotificationKind::Comment)
            .collect();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].message, "Ai đó đã bình luận về bài viết của bạn.");
        Ok(())
    }

    #[tokio::test]
    async fn test_comment_on_missing_post() -> Result<()> {
        let db = setup_test_db().await?;
        let result = add_comment(&db, "nope", "u1", "hi").await;
        assert!(matches!(result, Err(Error::NotFound { entity: "post", .. })));
        let result = add_comment(&db, "nope", "u1", " ").await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_post_removes_likes_and_comments() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "author").await?;
        let post = approved_post(&db, "author").await?;
        let other = approved_post(&db, "author").await?;
        toggle_like(&db, &post.id, "fan").await?;
        add_comment(&db, &post.id, "fan", "Hay quá").await?;
        add_comment(&db, &other.id, "fan", "Giữ lại").await?;

        delete_post(&db, &post.id).await?;
        let listed = list_approved_posts(&db).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].post.id, other.id);
        assert_eq!(count_likes(&db, &post.id).await?, 0);
        assert!(list_comments(&db, &post.id).await?.is_empty());
        assert_eq!(list_comments(&db, &other.id).await?.len(), 1);

        let again = delete_post(&db, &post.id).await;
        assert!(matches!(again, Err(Error::NotFound { entity: "post", .. })));
        Ok(())
    }
}
