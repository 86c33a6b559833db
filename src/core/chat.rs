//! Support chat between an account and the platform admins.
//!
//! Each account has at most one thread, opened by its first message. Each side
//! has an unread counter that the other side's messages increment and reading
//! the thread resets.

use crate::{
    core::user,
    entities::{Chat, ChatColumn, ChatMessage, ChatMessageColumn, ChatSender, chat, chat_message},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const DEFAULT_USER_NAME: &str = "Người dùng";

fn chat_not_found(user_id: &str) -> Error {
    Error::NotFound {
        entity: "chat",
        id: user_id.to_string(),
    }
}

fn validate(text: &str) -> Result<&str> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::Validation {
            message: "Message cannot be empty".to_string(),
        });
    }
    Ok(text)
}

async fn append<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    sender: ChatSender,
    text: &str,
) -> Result<chat_message::Model> {
    let now = Utc::now();
    let message = chat_message::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        chat_user_id: Set(user_id.to_string()),
        sender: Set(sender),
        text: Set(text.to_string()),
        created_at: Set(now),
    }
    .insert(db)
    .await?;

    let unread = match sender {
        ChatSender::User => ChatColumn::UnreadAdmin,
        ChatSender::Admin => ChatColumn::UnreadUser,
    };
    let touched = Chat::update_many()
        .col_expr(ChatColumn::LastMessage, Expr::value(text))
        .col_expr(ChatColumn::UpdatedAt, Expr::value(now))
        .col_expr(unread, Expr::col(unread).add(1))
        .filter(ChatColumn::UserId.eq(user_id))
        .exec(db)
        .await?;
    if touched.rows_affected == 0 {
        return Err(chat_not_found(user_id));
    }
    Ok(message)
}

/// Posts a message from `user_id` to support, opening the thread if needed.
#[instrument(skip(db, text))]
pub async fn send_user_message(
    db: &DatabaseConnection,
    user_id: &str,
    text: &str,
) -> Result<chat_message::Model> {
    let text = validate(text)?;
    let txn = db.begin().await?;

    let profile = user::get_user(&txn, user_id).await?;
    let user_name = profile
        .as_ref()
        .map(|u| u.full_name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_USER_NAME.to_string());
    let thread = chat::ActiveModel {
        user_id: Set(user_id.to_string()),
        user_name: Set(user_name),
        user_email: Set(profile.map(|u| u.email).unwrap_or_default()),
        last_message: Set(String::new()),
        unread_admin: Set(0),
        unread_user: Set(0),
        updated_at: Set(Utc::now()),
    };
    Chat::insert(thread)
        .on_conflict(OnConflict::column(ChatColumn::UserId).do_nothing().to_owned())
        .exec_without_returning(&txn)
        .await?;

    let message = append(&txn, user_id, ChatSender::User, text).await?;
    txn.commit().await?;
    debug!(user_id, message_id = %message.id, "Support message received");
    Ok(message)
}

/// Posts an admin reply into an existing thread.
#[instrument(skip(db, text))]
pub async fn send_admin_message(
    db: &DatabaseConnection,
    user_id: &str,
    text: &str,
) -> Result<chat_message::Model> {
    let text = validate(text)?;
    let txn = db.begin().await?;
    let message = append(&txn, user_id, ChatSender::Admin, text).await?;
    txn.commit().await?;
    info!(user_id, message_id = %message.id, "Support reply sent");
    Ok(message)
}

async fn messages<C: ConnectionTrait>(db: &C, user_id: &str) -> Result<Vec<chat_message::Model>> {
    ChatMessage::find()
        .filter(ChatMessageColumn::ChatUserId.eq(user_id))
        .order_by_asc(ChatMessageColumn::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The account's own thread, oldest message first. Clears the account's unread counter.
///
/// An account that never wrote has an empty thread.
pub async fn read_as_user(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<chat_message::Model>> {
    Chat::update_many()
        .col_expr(ChatColumn::UnreadUser, Expr::value(0))
        .filter(ChatColumn::UserId.eq(user_id))
        .exec(db)
        .await?;
    messages(db, user_id).await
}

/// A thread as seen by support. Clears the admin unread counter.
pub async fn read_as_admin(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<chat_message::Model>> {
    let cleared = Chat::update_many()
        .col_expr(ChatColumn::UnreadAdmin, Expr::value(0))
        .filter(ChatColumn::UserId.eq(user_id))
        .exec(db)
        .await?;
    if cleared.rows_affected == 0 {
        return Err(chat_not_found(user_id));
    }
    messages(db, user_id).await
}

/// All threads, most recently active first.
pub async fn list_chats(db: &DatabaseConnection) -> Result<Vec<chat::Model>> {
    Chat::find()
        .order_by_desc(ChatColumn::UpdatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}
