//! Entity module - Contains all SeaORM entity definitions for the database.
//! Each table is one file with a `Model` struct for data and an `Entity` struct
//! for queries. Cross-table references are plain id columns; integrity of the
//! donation aggregates is enforced by the ledger writer's transactions.

pub mod campaign;
pub mod chat;
pub mod chat_message;
pub mod comment;
pub mod donation;
pub mod image_list;
pub mod news;
pub mod notification;
pub mod notification_read;
pub mod organization;
pub mod organization_request;
pub mod pending_donation;
pub mod post;
pub mod post_like;
pub mod processed_payment;
pub mod sea_orm_active_enums;
pub mod user;

// Re-export specific types to avoid conflicts
pub use campaign::{Column as CampaignColumn, Entity as Campaign, Model as CampaignModel};
pub use chat::{Column as ChatColumn, Entity as Chat, Model as ChatModel};
pub use chat_message::{
    Column as ChatMessageColumn, Entity as ChatMessage, Model as ChatMessageModel,
};
pub use comment::{Column as CommentColumn, Entity as Comment, Model as CommentModel};
pub use donation::{Column as DonationColumn, Entity as Donation, Model as DonationModel};
pub use image_list::ImageList;
pub use news::{Column as NewsColumn, Entity as News, Model as NewsModel};
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
};
pub use notification_read::{
    Column as NotificationReadColumn, Entity as NotificationRead, Model as NotificationReadModel,
};
pub use organization::{
    Column as OrganizationColumn, Entity as Organization, Model as OrganizationModel,
};
pub use organization_request::{
    Column as OrganizationRequestColumn, Entity as OrganizationRequest,
    Model as OrganizationRequestModel,
};
pub use pending_donation::{
    Column as PendingDonationColumn, Entity as PendingDonation, Model as PendingDonationModel,
};
pub use post::{Column as PostColumn, Entity as Post, Model as PostModel};
pub use post_like::{Column as PostLikeColumn, Entity as PostLike, Model as PostLikeModel};
pub use processed_payment::{
    Column as ProcessedPaymentColumn, Entity as ProcessedPayment, Model as ProcessedPaymentModel,
};
pub use sea_orm_active_enums::{ChatSender, ModerationStatus, NotificationKind, UserRole};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
