//! Core business logic - framework-agnostic operations over the database and
//! the external service seams. The `api` layer only parses requests and maps
//! results; everything with a rule in it lives here.

/// Campaign creation, listing and moderation
pub mod campaign;
/// Support chat threads
pub mod chat;
/// Payment link issuing (checkout)
pub mod checkout;
/// Community posts, likes and comments
pub mod community;
/// Donation ledger queries and audits
pub mod donation;
/// Ledger writer for confirmed payments
pub mod ledger;
/// Moderation decisions shared by reviewed records
pub mod moderation;
/// News articles
pub mod news;
/// Direct and broadcast notifications
pub mod notification;
/// Organizations and organization registration requests
pub mod organization;
/// File upload preparation
pub mod upload;
/// User profiles and roles
pub mod user;
/// Webhook verification and dispatch
pub mod webhook;
