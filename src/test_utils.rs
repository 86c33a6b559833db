//! Shared test utilities.
//!
//! In-memory database setup, fixtures with sensible defaults, and fakes for
//! the payment gateway and object storage seams.
#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use crate::{
    core::{
        ledger::{self, ConfirmedPayment, LedgerOutcome},
        user::{self, UserProfile},
    },
    entities::{
        ModerationStatus, UserRole, campaign, donation, organization, pending_donation,
        user as user_entity,
    },
    errors::{Error, Result},
    gateway::{
        CheckoutLink, PaymentGateway, PaymentRequest, WebhookEnvelope, checksum::ChecksumKey,
    },
    storage::ObjectStorage,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::json;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Checksum key shared by [`FakeGateway`] and [`signed_webhook`].
pub const TEST_CHECKSUM_KEY: &str = "test-checksum-key";

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a user profile.
///
/// # Defaults
/// * `full_name`: `"Test User {uid}"`
/// * `email`: `"{uid}@example.com"`
/// * `role`: user
pub async fn create_test_user(db: &DatabaseConnection, uid: &str) -> Result<user_entity::Model> {
    user::upsert_profile(
        db,
        UserProfile {
            uid: uid.to_string(),
            email: format!("{uid}@example.com"),
            full_name: format!("Test User {uid}"),
            avatar: String::new(),
            phone_number: String::new(),
        },
    )
    .await
}

/// Creates a user profile with a fixed registration time.
pub async fn create_user_registered_at(
    db: &DatabaseConnection,
    uid: &str,
    created_at: DateTime<Utc>,
) -> Result<user_entity::Model> {
    user_entity::ActiveModel {
        uid: Set(uid.to_string()),
        email: Set(format!("{uid}@example.com")),
        full_name: Set(format!("Test User {uid}")),
        avatar: Set(String::new()),
        phone_number: Set(String::new()),
        role: Set(UserRole::User),
        created_at: Set(created_at),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates an organization with zeroed aggregates.
pub async fn create_test_organization(
    db: &DatabaseConnection,
    name: &str,
) -> Result<organization::Model> {
    organization::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(name.to_string()),
        description: Set(String::new()),
        logo: Set(String::new()),
        user_id: Set(format!("owner-of-{name}")),
        campaign_count: Set(0),
        total_raised: Set(0),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Inserts an approved campaign directly, bypassing the organization's campaign count.
///
/// `organization_id` is stored as given, so it may point at nothing.
pub async fn create_test_campaign(
    db: &DatabaseConnection,
    organization_id: Option<&str>,
) -> Result<campaign::Model> {
    campaign::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        title: Set("Test Campaign".to_string()),
        description: Set(String::new()),
        goal: Set(10_000_000),
        raised: Set(0),
        donors: Set(0),
        organization_id: Set(organization_id.map(str::to_string)),
        status: Set(ModerationStatus::Approved),
        category: Set("Giáo dục".to_string()),
        image: Set(String::new()),
        story_images: Set(Vec::<String>::new().into()),
        date_created: Set(Utc::now()),
        date_end: Set(Utc::now() + chrono::Duration::days(30)),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// A donor as seen by [`book_test_donation`].
pub struct TestDonor<'a> {
    pub user_id: &'a str,
    pub name: &'a str,
    pub is_anonymous: bool,
}

/// Books a confirmed donation through the ledger writer, so campaign and
/// organization aggregates stay consistent.
///
/// # Defaults
/// * `transaction_id`: `"pl_{order_code}"`
pub async fn book_test_donation(
    db: &DatabaseConnection,
    campaign_id: &str,
    donor: TestDonor<'_>,
    order_code: i64,
    amount: i64,
) -> Result<donation::Model> {
    pending_donation::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        order_code: Set(order_code),
        campaign_id: Set(campaign_id.to_string()),
        user_id: Set(donor.user_id.to_string()),
        customer_name: Set(donor.name.to_string()),
        amount: Set(amount),
        is_anonymous: Set(donor.is_anonymous),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;

    let outcome = ledger::record_confirmed_payment(
        db,
        ConfirmedPayment {
            order_code,
            amount,
            transaction_id: format!("pl_{order_code}"),
        },
    )
    .await?;
    match outcome {
        LedgerOutcome::Recorded(booked) => Ok(booked),
        other => panic!("donation was not booked: {other:?}"),
    }
}

/// Builds a webhook envelope signed with [`TEST_CHECKSUM_KEY`].
pub fn signed_webhook(
    code: &str,
    order_code: i64,
    amount: i64,
    payment_link_id: &str,
) -> WebhookEnvelope {
    let data = json!({
        "orderCode": order_code,
        "amount": amount,
        "paymentLinkId": payment_link_id,
        "description": format!("Quyen gop {order_code}"),
        "reference": "FT000001",
        "currency": "VND",
        "counterAccountName": null
    })
    .as_object()
    .cloned()
    .unwrap();
    WebhookEnvelope {
        code: code.to_string(),
        desc: "success".to_string(),
        success: code == "00",
        signature: ChecksumKey::new(TEST_CHECKSUM_KEY).sign_data(&data).unwrap(),
        data,
    }
}

/// Payment gateway that records requests and checks webhooks against [`TEST_CHECKSUM_KEY`].
pub struct FakeGateway {
    checksum: ChecksumKey,
    fail: bool,
    requests: Mutex<Vec<PaymentRequest>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            checksum: ChecksumKey::new(TEST_CHECKSUM_KEY),
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A gateway that refuses every payment link.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn requests(&self) -> Vec<PaymentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_payment_link(&self, request: &PaymentRequest) -> Result<CheckoutLink> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(Error::Gateway {
                message: "gateway unavailable".to_string(),
            });
        }
        Ok(CheckoutLink {
            checkout_url: format!("https://pay.test/{}", request.order_code),
            payment_link_id: format!("pl_{}", request.order_code),
        })
    }

    fn verify_webhook(&self, envelope: &WebhookEnvelope) -> Result<()> {
        self.checksum.verify_data(&envelope.data, &envelope.signature)
    }
}

/// Object storage that keeps uploads in memory.
pub struct FakeStorage {
    fail: bool,
    uploads: Mutex<Vec<String>>,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self {
            fail: false,
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn upload(&self, data_uri: &str) -> Result<String> {
        if self.fail {
            return Err(Error::Storage {
                message: "storage unavailable".to_string(),
            });
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(data_uri.to_string());
        Ok(format!("https://storage.test/{}", uploads.len()))
    }
}
