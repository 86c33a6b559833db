//! HTTP surface.
//!
//! Handlers only parse requests and shape responses; every rule lives in
//! [`crate::core`]. The payment gateway and object storage are injected through
//! [`AppState`] as trait objects so tests can swap in fakes.

/// Signed-in account and admin guard
pub mod caller;
/// Error to response mapping
pub mod error;

mod account;
mod admin;
mod payment;
mod public;

use crate::{core::checkout::CheckoutUrls, gateway::PaymentGateway, storage::ObjectStorage};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub gateway: Arc<dyn PaymentGateway>,
    pub storage: Arc<dyn ObjectStorage>,
    pub urls: Arc<CheckoutUrls>,
    pub admin_token: Arc<str>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        gateway: Arc<dyn PaymentGateway>,
        storage: Arc<dyn ObjectStorage>,
        public_base_url: &str,
        admin_token: &str,
    ) -> Self {
        Self {
            db,
            gateway,
            storage,
            urls: Arc::new(CheckoutUrls::new(public_base_url)),
            admin_token: Arc::from(admin_token),
        }
    }
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/campaigns/pending", get(admin::pending_campaigns))
        .route("/campaigns/:id", delete(admin::delete_campaign))
        .route("/campaigns/:id/moderation", post(admin::moderate_campaign))
        .route("/posts/:id", delete(admin::delete_post))
        .route("/posts/:id/moderation", post(admin::moderate_post))
        .route(
            "/organization-requests",
            get(admin::pending_organization_requests),
        )
        .route(
            "/organization-requests/:id/moderation",
            post(admin::moderate_organization_request),
        )
        .route("/news", post(admin::publish_news))
        .route(
            "/news/:id",
            put(admin::update_news).delete(admin::delete_news),
        )
        .route("/chats", get(admin::list_chats))
        .route(
            "/chats/:uid",
            get(admin::read_chat).post(admin::reply_chat),
        )
        .route_layer(middleware::from_fn_with_state(state, caller::require_admin))
}

/// Builds the application router.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(public::health))
        .route("/api/payment/create-link", post(payment::create_link))
        .route("/webhook", post(payment::receive_webhook))
        .route("/api/upload", post(payment::upload_file))
        .route("/api/campaigns", get(public::list_campaigns))
        .route(
            "/api/campaigns/:id",
            get(public::get_campaign)
                .put(account::update_campaign)
                .delete(account::delete_campaign),
        )
        .route("/api/campaigns/:id/donations", get(public::campaign_donations))
        .route(
            "/api/campaigns/:id/top-donors",
            get(public::campaign_top_donors),
        )
        .route("/api/campaigns/:id/audit", get(public::campaign_audit))
        .route("/api/organizations", get(public::list_organizations))
        .route(
            "/api/organizations/:id",
            get(public::get_organization).put(account::update_organization),
        )
        .route(
            "/api/organizations/:id/campaigns",
            get(public::organization_campaigns).post(account::create_campaign),
        )
        .route("/api/news", get(public::list_news))
        .route("/api/news/:id", get(public::get_news))
        .route("/api/users/me", put(account::update_profile))
        .route("/api/users/:uid/donations", get(account::user_donations))
        .route(
            "/api/users/:uid/notifications",
            get(account::user_notifications),
        )
        .route(
            "/api/users/:uid/chat",
            get(account::read_chat).post(account::send_chat_message),
        )
        .route(
            "/api/notifications/:id/read",
            post(account::mark_notification_read),
        )
        .route(
            "/api/posts",
            get(public::list_posts).post(account::create_post),
        )
        .route("/api/posts/:id/like", post(account::toggle_like))
        .route(
            "/api/posts/:id/comments",
            get(public::list_comments).post(account::add_comment),
        )
        .route(
            "/api/organization-requests",
            post(account::submit_organization_request),
        )
        .nest("/api/admin", admin_routes(state.clone()))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        entities::{Campaign, Donation, ModerationStatus, PendingDonation},
        errors::Result,
        test_utils::*,
    };
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use sea_orm::{EntityTrait, PaginatorTrait};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const ADMIN_TOKEN: &str = "admin-secret";

    struct Harness {
        db: DatabaseConnection,
        gateway: Arc<FakeGateway>,
        storage: Arc<FakeStorage>,
    }

    impl Harness {
        async fn new() -> Result<Self> {
            Self::with(FakeGateway::new(), FakeStorage::new()).await
        }

        async fn with(gateway: FakeGateway, storage: FakeStorage) -> Result<Self> {
            Ok(Self {
                db: setup_test_db().await?,
                gateway: Arc::new(gateway),
                storage: Arc::new(storage),
            })
        }

        fn app(&self) -> Router {
            let state = AppState::new(
                self.db.clone(),
                self.gateway.clone(),
                self.storage.clone(),
                "https://nuoiem.example",
                ADMIN_TOKEN,
            );
            router(state, 1024 * 1024)
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
            let response = self.app().oneshot(request).await.unwrap();
            let status = response.status();
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            (status, body.to_vec())
        }

        async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
            let (status, body) = self.send(request).await;
            (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
        }
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn with_header(mut request: Request<Body>, name: &'static str, value: &str) -> Request<Body> {
        request
            .headers_mut()
            .insert(name, value.parse().unwrap());
        request
    }

    #[tokio::test]
    async fn test_healthz() -> Result<()> {
        let harness = Harness::new().await?;
        let (status, body) = harness
            .send(Request::get("/healthz").body(Body::empty()).unwrap())
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
        Ok(())
    }

    #[tokio::test]
    async fn test_create_link_then_webhook() -> Result<()> {
        init_test_tracing();
        let harness = Harness::new().await?;
        let campaign = create_test_campaign(&harness.db, None).await?;

        let (status, body) = harness
            .send_json(post_json(
                "/api/payment/create-link",
                &json!({
                    "amount": 50000,
                    "campaignId": campaign.id,
                    "customerName": "An",
                    "userId": "",
                    "isAnonymous": false
                }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        let order_code = harness.gateway.requests()[0].order_code;
        assert_eq!(body["paymentUrl"], format!("https://pay.test/{order_code}"));
        assert_eq!(PendingDonation::find().count(&harness.db).await?, 1);

        let envelope = signed_webhook("00", order_code, 50_000, "pl_1");
        for _ in 0..2 {
            let (status, body) = harness
                .send(post_json("/webhook", &serde_json::to_value(&envelope)?))
                .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, b"OK");
        }

        assert_eq!(Donation::find().count(&harness.db).await?, 1);
        assert_eq!(PendingDonation::find().count(&harness.db).await?, 0);
        let campaign = Campaign::find_by_id(campaign.id)
            .one(&harness.db)
            .await?
            .unwrap();
        assert_eq!(campaign.raised, 50_000);
        assert_eq!(campaign.donors, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_link_errors_are_500() -> Result<()> {
        let harness = Harness::new().await?;
        let (status, body) = harness
            .send_json(post_json(
                "/api/payment/create-link",
                &json!({"amount": -5, "campaignId": "c1"}),
            ))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["message"].is_string());
        assert!(body["error"].as_str().unwrap().contains("Invalid amount"));

        let (status, _) = harness
            .send_json(post_json("/api/payment/create-link", &json!({"amount": "x"})))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        Ok(())
    }

    #[tokio::test]
    async fn test_webhook_always_acknowledges() -> Result<()> {
        let harness = Harness::new().await?;
        let (status, body) = harness
            .send(
                Request::post("/webhook")
                    .body(Body::from("garbage"))
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");

        // Never staged
        let envelope = signed_webhook("00", 424_242, 10_000, "pl_9");
        let (status, _) = harness
            .send(post_json("/webhook", &serde_json::to_value(&envelope)?))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(Donation::find().count(&harness.db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_upload() -> Result<()> {
        let harness = Harness::new().await?;
        let (status, body) = harness
            .send_json(post_json(
                "/api/upload",
                &json!({"image": "data:application/pdf;base64,JVBERi0="}),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["url"], "https://storage.test/1");
        assert_eq!(
            harness.storage.uploads(),
            vec!["data:text/plain;base64,JVBERi0=".to_string()]
        );

        let failing = Harness::with(FakeGateway::new(), FakeStorage::failing()).await?;
        let (status, body) = failing
            .send_json(post_json(
                "/api/upload",
                &json!({"image": "data:image/png;base64,aGVsbG8="}),
            ))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_requires_token() -> Result<()> {
        let harness = Harness::new().await?;
        let org = create_test_organization(&harness.db, "Quỹ A").await?;
        let created = crate::core::campaign::create_campaign(
            &harness.db,
            &org.id,
            crate::core::campaign::NewCampaign {
                title: "Sách cho em".to_string(),
                description: String::new(),
                goal: 1_000_000,
                category: "Giáo dục".to_string(),
                image: String::new(),
                story_images: vec![],
                date_end: chrono::Utc::now() + chrono::Duration::days(10),
            },
        )
        .await?;
        let uri = format!("/api/admin/campaigns/{}/moderation", created.id);

        let (status, _) = harness
            .send(post_json(&uri, &json!({"status": "approved"})))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let authorized = || {
            with_header(
                post_json(&uri, &json!({"status": "approved"})),
                "authorization",
                &format!("Bearer {ADMIN_TOKEN}"),
            )
        };
        let (status, body) = harness.send_json(authorized()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "approved");

        let (status, _) = harness.send_json(authorized()).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let campaign = Campaign::find_by_id(created.id)
            .one(&harness.db)
            .await?
            .unwrap();
        assert_eq!(campaign.status, ModerationStatus::Approved);
        Ok(())
    }

    #[tokio::test]
    async fn test_notifications_are_private() -> Result<()> {
        let harness = Harness::new().await?;
        create_test_user(&harness.db, "u1").await?;
        let uri = "/api/users/u1/notifications";

        let (status, _) = harness
            .send(Request::get(uri).body(Body::empty()).unwrap())
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = harness
            .send(with_header(
                Request::get(uri).body(Body::empty()).unwrap(),
                "x-user-id",
                "u2",
            ))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = harness
            .send_json(with_header(
                Request::get(uri).body(Body::empty()).unwrap(),
                "x-user-id",
                "u1",
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_campaign_is_404() -> Result<()> {
        let harness = Harness::new().await?;
        let (status, body) = harness
            .send_json(Request::get("/api/campaigns/nope").body(Body::empty()).unwrap())
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("nope"));
        Ok(())
    }

    fn get_as(uri: &str, uid: Option<&str>) -> Request<Body> {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        match uid {
            Some(uid) => with_header(request, "x-user-id", uid),
            None => request,
        }
    }

    #[tokio::test]
    async fn test_donation_reads_keep_anonymous_donors_hidden() -> Result<()> {
        let harness = Harness::new().await?;
        let campaign = create_test_campaign(&harness.db, None).await?;
        let donor = TestDonor {
            user_id: "secret-user",
            name: "Bình",
            is_anonymous: true,
        };
        book_test_donation(&harness.db, &campaign.id, donor, 501, 20_000).await?;

        let uri = format!("/api/campaigns/{}/donations", campaign.id);
        let (status, body) = harness.send_json(get_as(&uri, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.to_string().contains("secret-user"));
        assert_eq!(body[0]["userId"], "");
        assert_eq!(body[0]["isAnonymous"], true);
        assert!(body[0].get("transactionId").is_none());
        assert!(body[0].get("orderCode").is_none());

        let uri = format!("/api/campaigns/{}/top-donors?limit=1", campaign.id);
        let (status, body) = harness.send_json(get_as(&uri, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["userId"], Value::Null);

        let history = "/api/users/secret-user/donations";
        let (status, _) = harness.send(get_as(history, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = harness.send(get_as(history, Some("someone-else"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, body) = harness.send_json(get_as(history, Some("secret-user"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_campaign_edit_and_delete_by_owner() -> Result<()> {
        let harness = Harness::new().await?;
        let org = create_test_organization(&harness.db, "Quy G").await?;
        let campaign = create_test_campaign(&harness.db, Some(org.id.as_str())).await?;
        let uri = format!("/api/campaigns/{}", campaign.id);
        let changes = json!({
            "title": "Bữa trưa cho em",
            "description": "",
            "goal": 5_000_000,
            "category": "Dinh dưỡng",
            "dateEnd": "2030-01-01T00:00:00Z"
        });
        let put_as = |uid: &str| {
            let request = Request::put(uri.as_str())
                .header("content-type", "application/json")
                .body(Body::from(changes.to_string()))
                .unwrap();
            with_header(request, "x-user-id", uid)
        };

        let (status, _) = harness.send(put_as("stranger")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, body) = harness.send_json(put_as(&org.user_id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Bữa trưa cho em");
        assert_eq!(body["raised"], 0);

        let delete_as = |uid: &str| {
            with_header(
                Request::delete(uri.as_str()).body(Body::empty()).unwrap(),
                "x-user-id",
                uid,
            )
        };
        let (status, _) = harness.send(delete_as("stranger")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = harness.send(delete_as(&org.user_id)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = harness.send(get_as(&uri, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_support_chat_round_trip() -> Result<()> {
        let harness = Harness::new().await?;
        create_test_user(&harness.db, "u1").await?;
        let bearer = format!("Bearer {ADMIN_TOKEN}");

        let message = json!({"text": "Tôi cần hỗ trợ"});
        let (status, _) = harness
            .send(with_header(post_json("/api/users/u1/chat", &message), "x-user-id", "u2"))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = harness
            .send(with_header(post_json("/api/users/u1/chat", &message), "x-user-id", "u1"))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = harness.send(get_as("/api/admin/chats", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, body) = harness
            .send_json(with_header(get_as("/api/admin/chats", None), "authorization", &bearer))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["userId"], "u1");
        assert_eq!(body[0]["unreadAdmin"], 1);

        let reply = with_header(
            post_json("/api/admin/chats/u1", &json!({"text": "Chào bạn"})),
            "authorization",
            &bearer,
        );
        let (status, _) = harness.send(reply).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = harness.send_json(get_as("/api/users/u1/chat", Some("u1"))).await;
        assert_eq!(status, StatusCode::OK);
        let lines = body.as_array().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["sender"], "admin");
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_deletes_news() -> Result<()> {
        let harness = Harness::new().await?;
        let bearer = format!("Bearer {ADMIN_TOKEN}");
        let article = with_header(
            post_json("/api/admin/news", &json!({"title": "Tin cũ", "content": "..."})),
            "authorization",
            &bearer,
        );
        let (status, body) = harness.send_json(article).await;
        assert_eq!(status, StatusCode::OK);
        let uri = format!("/api/admin/news/{}", body["id"].as_str().unwrap());

        let delete = || Request::delete(uri.as_str()).body(Body::empty()).unwrap();
        let (status, _) = harness.send(delete()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = harness
            .send(with_header(delete(), "authorization", &bearer))
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = harness
            .send(with_header(delete(), "authorization", &bearer))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }
}
