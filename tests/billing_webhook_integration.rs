//! End-to-end tests for the billing endpoints.
//!
//! The full axum router runs against in-memory repositories, the mock Stripe
//! provider and the mock session validator. Webhook payloads are signed with
//! the same HMAC scheme Stripe uses.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

use portail_habitat::adapters::auth::MockSessionValidator;
use portail_habitat::adapters::http::{build_router, ApiState, BillingAppState, MarketplaceAppState};
use portail_habitat::adapters::memory::{
    InMemoryArtisanRepository, InMemoryLeadRepository, InMemorySubscriptionMirror,
};
use portail_habitat::adapters::stripe::MockPaymentProvider;
use portail_habitat::application::handlers::billing::{
    CancelSubscriptionHandler, GetSubscriptionHandler, HandleBillingWebhookHandler,
    SubscriptionStatePersister,
};
use portail_habitat::application::handlers::marketplace::{ListLeadsHandler, PurchaseLeadHandler};
use portail_habitat::domain::artisan::{Artisan, PlanTier, SubscriptionStatus};
use portail_habitat::domain::billing::{sign_payload, StripeWebhookVerifier, SubscriptionRecord};
use portail_habitat::domain::foundation::{ArtisanId, Money, SubscriptionId, Timestamp, UserId};
use portail_habitat::ports::{
    ListingStrategy, PaymentError, ProviderSubscription, SubscriptionMirrorRepository,
};

const SECRET: &str = "whsec_integration_secret";
const TOKEN: &str = "token-owner-1";
const CREATED: i64 = 1_760_000_000;
const PERIOD_END: i64 = 1_762_592_000;

// ════════════════════════════════════════════════════════════════════════════════
// Harness
// ════════════════════════════════════════════════════════════════════════════════

struct TestApp {
    router: Router,
    artisans: Arc<InMemoryArtisanRepository>,
    mirror: Arc<InMemorySubscriptionMirror>,
    provider: MockPaymentProvider,
    artisan_id: ArtisanId,
}

impl TestApp {
    async fn new() -> Self {
        let mut artisan = Artisan::new(
            ArtisanId::new(),
            UserId::new("owner-1").unwrap(),
            "Couverture Martin",
        );
        artisan.link_subscription("cus_1", SubscriptionId::new("sub_1").unwrap());
        let artisan_id = artisan.id;

        let artisans = Arc::new(InMemoryArtisanRepository::with_artisans([artisan]));
        let mirror = Arc::new(InMemorySubscriptionMirror::new());
        mirror
            .upsert(&SubscriptionRecord {
                subscription_id: SubscriptionId::new("sub_1").unwrap(),
                artisan_id,
                stripe_customer_id: Some("cus_1".to_string()),
                status: SubscriptionStatus::Incomplete,
                plan: PlanTier::Basic,
                monthly_price: Money::from_cents(0),
                current_period_end: None,
                cancel_at_period_end: false,
                updated_at: Timestamp::now(),
            })
            .await
            .unwrap();

        let provider = MockPaymentProvider::new();
        provider.add_subscription(ProviderSubscription {
            id: SubscriptionId::new("sub_1").unwrap(),
            customer_id: Some("cus_1".to_string()),
            status: SubscriptionStatus::Active,
            unit_amount: Money::from_cents(12_900),
            current_period_end: Timestamp::from_unix_secs(PERIOD_END),
            cancel_at_period_end: false,
        });

        let persister = Arc::new(SubscriptionStatePersister::new(
            artisans.clone(),
            mirror.clone(),
        ));
        let leads = Arc::new(InMemoryLeadRepository::new());

        let state = ApiState {
            billing: BillingAppState {
                webhook_handler: Arc::new(HandleBillingWebhookHandler::new(
                    Arc::new(StripeWebhookVerifier::new(SecretString::new(
                        SECRET.to_string(),
                    ))),
                    artisans.clone(),
                    Arc::new(provider.clone()),
                    persister.clone(),
                )),
                cancel_handler: Arc::new(CancelSubscriptionHandler::new(
                    artisans.clone(),
                    Arc::new(provider.clone()),
                    persister,
                )),
                subscription_handler: Arc::new(GetSubscriptionHandler::new(artisans.clone())),
            },
            marketplace: MarketplaceAppState {
                list_handler: Arc::new(ListLeadsHandler::new(
                    leads.clone(),
                    ListingStrategy::Scan,
                    20,
                )),
                purchase_handler: Arc::new(PurchaseLeadHandler::new(artisans.clone(), leads)),
            },
            session_validator: Arc::new(
                MockSessionValidator::new().with_test_user(TOKEN, "owner-1"),
            ),
        };

        Self {
            router: build_router(state),
            artisans,
            mirror,
            provider,
            artisan_id,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn webhook(&self, event: &Value) -> (StatusCode, String) {
        let payload = serde_json::to_vec(event).unwrap();
        let signature = sign_payload(SECRET, chrono::Utc::now().timestamp(), &payload);
        let request = Request::post("/api/webhooks/stripe")
            .header("Stripe-Signature", signature)
            .header("Content-Type", "application/json")
            .body(Body::from(payload))
            .unwrap();
        let (status, body) = self.send(request).await;
        (status, String::from_utf8(body).unwrap())
    }

    async fn authed(&self, method: &str, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {}", TOKEN))
            .body(Body::empty())
            .unwrap();
        let (status, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    fn artisan(&self) -> Artisan {
        self.artisans.get(&self.artisan_id).unwrap()
    }
}

fn event(event_type: &str, object: Value) -> Value {
    json!({
        "id": format!("evt_{}", event_type.replace('.', "_")),
        "object": "event",
        "type": event_type,
        "created": CREATED,
        "livemode": false,
        "data": { "object": object }
    })
}

fn subscription_event(event_type: &str, sub_id: &str, status: &str, cents: i64) -> Value {
    event(
        event_type,
        json!({
            "id": sub_id,
            "object": "subscription",
            "customer": "cus_1",
            "status": status,
            "cancel_at_period_end": false,
            "current_period_end": PERIOD_END,
            "items": { "data": [ { "price": { "id": "price_1", "unit_amount": cents } } ] }
        }),
    )
}

fn invoice_event(event_type: &str, sub_id: &str) -> Value {
    event(
        event_type,
        json!({
            "id": "in_1",
            "object": "invoice",
            "customer": "cus_1",
            "subscription": sub_id
        }),
    )
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn subscription_update_activates_premium_plus() {
    let app = TestApp::new().await;

    let (status, body) = app
        .webhook(&subscription_event(
            "customer.subscription.updated",
            "sub_1",
            "active",
            19_900,
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");

    let artisan = app.artisan();
    assert_eq!(artisan.subscription.current_plan, PlanTier::PremiumPlus);
    assert_eq!(artisan.subscription.monthly_price, Money::from_cents(19_900));
    assert_eq!(artisan.subscription.status, Some(SubscriptionStatus::Active));
    assert!(artisan.premium.is_premium);
    assert!(artisan.premium.premium_start_date.is_some());

    let record = app
        .mirror
        .get(&SubscriptionId::new("sub_1").unwrap())
        .unwrap();
    assert_eq!(record.plan, PlanTier::PremiumPlus);
    assert_eq!(record.status, SubscriptionStatus::Active);
}

#[tokio::test]
async fn redelivered_update_leaves_state_unchanged() {
    let app = TestApp::new().await;
    let update = subscription_event("customer.subscription.updated", "sub_1", "active", 12_900);

    app.webhook(&update).await;
    let first = app.artisan();
    let (status, _) = app.webhook(&update).await;
    let second = app.artisan();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(app.artisans.write_count(), 1);
}

#[tokio::test]
async fn resubscribing_after_deletion_clears_premium_end_date() {
    let app = TestApp::new().await;
    app.webhook(&subscription_event(
        "customer.subscription.updated",
        "sub_1",
        "active",
        12_900,
    ))
    .await;
    app.webhook(&subscription_event(
        "customer.subscription.deleted",
        "sub_1",
        "canceled",
        12_900,
    ))
    .await;
    assert!(app.artisan().premium.premium_end_date.is_some());

    let mut update = subscription_event("customer.subscription.updated", "sub_1", "active", 19_900);
    update["id"] = json!("evt_resubscribe");
    let (status, _) = app.webhook(&update).await;

    assert_eq!(status, StatusCode::OK);
    let artisan = app.artisan();
    assert!(artisan.premium.is_premium);
    assert_eq!(artisan.subscription.status, Some(SubscriptionStatus::Active));
    assert!(artisan.premium.premium_end_date.is_none());

    let (_, body) = app.authed("GET", "/api/artisans/me/subscription").await;
    assert!(body.get("premiumEndDate").map_or(true, Value::is_null));
}

#[tokio::test]
async fn tampered_payload_is_rejected_with_400() {
    let app = TestApp::new().await;
    let payload = serde_json::to_vec(&subscription_event(
        "customer.subscription.updated",
        "sub_1",
        "active",
        19_900,
    ))
    .unwrap();
    let signature = sign_payload(SECRET, chrono::Utc::now().timestamp(), &payload);
    let mut tampered = payload.clone();
    tampered.extend_from_slice(b" ");

    let request = Request::post("/api/webhooks/stripe")
        .header("Stripe-Signature", signature)
        .body(Body::from(tampered))
        .unwrap();
    let (status, _) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.artisans.write_count(), 0);
}

#[tokio::test]
async fn missing_signature_is_rejected_with_400() {
    let app = TestApp::new().await;
    let request = Request::post("/api/webhooks/stripe")
        .body(Body::from("{}"))
        .unwrap();

    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8(body).unwrap().contains("Stripe-Signature"));
}

#[tokio::test]
async fn orphan_event_is_acknowledged_without_writes() {
    let app = TestApp::new().await;

    let (status, _) = app
        .webhook(&subscription_event(
            "customer.subscription.updated",
            "sub_unknown",
            "active",
            12_900,
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.artisans.write_count(), 0);
    assert_eq!(app.mirror.write_count(), 1);
}

#[tokio::test]
async fn deletion_revokes_premium() {
    let app = TestApp::new().await;
    app.webhook(&subscription_event(
        "customer.subscription.updated",
        "sub_1",
        "active",
        12_900,
    ))
    .await;

    let (status, _) = app
        .webhook(&subscription_event(
            "customer.subscription.deleted",
            "sub_1",
            "canceled",
            12_900,
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    let artisan = app.artisan();
    assert_eq!(artisan.subscription.status, Some(SubscriptionStatus::Canceled));
    assert!(!artisan.subscription.cancel_at_period_end);
    assert!(!artisan.premium.is_premium);
    assert!(artisan.premium.premium_end_date.is_some());
}

#[tokio::test]
async fn failed_payment_marks_past_due_and_keeps_plan() {
    let app = TestApp::new().await;
    app.webhook(&subscription_event(
        "customer.subscription.updated",
        "sub_1",
        "active",
        12_900,
    ))
    .await;

    let (status, _) = app
        .webhook(&invoice_event("invoice.payment_failed", "sub_1"))
        .await;

    assert_eq!(status, StatusCode::OK);
    let artisan = app.artisan();
    assert_eq!(artisan.subscription.status, Some(SubscriptionStatus::PastDue));
    assert_eq!(artisan.subscription.current_plan, PlanTier::Premium);
    assert!(!artisan.premium.is_premium);
}

#[tokio::test]
async fn successful_payment_refreshes_period_end_from_stripe() {
    let app = TestApp::new().await;

    let (status, _) = app
        .webhook(&invoice_event("invoice.payment_succeeded", "sub_1"))
        .await;

    assert_eq!(status, StatusCode::OK);
    let artisan = app.artisan();
    assert_eq!(artisan.subscription.status, Some(SubscriptionStatus::Active));
    assert_eq!(
        artisan.subscription.current_period_end,
        Timestamp::from_unix_secs(PERIOD_END)
    );
    assert_eq!(app.provider.call_count("get_subscription"), 1);
}

#[tokio::test]
async fn unknown_event_type_is_acknowledged() {
    let app = TestApp::new().await;

    let (status, _) = app
        .webhook(&event("customer.created", json!({ "id": "cus_1" })))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.artisans.write_count(), 0);
}

// ════════════════════════════════════════════════════════════════════════════════
// Artisan Endpoints
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn cancel_requires_authentication() {
    let app = TestApp::new().await;
    let request = Request::post("/api/artisans/me/subscription/cancel")
        .body(Body::empty())
        .unwrap();

    let (status, _) = app.send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.provider.call_count("cancel_at_period_end"), 0);
}

#[tokio::test]
async fn cancel_schedules_end_of_period_and_rejects_repeat() {
    let app = TestApp::new().await;
    app.webhook(&subscription_event(
        "customer.subscription.updated",
        "sub_1",
        "active",
        12_900,
    ))
    .await;

    let (status, body) = app
        .authed("POST", "/api/artisans/me/subscription/cancel")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["subscription"]["id"], "sub_1");
    assert_eq!(body["subscription"]["status"], "canceled");
    assert_eq!(body["subscription"]["cancelAtPeriodEnd"], true);
    assert!(body["subscription"]["currentPeriodEnd"].is_string());

    let artisan = app.artisan();
    assert_eq!(
        artisan.premium.premium_end_date,
        Timestamp::from_unix_secs(PERIOD_END)
    );

    let (status, body) = app
        .authed("POST", "/api/artisans/me/subscription/cancel")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "ALREADY_CANCELED");
    assert_eq!(app.provider.call_count("cancel_at_period_end"), 1);
}

#[tokio::test]
async fn cancel_surfaces_stripe_failure_as_500() {
    let app = TestApp::new().await;
    app.webhook(&subscription_event(
        "customer.subscription.updated",
        "sub_1",
        "active",
        12_900,
    ))
    .await;
    let before = app.artisan();
    app.provider
        .set_method_error("cancel_at_period_end", PaymentError::network("connection reset"));

    let (status, body) = app
        .authed("POST", "/api/artisans/me/subscription/cancel")
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "PAYMENT_PROVIDER_ERROR");
    assert!(body["message"].is_string());
    assert_eq!(app.artisan(), before);
}

#[tokio::test]
async fn subscription_summary_reflects_webhook_state() {
    let app = TestApp::new().await;
    app.webhook(&subscription_event(
        "customer.subscription.updated",
        "sub_1",
        "active",
        19_900,
    ))
    .await;

    let (status, body) = app.authed("GET", "/api/artisans/me/subscription").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan"], "premium_plus");
    assert_eq!(body["isPremium"], true);
    assert_eq!(body["monthlyPrice"], 199.0);
    assert_eq!(body["subscription"]["status"], "active");
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(Request::get("/health").body(Body::empty()).unwrap())
        .await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ok");
}
