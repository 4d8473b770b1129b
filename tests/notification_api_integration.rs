//! Integration tests for the notification trigger and stats endpoints.
//!
//! These drive the real registry and dispatcher through the HTTP layer:
//! connections are registered the way a live session would register them,
//! then trigger endpoints are hit and the queued frames inspected.

use std::sync::Arc;

use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::{json, Value};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tower::ServiceExt;

use agrichain_gateway::adapters::http::notifications::{
    notification_routes, NotificationHandlers,
};
use agrichain_gateway::adapters::websocket::{
    ConnectionHandle, ConnectionRegistry, NotificationDispatcher,
};
use agrichain_gateway::domain::foundation::{UserAddress, UserRole};

struct Gateway {
    registry: Arc<ConnectionRegistry>,
    router: axum::Router,
}

impl Gateway {
    fn new() -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let dispatcher = Arc::new(NotificationDispatcher::new(registry.clone()));
        let router = notification_routes(NotificationHandlers::new(dispatcher, registry.clone()));
        Self { registry, router }
    }

    async fn connect(
        &self,
        identity: Option<&str>,
        role: Option<UserRole>,
    ) -> UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = ConnectionHandle::new(tx);
        let identity = identity.map(|s| UserAddress::new(s).unwrap());
        self.registry.register(conn, identity, role).await;
        rx
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

fn frames(rx: &mut UnboundedReceiver<String>) -> Vec<Value> {
    let mut out = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        out.push(serde_json::from_str(&frame).unwrap());
    }
    out
}

fn count_of(frames: &[Value], message_type: &str) -> usize {
    frames.iter().filter(|f| f["type"] == message_type).count()
}

#[tokio::test]
async fn transfer_trigger_routes_to_parties_and_handling_roles() {
    let gateway = Gateway::new();
    let mut farmer = gateway.connect(Some("0xABC"), Some(UserRole::Farmer)).await;
    let mut distributor = gateway
        .connect(Some("0xDEF"), Some(UserRole::Distributor))
        .await;

    let (status, body) = gateway
        .post(
            "/crop-transferred",
            json!({
                "crop_id": 1,
                "crop_name": "Wheat",
                "from_address": "0xABC",
                "to_address": "0xDEF"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "dispatched");

    // The sending farmer hears about the transfer but is not part of the
    // distributor/retailer audience for the companion notice.
    let farmer_frames = frames(&mut farmer);
    assert_eq!(count_of(&farmer_frames, "crop_transferred"), 1);
    assert_eq!(count_of(&farmer_frames, "system_notification"), 0);

    let distributor_frames = frames(&mut distributor);
    assert_eq!(count_of(&distributor_frames, "crop_transferred"), 1);
    assert_eq!(count_of(&distributor_frames, "system_notification"), 1);
}

#[tokio::test]
async fn registered_trigger_broadcasts_and_notes_farmers() {
    let gateway = Gateway::new();
    let mut customer = gateway
        .connect(Some("0x111"), Some(UserRole::Customer))
        .await;
    let mut farmer = gateway.connect(Some("0x222"), Some(UserRole::Farmer)).await;

    let (status, _) = gateway
        .post(
            "/crop-registered",
            json!({
                "crop_id": 5,
                "crop_name": "Corn",
                "farmer_address": "0x222",
                "batch_number": "B-5",
                "quantity": 100,
                "price": 2500
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let customer_frames = frames(&mut customer);
    assert_eq!(count_of(&customer_frames, "crop_registered"), 1);
    assert_eq!(count_of(&customer_frames, "system_notification"), 0);

    let farmer_frames = frames(&mut farmer);
    assert_eq!(count_of(&farmer_frames, "crop_registered"), 1);
    assert_eq!(count_of(&farmer_frames, "system_notification"), 1);
}

#[tokio::test]
async fn system_event_rejects_unknown_target_role() {
    let gateway = Gateway::new();

    let (status, body) = gateway
        .post(
            "/system-event",
            json!({"message": "hello", "target_role": "auditor"}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_trigger_reaches_every_connection() {
    let gateway = Gateway::new();
    let mut named = gateway.connect(Some("0xABC"), Some(UserRole::Retailer)).await;
    let mut anonymous = gateway.connect(None, None).await;

    let (status, _) = gateway.post("/test", json!({})).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(count_of(&frames(&mut named), "system_notification"), 1);
    assert_eq!(count_of(&frames(&mut anonymous), "system_notification"), 1);
}

#[tokio::test]
async fn triggers_complete_on_an_empty_registry() {
    let gateway = Gateway::new();

    let (status, _) = gateway
        .post(
            "/price-update",
            json!({"crop_id": 1, "crop_name": "Rice", "old_price": 10, "new_price": 12}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn stats_reports_counts_and_identities() {
    let gateway = Gateway::new();
    let _a = gateway.connect(Some("0xABC"), Some(UserRole::Farmer)).await;
    let _b = gateway.connect(Some("0xABC"), None).await;
    let _c = gateway.connect(Some("0xDEF"), Some(UserRole::Admin)).await;
    let _d = gateway.connect(None, None).await;

    let (status, body) = gateway.get("/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_connections"], 4);
    assert_eq!(body["by_role"]["farmer"], 1);
    assert_eq!(body["by_role"]["admin"], 1);
    assert_eq!(
        body["active_identities"],
        json!(["0xABC", "0xDEF"])
    );
}

#[tokio::test]
async fn stats_on_empty_registry_is_all_zeroes() {
    let gateway = Gateway::new();

    let (status, body) = gateway.get("/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_connections"], 0);
    assert_eq!(body["active_identities"], json!([]));
}
