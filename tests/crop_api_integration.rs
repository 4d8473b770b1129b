//! Integration tests for the crop endpoints.
//!
//! A mock ledger stands in for the contract node; the profile store,
//! registry, and dispatcher are the real implementations, so these tests
//! cover the whole path from HTTP request to queued WebSocket frame.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tower::ServiceExt;

use agrichain_gateway::adapters::http::crops::{crop_routes, CropHandlers};
use agrichain_gateway::adapters::profile::FsProfileStore;
use agrichain_gateway::adapters::websocket::{
    ConnectionHandle, ConnectionRegistry, NotificationDispatcher,
};
use agrichain_gateway::domain::crop::{Crop, TransferRecord, TxReceipt};
use agrichain_gateway::domain::foundation::{Timestamp, UserAddress, UserRole};
use agrichain_gateway::domain::user::UserProfile;
use agrichain_gateway::ports::{
    BuyCropRequest, LedgerError, LedgerGateway, ProfileStore, RegisterCropRequest,
    TransferCropRequest,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// In-memory ledger standing in for the contract node.
struct MockLedger {
    crops: Mutex<Vec<Crop>>,
    history: Mutex<HashMap<u64, Vec<TransferRecord>>>,
}

impl MockLedger {
    fn new() -> Self {
        Self {
            crops: Mutex::new(Vec::new()),
            history: Mutex::new(HashMap::new()),
        }
    }

    fn receipt() -> TxReceipt {
        TxReceipt {
            transaction_hash: "0xfeed".to_string(),
            block_number: 7,
            gas_used: 21_000,
            succeeded: true,
        }
    }
}

#[async_trait]
impl LedgerGateway for MockLedger {
    async fn block_number(&self) -> Result<u64, LedgerError> {
        Ok(7)
    }

    async fn register_crop(&self, request: RegisterCropRequest) -> Result<TxReceipt, LedgerError> {
        let mut crops = self.crops.lock().unwrap();
        let id = crops.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        crops.push(Crop {
            id,
            name: request.name,
            quantity: request.quantity,
            price: request.price,
            batch_number: request.batch_number,
            harvest_date: request.harvest_date,
            expiry_date: request.expiry_date,
            image_hash: request.image_hash,
            certificate_hash: request.certificate_hash,
            farm_location: request.farm_location,
            current_owner: request.farmer,
            available: true,
            created_at: Timestamp::now(),
        });
        Ok(Self::receipt())
    }

    async fn transfer_crop(&self, request: TransferCropRequest) -> Result<TxReceipt, LedgerError> {
        let mut crops = self.crops.lock().unwrap();
        let crop = crops
            .iter_mut()
            .find(|c| c.id == request.crop_id)
            .ok_or(LedgerError::crop_not_found(request.crop_id))?;
        crop.current_owner = request.to.clone();
        self.history
            .lock()
            .unwrap()
            .entry(request.crop_id)
            .or_default()
            .push(TransferRecord {
                from: request.from,
                to: request.to,
                timestamp: Timestamp::now(),
                note: request.note,
                data_hash: request.data_hash,
            });
        Ok(Self::receipt())
    }

    async fn buy_crop(&self, request: BuyCropRequest) -> Result<TxReceipt, LedgerError> {
        let mut crops = self.crops.lock().unwrap();
        let crop = crops
            .iter_mut()
            .find(|c| c.id == request.crop_id)
            .ok_or(LedgerError::crop_not_found(request.crop_id))?;
        crop.current_owner = request.buyer;
        crop.available = false;
        Ok(Self::receipt())
    }

    async fn crop(&self, crop_id: u64) -> Result<Crop, LedgerError> {
        self.crops
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == crop_id)
            .cloned()
            .ok_or(LedgerError::crop_not_found(crop_id))
    }

    async fn all_crops(&self) -> Result<Vec<Crop>, LedgerError> {
        Ok(self.crops.lock().unwrap().clone())
    }

    async fn available_crops(&self) -> Result<Vec<Crop>, LedgerError> {
        Ok(self
            .crops
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.available)
            .cloned()
            .collect())
    }

    async fn crops_by_owner(&self, owner: &UserAddress) -> Result<Vec<Crop>, LedgerError> {
        Ok(self
            .crops
            .lock()
            .unwrap()
            .iter()
            .filter(|c| &c.current_owner == owner)
            .cloned()
            .collect())
    }

    async fn crop_history(&self, crop_id: u64) -> Result<Vec<TransferRecord>, LedgerError> {
        Ok(self
            .history
            .lock()
            .unwrap()
            .get(&crop_id)
            .cloned()
            .unwrap_or_default())
    }
}

struct Gateway {
    registry: Arc<ConnectionRegistry>,
    router: axum::Router,
    _data_dir: TempDir,
}

impl Gateway {
    async fn new() -> Self {
        let data_dir = TempDir::new().unwrap();
        let profiles: Arc<dyn ProfileStore> = Arc::new(FsProfileStore::new(
            data_dir.path().join("user_profiles.json"),
        ));
        // Seed the profiles the handlers check against.
        for (address, name, role) in [
            ("0xFARM", "Asha", UserRole::Farmer),
            ("0xDIST", "Dev", UserRole::Distributor),
            ("0xCUST", "Cleo", UserRole::Customer),
        ] {
            profiles
                .save(
                    UserProfile::new(
                        UserAddress::new(address).unwrap(),
                        name,
                        format!("{name}@example.com"),
                        role,
                    )
                    .unwrap(),
                )
                .await
                .unwrap();
        }

        let registry = Arc::new(ConnectionRegistry::new());
        let dispatcher = Arc::new(NotificationDispatcher::new(registry.clone()));
        let ledger: Arc<dyn LedgerGateway> = Arc::new(MockLedger::new());
        let router = crop_routes(CropHandlers::new(ledger, profiles, dispatcher));
        Self {
            registry,
            router,
            _data_dir: data_dir,
        }
    }

    async fn connect(
        &self,
        identity: &str,
        role: Option<UserRole>,
    ) -> UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = ConnectionHandle::new(tx);
        self.registry
            .register(conn, Some(UserAddress::new(identity).unwrap()), role)
            .await;
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

fn register_body(farmer: &str) -> Value {
    json!({
        "farmer_address": farmer,
        "name": "Wheat",
        "quantity": 500,
        "price": 1_000_000,
        "batch_number": "BATCH-001",
        "harvest_date": 1_700_000_000u64,
        "expiry_date": 1_710_000_000u64,
        "farm_location": "45.0,7.6"
    })
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

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn farmer_registers_crop_and_everyone_hears_about_it() {
    let gateway = Gateway::new().await;
    let mut listener = gateway.connect("0xCUST", Some(UserRole::Customer)).await;

    let (status, body) = gateway.post("/", register_body("0xFARM")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["crop_id"], 1);
    assert_eq!(body["receipt"]["transaction_hash"], "0xfeed");

    let listener_frames = frames(&mut listener);
    assert_eq!(count_of(&listener_frames, "crop_registered"), 1);
    assert_eq!(listener_frames[0]["payload"]["cropName"], "Wheat");
}

#[tokio::test]
async fn non_farmer_cannot_register_a_crop() {
    let gateway = Gateway::new().await;

    let (status, body) = gateway.post("/", register_body("0xDIST")).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn unknown_address_cannot_register_a_crop() {
    let gateway = Gateway::new().await;

    let (status, _) = gateway.post("/", register_body("0xNOBODY")).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unrepresentable_harvest_date_is_rejected() {
    let gateway = Gateway::new().await;
    let mut body = register_body("0xFARM");
    body["harvest_date"] = json!(10_000_000_000_000_000u64);

    let (status, response) = gateway.post("/", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "BAD_REQUEST");

    // Nothing reached the ledger.
    let (_, crops) = gateway.get("/").await;
    assert!(crops.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn reading_a_missing_crop_is_not_found() {
    let gateway = Gateway::new().await;

    let (status, body) = gateway.get("/99").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn transfer_notifies_both_parties() {
    let gateway = Gateway::new().await;
    gateway.post("/", register_body("0xFARM")).await;
    let mut sender = gateway.connect("0xFARM", Some(UserRole::Farmer)).await;
    let mut receiver = gateway.connect("0xDIST", Some(UserRole::Distributor)).await;

    let (status, _) = gateway
        .post(
            "/transfer",
            json!({
                "crop_id": 1,
                "from_address": "0xFARM",
                "to_address": "0xDIST",
                "note": "first leg"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(count_of(&frames(&mut sender), "crop_transferred"), 1);
    let receiver_frames = frames(&mut receiver);
    assert_eq!(count_of(&receiver_frames, "crop_transferred"), 1);
    assert_eq!(count_of(&receiver_frames, "system_notification"), 1);

    // The ownership history now carries the leg.
    let (status, history) = gateway.get("/1/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["note"], "first leg");
}

#[tokio::test]
async fn transferring_a_missing_crop_is_not_found() {
    let gateway = Gateway::new().await;

    let (status, _) = gateway
        .post(
            "/transfer",
            json!({"crop_id": 42, "from_address": "0xA", "to_address": "0xB"}),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn purchase_tells_the_buyer_and_removes_availability() {
    let gateway = Gateway::new().await;
    gateway.post("/", register_body("0xFARM")).await;
    let mut buyer = gateway.connect("0xCUST", Some(UserRole::Customer)).await;

    let (status, _) = gateway
        .post("/1/buy", json!({"buyer_address": "0xCUST", "amount": 1_000_000}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let buyer_frames = frames(&mut buyer);
    assert_eq!(count_of(&buyer_frames, "crop_purchased"), 1);
    assert_eq!(buyer_frames[0]["payload"]["buyerAddress"], "0xCUST");

    let (_, available) = gateway.get("/available").await;
    assert!(available.as_array().unwrap().is_empty());

    let (_, mine) = gateway.get("/my/0xCUST").await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn crop_listing_round_trips_registered_fields() {
    let gateway = Gateway::new().await;
    gateway.post("/", register_body("0xFARM")).await;

    let (status, crops) = gateway.get("/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(crops[0]["id"], 1);
    assert_eq!(crops[0]["harvest_date"], 1_700_000_000u64);
    assert_eq!(crops[0]["current_owner"], "0xFARM");
}
