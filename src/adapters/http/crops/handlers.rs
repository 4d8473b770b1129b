//! HTTP handlers for crop endpoints.
//!
//! Mutations follow one shape: validate the request, call the ledger, and
//! on success hand the event to the notification dispatcher. Dispatch is
//! fire-and-forget; a client never sees an error because a notification
//! could not be delivered to someone else.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ErrorResponse;
use crate::adapters::websocket::{
    CropPurchasedEvent, CropRegisteredEvent, CropTransferredEvent, NotificationDispatcher,
};
use crate::domain::crop::Crop;
use crate::domain::foundation::{ContentHash, Timestamp, UserAddress, UserRole, ValidationError};
use crate::ports::{
    BuyCropRequest as BuyCrop, LedgerError, LedgerGateway, ProfileStore,
    RegisterCropRequest as RegisterCrop, TransferCropRequest as TransferCrop,
};

use super::dto::{
    BuyCropRequest, CropMutationResponse, CropResponse, RegisterCropRequest, RegisterCropResponse,
    TransferCropRequest, TransferRecordResponse,
};

#[derive(Clone)]
pub struct CropHandlers {
    ledger: Arc<dyn LedgerGateway>,
    profiles: Arc<dyn ProfileStore>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl CropHandlers {
    pub fn new(
        ledger: Arc<dyn LedgerGateway>,
        profiles: Arc<dyn ProfileStore>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            ledger,
            profiles,
            dispatcher,
        }
    }
}

/// POST /api/crops - Register a new crop
///
/// The sender must have registered a profile with the farmer role; the
/// contract enforces the on-chain role separately and reverts otherwise.
pub async fn register_crop(
    State(handlers): State<CropHandlers>,
    Json(req): Json<RegisterCropRequest>,
) -> Response {
    let farmer = match UserAddress::new(req.farmer_address) {
        Ok(address) => address,
        Err(error) => return bad_request(error),
    };
    match handlers.profiles.load(&farmer).await {
        Ok(Some(profile)) if profile.role == UserRole::Farmer => {}
        Ok(Some(profile)) => {
            return (
                StatusCode::FORBIDDEN,
                Json(ErrorResponse::forbidden(format!(
                    "Only farmers can register crops; {} is a {}",
                    farmer,
                    profile.role.as_str()
                ))),
            )
                .into_response();
        }
        Ok(None) => {
            return (
                StatusCode::FORBIDDEN,
                Json(ErrorResponse::forbidden(format!(
                    "Address {} has no registered profile",
                    farmer
                ))),
            )
                .into_response();
        }
        Err(error) => {
            tracing::error!(%error, "profile check failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal(error.to_string())),
            )
                .into_response();
        }
    }

    let harvest_date = match Timestamp::from_unix_secs(req.harvest_date) {
        Ok(date) => date,
        Err(error) => return bad_request(error),
    };
    let expiry_date = match Timestamp::from_unix_secs(req.expiry_date) {
        Ok(date) => date,
        Err(error) => return bad_request(error),
    };
    let image_hash = match optional_hash(req.image_hash) {
        Ok(hash) => hash,
        Err(error) => return bad_request(error),
    };
    let certificate_hash = match optional_hash(req.certificate_hash) {
        Ok(hash) => hash,
        Err(error) => return bad_request(error),
    };

    let request = RegisterCrop {
        farmer: farmer.clone(),
        name: req.name.clone(),
        quantity: req.quantity,
        price: req.price,
        batch_number: req.batch_number.clone(),
        harvest_date,
        expiry_date,
        image_hash,
        certificate_hash,
        farm_location: req.farm_location,
    };

    let receipt = match handlers.ledger.register_crop(request).await {
        Ok(receipt) => receipt,
        Err(e) => return handle_ledger_error(e),
    };

    // The receipt does not carry the assigned id; read it back so the
    // notification names the right crop. A failed read only costs the id.
    let crop_id = newest_crop_id(handlers.ledger.as_ref(), &farmer).await;
    if let Some(crop_id) = crop_id {
        handlers
            .dispatcher
            .notify_crop_registered(CropRegisteredEvent {
                crop_id,
                crop_name: req.name,
                farmer_address: farmer,
                batch_number: req.batch_number,
                quantity: req.quantity,
                price: req.price,
            })
            .await;
    }

    let response = RegisterCropResponse {
        message: "Crop registered successfully".to_string(),
        receipt: receipt.into(),
        crop_id,
    };
    (StatusCode::CREATED, Json(response)).into_response()
}

/// GET /api/crops - Every crop ever registered
pub async fn list_crops(State(handlers): State<CropHandlers>) -> Response {
    match handlers.ledger.all_crops().await {
        Ok(crops) => crops_response(crops),
        Err(e) => handle_ledger_error(e),
    }
}

/// GET /api/crops/available - Crops currently for sale
pub async fn list_available_crops(State(handlers): State<CropHandlers>) -> Response {
    match handlers.ledger.available_crops().await {
        Ok(crops) => crops_response(crops),
        Err(e) => handle_ledger_error(e),
    }
}

/// GET /api/crops/my/{address} - Crops owned by an address
pub async fn list_crops_by_owner(
    State(handlers): State<CropHandlers>,
    Path(address): Path<String>,
) -> Response {
    let owner = match UserAddress::new(address) {
        Ok(owner) => owner,
        Err(error) => return bad_request(error),
    };
    match handlers.ledger.crops_by_owner(&owner).await {
        Ok(crops) => crops_response(crops),
        Err(e) => handle_ledger_error(e),
    }
}

/// GET /api/crops/{id} - One crop
pub async fn get_crop(State(handlers): State<CropHandlers>, Path(id): Path<u64>) -> Response {
    match handlers.ledger.crop(id).await {
        Ok(crop) => (StatusCode::OK, Json(CropResponse::from(crop))).into_response(),
        Err(e) => handle_ledger_error(e),
    }
}

/// GET /api/crops/{id}/history - Ownership history, oldest first
pub async fn get_crop_history(
    State(handlers): State<CropHandlers>,
    Path(id): Path<u64>,
) -> Response {
    match handlers.ledger.crop_history(id).await {
        Ok(records) => {
            let body: Vec<TransferRecordResponse> =
                records.into_iter().map(TransferRecordResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => handle_ledger_error(e),
    }
}

/// POST /api/crops/transfer - Move a crop to the next participant
pub async fn transfer_crop(
    State(handlers): State<CropHandlers>,
    Json(req): Json<TransferCropRequest>,
) -> Response {
    let from = match UserAddress::new(req.from_address) {
        Ok(address) => address,
        Err(error) => return bad_request(error),
    };
    let to = match UserAddress::new(req.to_address) {
        Ok(address) => address,
        Err(error) => return bad_request(error),
    };
    let data_hash = match optional_hash(req.data_hash) {
        Ok(hash) => hash,
        Err(error) => return bad_request(error),
    };

    // Read the crop first: confirms it exists (404 beats a revert) and
    // captures the name for the notification payload.
    let crop = match handlers.ledger.crop(req.crop_id).await {
        Ok(crop) => crop,
        Err(e) => return handle_ledger_error(e),
    };

    let request = TransferCrop {
        crop_id: req.crop_id,
        from: from.clone(),
        to: to.clone(),
        note: req.note.clone(),
        data_hash,
    };
    let receipt = match handlers.ledger.transfer_crop(request).await {
        Ok(receipt) => receipt,
        Err(e) => return handle_ledger_error(e),
    };

    handlers
        .dispatcher
        .notify_crop_transferred(CropTransferredEvent {
            crop_id: req.crop_id,
            crop_name: crop.name,
            from_address: from,
            to_address: to,
            note: req.note,
        })
        .await;

    let response = CropMutationResponse {
        message: "Crop transferred successfully".to_string(),
        receipt: receipt.into(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// POST /api/crops/{id}/buy - Purchase an available crop
pub async fn buy_crop(
    State(handlers): State<CropHandlers>,
    Path(id): Path<u64>,
    Json(req): Json<BuyCropRequest>,
) -> Response {
    let buyer = match UserAddress::new(req.buyer_address) {
        Ok(address) => address,
        Err(error) => return bad_request(error),
    };

    let crop = match handlers.ledger.crop(id).await {
        Ok(crop) => crop,
        Err(e) => return handle_ledger_error(e),
    };

    let request = BuyCrop {
        crop_id: id,
        buyer: buyer.clone(),
        amount: req.amount,
    };
    let receipt = match handlers.ledger.buy_crop(request).await {
        Ok(receipt) => receipt,
        Err(e) => return handle_ledger_error(e),
    };

    handlers
        .dispatcher
        .notify_crop_purchased(CropPurchasedEvent {
            crop_id: id,
            crop_name: crop.name,
            buyer_address: buyer,
            amount: req.amount,
        })
        .await;

    let response = CropMutationResponse {
        message: "Crop purchased successfully".to_string(),
        receipt: receipt.into(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

fn crops_response(crops: Vec<Crop>) -> Response {
    let body: Vec<CropResponse> = crops.into_iter().map(CropResponse::from).collect();
    (StatusCode::OK, Json(body)).into_response()
}

/// The contract assigns ids sequentially, so the farmer's highest-id crop
/// is the one that was just mined.
async fn newest_crop_id(ledger: &dyn LedgerGateway, owner: &UserAddress) -> Option<u64> {
    match ledger.crops_by_owner(owner).await {
        Ok(crops) => crops.iter().map(|c| c.id).max(),
        Err(error) => {
            tracing::warn!(%error, "could not read back registered crop id");
            None
        }
    }
}

fn optional_hash(raw: Option<String>) -> Result<Option<ContentHash>, ValidationError> {
    raw.filter(|value| !value.trim().is_empty())
        .map(ContentHash::new)
        .transpose()
}

fn bad_request(error: ValidationError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::bad_request(error.to_string())),
    )
        .into_response()
}

fn handle_ledger_error(error: LedgerError) -> Response {
    match &error {
        LedgerError::CropNotFound { crop_id } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Crop", &crop_id.to_string())),
        )
            .into_response(),
        LedgerError::InvalidAddress { .. } => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(error.to_string())),
        )
            .into_response(),
        LedgerError::TransactionReverted { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::unprocessable(
                "TRANSACTION_REVERTED",
                error.to_string(),
            )),
        )
            .into_response(),
        LedgerError::Unreachable { .. }
        | LedgerError::Timeout
        | LedgerError::Rpc { .. }
        | LedgerError::ReceiptTimeout { .. }
        | LedgerError::Decode { .. } => {
            tracing::error!(%error, "ledger operation failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse::bad_gateway(error.to_string())),
            )
                .into_response()
        }
    }
}
