//! HTTP handlers for document upload endpoints.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sha2::{Digest, Sha256};

use crate::adapters::http::error::ErrorResponse;
use crate::config::StorageConfig;
use crate::ports::{FileStore, FileStoreError};

use super::dto::UploadResponse;

#[derive(Clone)]
pub struct FileHandlers {
    store: Arc<dyn FileStore>,
    storage: StorageConfig,
}

impl FileHandlers {
    pub fn new(store: Arc<dyn FileStore>, storage: StorageConfig) -> Self {
        Self { store, storage }
    }
}

/// POST /api/upload - Store a supply-chain document
///
/// Expects one multipart field named `file`. The extension allow-list and
/// size cap come from the storage configuration; a stored file is pinned
/// before the URL is returned.
pub async fn upload_file(
    State(handlers): State<FileHandlers>,
    mut multipart: Multipart,
) -> Response {
    let field = match multipart.next_field().await {
        Ok(Some(field)) if field.name() == Some("file") => field,
        Ok(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request("Missing 'file' field")),
            )
                .into_response();
        }
        Err(error) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(format!(
                    "Malformed multipart body: {error}"
                ))),
            )
                .into_response();
        }
    };

    let file_name = match field.file_name() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request("Upload is missing a file name")),
            )
                .into_response();
        }
    };
    let Some(extension) = file_extension(&file_name) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(format!(
                "File '{file_name}' has no extension"
            ))),
        )
            .into_response();
    };
    if !handlers.storage.extension_allowed(extension) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(
                ErrorResponse::unprocessable(
                    "EXTENSION_NOT_ALLOWED",
                    format!("File type '.{extension}' is not accepted"),
                )
                .with_details(serde_json::json!({
                    "allowed": handlers.storage.allowed_extensions_list(),
                })),
            ),
        )
            .into_response();
    }

    let bytes = match field.bytes().await {
        Ok(bytes) => bytes,
        Err(error) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(format!(
                    "Could not read upload: {error}"
                ))),
            )
                .into_response();
        }
    };
    if bytes.len() as u64 > handlers.storage.max_upload_bytes {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(ErrorResponse::unprocessable(
                "FILE_TOO_LARGE",
                format!(
                    "Upload of {} bytes exceeds the {} byte limit",
                    bytes.len(),
                    handlers.storage.max_upload_bytes
                ),
            )),
        )
            .into_response();
    }

    let checksum = hex::encode(Sha256::digest(&bytes));
    let size = bytes.len();

    let hash = match handlers.store.store(bytes.to_vec(), &file_name).await {
        Ok(hash) => hash,
        Err(e) => return handle_store_error(e),
    };
    if let Err(e) = handlers.store.pin(&hash).await {
        return handle_store_error(e);
    }

    tracing::info!(file_name, size, hash = hash.as_str(), "document uploaded");
    let response = UploadResponse {
        url: handlers.store.file_url(&hash),
        hash: hash.to_string(),
        file_name,
        size,
        checksum,
    };
    (StatusCode::CREATED, Json(response)).into_response()
}

fn file_extension(file_name: &str) -> Option<&str> {
    let extension = file_name.rsplit('.').next()?;
    if extension == file_name || extension.is_empty() {
        return None;
    }
    Some(extension)
}

fn handle_store_error(error: FileStoreError) -> Response {
    tracing::error!(%error, "file store operation failed");
    let status = match &error {
        FileStoreError::Unavailable { .. } | FileStoreError::Timeout => StatusCode::BAD_GATEWAY,
        FileStoreError::Rejected { .. } | FileStoreError::InvalidResponse { .. } => {
            StatusCode::BAD_GATEWAY
        }
    };
    (status, Json(ErrorResponse::bad_gateway(error.to_string()))).into_response()
}
