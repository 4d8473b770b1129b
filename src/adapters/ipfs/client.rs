//! IPFS file store adapter.
//!
//! Implements the `FileStore` port against one of two backends: a
//! self-hosted IPFS node reached through its HTTP API, or the hosted
//! Pinata pinning service. The backend is chosen once at construction
//! from the configuration; both return the content hash computed by the
//! store itself.

use async_trait::async_trait;
use reqwest::multipart;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::config::IpfsConfig;
use crate::domain::foundation::ContentHash;
use crate::ports::{FileStore, FileStoreError};

/// Hosted pinning service API base.
const PINATA_API_URL: &str = "https://api.pinata.cloud";

/// `POST /api/v0/add` response from an IPFS node.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AddResponse {
    hash: String,
}

/// `POST /pinning/pinFileToIPFS` response from Pinata.
#[derive(Debug, Deserialize)]
struct PinataAddResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

#[derive(Debug, Serialize)]
struct PinByHashRequest<'a> {
    #[serde(rename = "hashToPin")]
    hash_to_pin: &'a str,
}

/// File store backed by IPFS, either self-hosted or via Pinata.
pub struct IpfsClient {
    config: IpfsConfig,
    http_client: reqwest::Client,
}

impl IpfsClient {
    /// Create a client from the storage configuration.
    pub fn new(config: IpfsConfig) -> Self {
        // Use default client if builder fails - reqwest::Client::new() is infallible
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            config,
            http_client,
        }
    }

    async fn store_local(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<ContentHash, FileStoreError> {
        let url = format!("{}/api/v0/add?pin=true", self.config.api_url);
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        let body: AddResponse = decode_success(response).await?;

        ContentHash::new(body.hash)
            .map_err(|error| FileStoreError::invalid_response(error.to_string()))
    }

    async fn store_pinata(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<ContentHash, FileStoreError> {
        let (api_key, secret_key) = self.pinata_credentials()?;
        let url = format!("{PINATA_API_URL}/pinning/pinFileToIPFS");
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http_client
            .post(&url)
            .header("pinata_api_key", api_key.expose_secret().as_str())
            .header("pinata_secret_api_key", secret_key.expose_secret().as_str())
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        let body: PinataAddResponse = decode_success(response).await?;

        ContentHash::new(body.ipfs_hash)
            .map_err(|error| FileStoreError::invalid_response(error.to_string()))
    }

    async fn pin_local(&self, hash: &ContentHash) -> Result<(), FileStoreError> {
        let url = format!(
            "{}/api/v0/pin/add?arg={}",
            self.config.api_url,
            hash.as_str()
        );
        let response = self
            .http_client
            .post(&url)
            .send()
            .await
            .map_err(transport_error)?;
        ensure_success(response).await.map(|_| ())
    }

    async fn pin_pinata(&self, hash: &ContentHash) -> Result<(), FileStoreError> {
        let (api_key, secret_key) = self.pinata_credentials()?;
        let url = format!("{PINATA_API_URL}/pinning/pinByHash");
        let body = PinByHashRequest {
            hash_to_pin: hash.as_str(),
        };

        let response = self
            .http_client
            .post(&url)
            .header("pinata_api_key", api_key.expose_secret().as_str())
            .header("pinata_secret_api_key", secret_key.expose_secret().as_str())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        ensure_success(response).await.map(|_| ())
    }

    fn pinata_credentials(&self) -> Result<(&Secret<String>, &Secret<String>), FileStoreError> {
        match (
            &self.config.pinata_api_key,
            &self.config.pinata_secret_key,
        ) {
            (Some(api_key), Some(secret_key)) => Ok((api_key, secret_key)),
            _ => Err(FileStoreError::unavailable(
                "Pinata credentials not configured",
            )),
        }
    }
}

#[async_trait]
impl FileStore for IpfsClient {
    async fn store(&self, bytes: Vec<u8>, file_name: &str) -> Result<ContentHash, FileStoreError> {
        let size = bytes.len();
        let hash = if self.config.use_pinata {
            self.store_pinata(bytes, file_name).await?
        } else {
            self.store_local(bytes, file_name).await?
        };
        tracing::info!(file_name, size, hash = hash.as_str(), "file stored");
        Ok(hash)
    }

    async fn pin(&self, hash: &ContentHash) -> Result<(), FileStoreError> {
        if self.config.use_pinata {
            self.pin_pinata(hash).await
        } else {
            self.pin_local(hash).await
        }
    }

    fn file_url(&self, hash: &ContentHash) -> String {
        let gateway = if self.config.use_pinata {
            &self.config.pinata_gateway_url
        } else {
            &self.config.gateway_url
        };
        format!("{}/{}", gateway.trim_end_matches('/'), hash.as_str())
    }
}

fn transport_error(error: reqwest::Error) -> FileStoreError {
    if error.is_timeout() {
        FileStoreError::Timeout
    } else {
        FileStoreError::unavailable(error.to_string())
    }
}

/// Reject non-2xx responses, logging the store's error body.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, FileStoreError> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let error_text = response.text().await.unwrap_or_default();
        tracing::error!(status, error = %error_text, "file store rejected request");
        return Err(FileStoreError::rejected(status, error_text));
    }
    Ok(response)
}

async fn decode_success<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, FileStoreError> {
    ensure_success(response)
        .await?
        .json()
        .await
        .map_err(|error| FileStoreError::invalid_response(error.to_string()))
}
