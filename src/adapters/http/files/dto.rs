//! HTTP DTOs for document upload endpoints.

use serde::Serialize;

/// Response for a stored supply-chain document.
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    /// Content hash assigned by the store.
    pub hash: String,
    /// Public gateway URL where the file can be fetched.
    pub url: String,
    pub file_name: String,
    pub size: usize,
    /// SHA-256 of the uploaded bytes, hex-encoded, so callers can verify
    /// what the gateway actually received.
    pub checksum: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_response_serializes_all_fields() {
        let response = UploadResponse {
            hash: "QmAbc".to_string(),
            url: "https://ipfs.io/ipfs/QmAbc".to_string(),
            file_name: "cert.pdf".to_string(),
            size: 1024,
            checksum: "deadbeef".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["hash"], "QmAbc");
        assert_eq!(json["checksum"], "deadbeef");
    }
}
