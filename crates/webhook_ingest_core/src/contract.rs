use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const SUCCESS_MESSAGE: &str = "Payload received successfully";
pub const FAILURE_LABEL: &str = "Failed to process payload";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestAcceptedResponse {
    pub message: String,
    pub reference: String,
    pub timestamp: String,
}

impl IngestAcceptedResponse {
    pub fn new(reference: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            message: SUCCESS_MESSAGE.to_string(),
            reference: reference.into(),
            timestamp: timestamp.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestErrorResponse {
    pub error: String,
    pub message: String,
}

impl IngestErrorResponse {
    pub fn from_error(error: &IngestError) -> Self {
        Self {
            error: FAILURE_LABEL.to_string(),
            message: error.public_message(),
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{0}")]
    Storage(String),
}

impl IngestError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Serialization(_) => "serialization_error",
            Self::Storage(_) => "storage_error",
        }
    }

    /// Message text surfaced to the caller; empty messages become
    /// [`UNKNOWN_ERROR_MESSAGE`].
    pub fn public_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            UNKNOWN_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}

pub fn payload_fingerprint(body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_response_serializes_expected_fields() {
        let response = IngestAcceptedResponse::new(
            "payloads/2026-02-14T08:15:42.123Z-abc.json",
            "2026-02-14T08:15:42.123Z",
        );
        let value = serde_json::to_value(&response).expect("response should serialize");

        assert_eq!(
            value,
            serde_json::json!({
                "message": "Payload received successfully",
                "reference": "payloads/2026-02-14T08:15:42.123Z-abc.json",
                "timestamp": "2026-02-14T08:15:42.123Z"
            })
        );
    }

    #[test]
    fn storage_error_message_is_passed_through() {
        let error = IngestError::Storage("AccessDenied: bucket policy".to_string());
        let response = IngestErrorResponse::from_error(&error);

        assert_eq!(response.error, "Failed to process payload");
        assert_eq!(response.message, "AccessDenied: bucket policy");
        assert_eq!(error.code(), "storage_error");
    }

    #[test]
    fn empty_error_message_falls_back_to_unknown() {
        let error = IngestError::Storage("  ".to_string());
        assert_eq!(error.public_message(), "Unknown error");
    }

    #[test]
    fn fingerprint_is_sha256_hex() {
        assert_eq!(
            payload_fingerprint(b"{}"),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }
}
