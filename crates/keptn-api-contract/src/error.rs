//! Error types for API contract validation and the server error envelope

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by local checks before a request leaves the process
#[derive(Debug, Error)]
pub enum ApiContractError {
    #[error("failed to validate {subject}: {reasons}")]
    Validation { subject: String, reasons: String },
}

/// Error envelope returned by the control plane on failed requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiError {
    /// Parse an error body, returning the server message when one is present.
    pub fn message_from_body(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ApiError>(body)
            .ok()
            .and_then(|err| err.message)
    }
}
