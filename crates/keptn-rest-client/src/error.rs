//! Error types for the REST API client

use std::time::Duration;

use keptn_api_contract::ApiContractError;
use thiserror::Error;

/// Errors that can occur when using the REST API client
#[derive(Debug, Error)]
pub enum RestClientError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Success status with a body that does not match the expected shape
    #[error("{source}\n-----DETAILS-----{body}")]
    Decode {
        source: serde_json::Error,
        body: String,
    },

    /// Error message declared by the server in its error envelope
    #[error("{message}")]
    Server { status: u16, message: String },

    /// `reason` is empty for status codes without a canonical reason phrase
    #[error("unexpected status {status}{}", reason_suffix(.reason))]
    UnexpectedStatus { status: u16, reason: String },

    #[error("{0}")]
    Validation(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("could not find matching results after {attempts} x {delay:?}")]
    RetryExhausted { attempts: u32, delay: Duration },

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid auth header: {0}")]
    InvalidHeader(String),
}

impl RestClientError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RestClientError::Cancelled)
    }
}

fn reason_suffix(reason: &str) -> String {
    if reason.is_empty() {
        String::new()
    } else {
        format!(" {reason}")
    }
}

impl From<ApiContractError> for RestClientError {
    fn from(err: ApiContractError) -> Self {
        RestClientError::Validation(err.to_string())
    }
}

/// Result type alias for REST client operations
pub type RestClientResult<T> = Result<T, RestClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_status_message() {
        let known = RestClientError::UnexpectedStatus {
            status: 502,
            reason: "Bad Gateway".into(),
        };
        assert_eq!(known.to_string(), "unexpected status 502 Bad Gateway");

        let unknown = RestClientError::UnexpectedStatus {
            status: 599,
            reason: String::new(),
        };
        assert_eq!(unknown.to_string(), "unexpected status 599");
    }
}
