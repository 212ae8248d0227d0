//! Response classification

use keptn_api_contract::ApiError;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{RestClientError, RestClientResult};

/// Range of status codes an endpoint treats as success.
///
/// Writes accept `200..=204` only, reads and deletes accept the whole `2xx` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBand {
    Write,
    Read,
}

impl StatusBand {
    pub fn for_method(method: &Method) -> Self {
        if *method == Method::POST || *method == Method::PUT {
            StatusBand::Write
        } else {
            StatusBand::Read
        }
    }

    pub fn contains(self, status: StatusCode) -> bool {
        let code = status.as_u16();
        match self {
            StatusBand::Write => (200..=204).contains(&code),
            StatusBand::Read => (200..300).contains(&code),
        }
    }
}

/// Successful outcome of a call
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Value(T),
    /// Success status with an empty body
    Empty,
}

impl<T> Outcome<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Outcome::Value(value) => Some(value),
            Outcome::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }
}

/// Classify a response, decoding the body of a successful one as `T`
pub fn classify<T: DeserializeOwned>(
    band: StatusBand,
    status: StatusCode,
    body: &[u8],
) -> RestClientResult<Outcome<T>> {
    if !band.contains(status) {
        return Err(error_from_status(status, body));
    }
    if body.is_empty() {
        return Ok(Outcome::Empty);
    }

    serde_json::from_slice(body)
        .map(Outcome::Value)
        .map_err(|source| RestClientError::Decode {
            source,
            body: String::from_utf8_lossy(body).into_owned(),
        })
}

/// Classify a response without decoding, returning the body as text
pub fn classify_raw(
    band: StatusBand,
    status: StatusCode,
    body: &[u8],
) -> RestClientResult<Outcome<String>> {
    if !band.contains(status) {
        return Err(error_from_status(status, body));
    }
    if body.is_empty() {
        return Ok(Outcome::Empty);
    }
    Ok(Outcome::Value(String::from_utf8_lossy(body).into_owned()))
}

/// Map a failed response to an error.
///
/// The `message` of the error envelope wins when the body carries one; any
/// other body degrades to a generic status error.
pub fn error_from_status(status: StatusCode, body: &[u8]) -> RestClientError {
    match ApiError::message_from_body(body) {
        Some(message) => RestClientError::Server {
            status: status.as_u16(),
            message,
        },
        None => RestClientError::UnexpectedStatus {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        },
    }
}
