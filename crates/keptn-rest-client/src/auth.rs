//! Credentials and authentication header handling

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::error::{RestClientError, RestClientResult};

/// Scheme used when none is configured
pub const DEFAULT_SCHEME: &str = "http";

/// Strip a leading `http://` or `https://` from a base URL
pub fn trim_http_scheme(base_url: &str) -> &str {
    base_url
        .strip_prefix("https://")
        .or_else(|| base_url.strip_prefix("http://"))
        .unwrap_or(base_url)
}

/// Normalise a base URL and make sure it ends with the service path segment
pub(crate) fn service_base_url(base_url: &str, service: &str) -> String {
    let trimmed = trim_http_scheme(base_url).trim_end_matches('/');
    if trimmed.ends_with(service) {
        trimmed.to_string()
    } else {
        format!("{trimmed}/{service}")
    }
}

/// Connection and authentication settings of a handler.
///
/// The base URL is kept without its scheme (`host[:port][/prefix]`); the scheme
/// is stored separately. The auth header is sent only when both its name and
/// the token are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    base_url: String,
    scheme: String,
    auth_header: String,
    auth_token: String,
}

impl Credentials {
    /// Unauthenticated credentials for a base URL
    pub fn new(base_url: impl AsRef<str>, scheme: impl Into<String>) -> Self {
        Self {
            base_url: trim_http_scheme(base_url.as_ref()).to_string(),
            scheme: scheme.into(),
            auth_header: String::new(),
            auth_token: String::new(),
        }
    }

    /// Attach an auth header name and token
    pub fn with_auth(mut self, auth_header: impl Into<String>, auth_token: impl Into<String>) -> Self {
        self.auth_header = auth_header.into();
        self.auth_token = auth_token.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn auth_header(&self) -> &str {
        &self.auth_header
    }

    /// Whether requests carry the auth header
    pub fn is_authenticated(&self) -> bool {
        !self.auth_header.is_empty() && !self.auth_token.is_empty()
    }

    /// Absolute URL of an API path below the base URL
    pub fn endpoint(&self, path: &str) -> RestClientResult<Url> {
        Ok(Url::parse(&format!(
            "{}://{}{}",
            self.scheme, self.base_url, path
        ))?)
    }

    /// Apply the auth header to a request, if configured
    pub fn apply_to_headers(&self, headers: &mut HeaderMap) -> RestClientResult<()> {
        if !self.is_authenticated() {
            return Ok(());
        }

        let name = HeaderName::from_bytes(self.auth_header.as_bytes())
            .map_err(|e| RestClientError::InvalidHeader(e.to_string()))?;
        let mut value = HeaderValue::from_str(&self.auth_token)
            .map_err(|e| RestClientError::InvalidHeader(e.to_string()))?;
        value.set_sensitive(true);
        headers.insert(name, value);
        Ok(())
    }
}
