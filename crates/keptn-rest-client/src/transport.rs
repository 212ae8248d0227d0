//! HTTP transport construction and request tracing

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use opentelemetry::propagation::{Injector, TextMapPropagator};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Request, Response};
use tracing::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::error::RestClientResult;

/// Something that can send a fully built HTTP request
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: Request) -> Result<Response, reqwest::Error>;
}

#[async_trait]
impl HttpTransport for reqwest::Client {
    async fn execute(&self, request: Request) -> Result<Response, reqwest::Error> {
        reqwest::Client::execute(self, request).await
    }
}

/// Policy applied to the standard transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Skip server certificate verification
    pub accept_invalid_certs: bool,
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            accept_invalid_certs: true,
            timeout: None,
            user_agent: concat!("keptn-rest-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Transport a handler is built from
pub enum BaseTransport {
    /// Standard client configured from a [`TransportConfig`].
    /// Proxy settings are read from the process environment.
    Standard(TransportConfig),
    /// Caller-supplied transport, used as-is and only wrapped for tracing
    Custom(Arc<dyn HttpTransport>),
}

impl Default for BaseTransport {
    fn default() -> Self {
        Self::Standard(TransportConfig::default())
    }
}

impl fmt::Debug for BaseTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseTransport::Standard(config) => f.debug_tuple("Standard").field(config).finish(),
            BaseTransport::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Traced transport shared by all requests of a handler.
///
/// Every request runs inside an `http.request` client span, and the current
/// OpenTelemetry context is injected into the outbound headers through the
/// global text-map propagator. With no propagator installed nothing is added.
#[derive(Clone)]
pub struct Transport {
    inner: Arc<dyn HttpTransport>,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport").finish_non_exhaustive()
    }
}

impl Transport {
    /// Build a transport, falling back to the standard one when none is given
    pub fn build(base: Option<BaseTransport>) -> RestClientResult<Self> {
        let inner: Arc<dyn HttpTransport> = match base.unwrap_or_default() {
            BaseTransport::Standard(config) => Arc::new(standard_client(&config)?),
            BaseTransport::Custom(transport) => transport,
        };
        Ok(Self { inner })
    }

    /// Standard transport with the default policy
    pub fn standard() -> RestClientResult<Self> {
        Self::build(None)
    }

    pub async fn execute(&self, mut request: Request) -> Result<Response, reqwest::Error> {
        let span = tracing::info_span!(
            "http.request",
            otel.kind = "client",
            http.request.method = %request.method(),
            url.full = %request.url(),
            http.response.status_code = tracing::field::Empty,
        );

        let cx = span.context();
        opentelemetry::global::get_text_map_propagator(|propagator| {
            propagator.inject_context(&cx, &mut HeaderInjector(request.headers_mut()))
        });

        let response = self.inner.execute(request).instrument(span.clone()).await;
        if let Ok(response) = &response {
            span.record("http.response.status_code", response.status().as_u16());
        }
        response
    }
}

fn standard_client(config: &TransportConfig) -> RestClientResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .danger_accept_invalid_certs(config.accept_invalid_certs);

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    Ok(builder.build()?)
}

struct HeaderInjector<'a>(&'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            self.0.insert(name, value);
        }
    }
}
