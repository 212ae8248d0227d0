//! Authenticated request execution

use std::future::Future;
use std::sync::Arc;

use keptn_api_contract::EventContext;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use crate::auth::Credentials;
use crate::error::{RestClientError, RestClientResult};
use crate::response::{classify, classify_raw, Outcome, StatusBand};
use crate::transport::Transport;

/// Run a future unless the token fires first
pub(crate) async fn cancellable<F: Future>(
    cancel: &CancellationToken,
    future: F,
) -> RestClientResult<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RestClientError::Cancelled),
        output = future => Ok(output),
    }
}

/// Request executor shared by the handlers: credentials plus a traced transport.
///
/// Cloning is cheap and clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct RestClient {
    credentials: Arc<Credentials>,
    transport: Transport,
}

impl RestClient {
    pub fn new(credentials: Credentials, transport: Transport) -> Self {
        Self {
            credentials: Arc::new(credentials),
            transport,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Absolute URL of an API path
    pub fn endpoint(&self, path: &str) -> RestClientResult<Url> {
        self.credentials.endpoint(path)
    }

    /// Absolute URL of an API path followed by percent-encoded path segments
    pub fn endpoint_with_segments(&self, path: &str, segments: &[&str]) -> RestClientResult<Url> {
        let mut endpoint = self.endpoint(path)?;
        endpoint
            .path_segments_mut()
            .map_err(|()| RestClientError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .extend(segments);
        Ok(endpoint)
    }

    /// Send a request and decode a successful body as `T`.
    ///
    /// The success band is chosen from the method, see [`StatusBand`].
    pub async fn execute<T: DeserializeOwned>(
        &self,
        cancel: &CancellationToken,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> RestClientResult<Outcome<T>> {
        let band = StatusBand::for_method(&method);
        let (status, bytes) = self.send(cancel, method, url, body).await?;
        classify(band, status, &bytes)
    }

    /// Send a request and return a successful body undecoded
    pub async fn execute_raw(
        &self,
        cancel: &CancellationToken,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> RestClientResult<Outcome<String>> {
        let band = StatusBand::for_method(&method);
        let (status, bytes) = self.send(cancel, method, url, body).await?;
        classify_raw(band, status, &bytes)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        cancel: &CancellationToken,
        url: Url,
    ) -> RestClientResult<Outcome<T>> {
        self.execute(cancel, Method::GET, url, None).await
    }

    pub async fn post_with_context<B: Serialize>(
        &self,
        cancel: &CancellationToken,
        url: Url,
        body: &B,
    ) -> RestClientResult<Option<EventContext>> {
        let body = serde_json::to_vec(body)?;
        let outcome = self.execute(cancel, Method::POST, url, Some(body)).await?;
        Ok(log_event_context(outcome))
    }

    pub async fn put_with_context<B: Serialize>(
        &self,
        cancel: &CancellationToken,
        url: Url,
        body: &B,
    ) -> RestClientResult<Option<EventContext>> {
        let body = serde_json::to_vec(body)?;
        let outcome = self.execute(cancel, Method::PUT, url, Some(body)).await?;
        Ok(log_event_context(outcome))
    }

    pub async fn delete_with_context(
        &self,
        cancel: &CancellationToken,
        url: Url,
    ) -> RestClientResult<Option<EventContext>> {
        let outcome = self.execute(cancel, Method::DELETE, url, None).await?;
        Ok(outcome.into_option())
    }

    /// POST a body, returning the raw response body if any
    pub async fn post<B: Serialize>(
        &self,
        cancel: &CancellationToken,
        url: Url,
        body: &B,
    ) -> RestClientResult<Option<String>> {
        let body = serde_json::to_vec(body)?;
        let outcome = self.execute_raw(cancel, Method::POST, url, Some(body)).await?;
        Ok(outcome.into_option())
    }

    async fn send(
        &self,
        cancel: &CancellationToken,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> RestClientResult<(StatusCode, Vec<u8>)> {
        let mut request = Request::new(method, url);
        self.credentials.apply_to_headers(request.headers_mut())?;

        if let Some(body) = body {
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            *request.body_mut() = Some(body.into());
        }

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        // The response body is dropped on every exit path, including cancellation.
        let (status, bytes) = cancellable(cancel, async {
            let response = self.transport.execute(request).await?;
            let status = response.status();
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, bytes.to_vec()))
        })
        .await??;

        debug!(%method, %url, %status, body_len = bytes.len(), "received HTTP response");
        Ok((status, bytes))
    }
}

fn log_event_context(outcome: Outcome<EventContext>) -> Option<EventContext> {
    let context = outcome.into_option();
    if let Some(keptn_context) = context.as_ref().and_then(|c| c.keptn_context.as_deref()) {
        info!(keptn_context, "received Keptn context");
    }
    context
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::DEFAULT_SCHEME;
    use crate::test_support::{client_for, test_transport};

    #[tokio::test]
    async fn test_auth_and_content_type_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/project"))
            .and(header("x-token", "secret"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"projectName": "sockshop"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"keptnContext": "ctx-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, "x-token", "secret");
        let url = client.endpoint("/v1/project").unwrap();
        let context = client
            .post_with_context(&CancellationToken::new(), url, &json!({"projectName": "sockshop"}))
            .await
            .unwrap();

        assert_eq!(context.unwrap().keptn_context.as_deref(), Some("ctx-1"));
    }

    #[test]
    fn test_endpoint_segments_are_escaped() {
        let client = RestClient::new(
            Credentials::new("keptn.example.com/api/controlPlane", DEFAULT_SCHEME),
            test_transport(),
        );
        let url = client
            .endpoint_with_segments("/v1/project", &["a?b#c/d"])
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://keptn.example.com/api/controlPlane/v1/project/a%3Fb%23c%2Fd"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[tokio::test]
    async fn test_no_auth_header_when_token_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client_for(&server, "x-token", "");
        let url = client.endpoint("/v1/project/sockshop").unwrap();
        let outcome: Outcome<serde_json::Value> =
            client.get(&CancellationToken::new(), url).await.unwrap();
        assert!(outcome.is_empty());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("x-token").is_none());
        assert!(requests[0].headers.get("content-type").is_none());
    }

    #[tokio::test]
    async fn test_delete_accepts_whole_2xx_band() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(206).set_body_json(json!({"keptnContext": "ctx-2"})))
            .mount(&server)
            .await;

        let client = client_for(&server, "", "");
        let url = client.endpoint("/v1/project/sockshop").unwrap();
        let context = client
            .delete_with_context(&CancellationToken::new(), url)
            .await
            .unwrap();

        assert_eq!(context.unwrap().keptn_context.as_deref(), Some("ctx-2"));
    }

    #[tokio::test]
    async fn test_put_rejects_status_outside_write_band() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(206))
            .mount(&server)
            .await;

        let client = client_for(&server, "", "");
        let url = client.endpoint("/v1/project/sockshop").unwrap();
        let err = client
            .put_with_context(&CancellationToken::new(), url, &json!({}))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "unexpected status 206 Partial Content");
    }

    #[tokio::test]
    async fn test_structured_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({"code": 409, "message": "project already exists"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, "", "");
        let url = client.endpoint("/v1/project").unwrap();
        let err = client
            .post_with_context(&CancellationToken::new(), url, &json!({}))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "project already exists");
    }

    #[tokio::test]
    async fn test_post_returns_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("accepted"))
            .mount(&server)
            .await;

        let client = client_for(&server, "", "");
        let url = client.endpoint("/v1/sequence").unwrap();
        let body = client
            .post(&CancellationToken::new(), url, &json!({}))
            .await
            .unwrap();

        assert_eq!(body.as_deref(), Some("accepted"));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let client = RestClient::new(
            Credentials::new(addr.to_string(), DEFAULT_SCHEME),
            test_transport(),
        );
        let url = client.endpoint("/v1/project").unwrap();
        let err = client
            .get::<serde_json::Value>(&CancellationToken::new(), url)
            .await
            .unwrap_err();

        assert!(matches!(err, RestClientError::Transport(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_cancel_in_flight_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
            .mount(&server)
            .await;

        let client = client_for(&server, "", "");
        let url = client.endpoint("/v1/project").unwrap();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let err = client.get::<serde_json::Value>(&cancel, url).await.unwrap_err();

        assert!(err.is_cancelled(), "{err:?}");
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_already_cancelled_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, "", "");
        let url = client.endpoint("/v1/project").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client.get::<serde_json::Value>(&cancel, url).await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
