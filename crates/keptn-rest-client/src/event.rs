//! Event queries against the datastore

use std::time::Duration;

use keptn_api_contract::{EventFilter, Events, KeptnContextExtendedCE};
use tokio_util::sync::CancellationToken;

use crate::auth::{service_base_url, Credentials, DEFAULT_SCHEME};
use crate::client::RestClient;
use crate::error::RestClientResult;
use crate::pagination::fetch_all;
use crate::retry::{retry_until_found, RetryPolicy};
use crate::transport::{BaseTransport, Transport};

/// Path segment of the event datastore behind the API gateway
pub const MONGODB_DATASTORE_BASE_URL: &str = "mongodb-datastore";

const EVENT_PATH: &str = "/event";

/// Handles events
#[derive(Debug, Clone)]
pub struct EventHandler {
    client: RestClient,
}

impl EventHandler {
    /// Handler talking to the datastore directly, without authentication
    pub fn new(base_url: &str) -> RestClientResult<Self> {
        let credentials = Credentials::new(base_url, DEFAULT_SCHEME);
        Ok(Self::from_client(RestClient::new(credentials, Transport::standard()?)))
    }

    /// Handler authenticating at the API gateway with the given header and token
    pub fn new_authenticated(
        base_url: &str,
        auth_token: &str,
        auth_header: &str,
        transport: Option<BaseTransport>,
        scheme: &str,
    ) -> RestClientResult<Self> {
        let credentials = Credentials::new(
            service_base_url(base_url, MONGODB_DATASTORE_BASE_URL),
            scheme,
        )
        .with_auth(auth_header, auth_token);
        Ok(Self::from_client(RestClient::new(
            credentials,
            Transport::build(transport)?,
        )))
    }

    pub fn from_client(client: RestClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }

    /// Get all events matching the filter.
    ///
    /// `filter.number_of_pages` limits how many pages are read; zero reads all.
    pub async fn get_events(
        &self,
        cancel: &CancellationToken,
        filter: &EventFilter,
    ) -> RestClientResult<Vec<KeptnContextExtendedCE>> {
        let mut url = self.client.endpoint(EVENT_PATH)?;
        let pairs = filter.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        fetch_all::<Events>(&self.client, cancel, &url, filter.number_of_pages).await
    }

    /// Poll for events matching the filter until some exist.
    ///
    /// Fails with [`RestClientError::RetryExhausted`](crate::RestClientError::RetryExhausted)
    /// when no attempt found anything.
    pub async fn get_events_with_retry(
        &self,
        cancel: &CancellationToken,
        filter: &EventFilter,
        max_attempts: u32,
        delay: Duration,
    ) -> RestClientResult<Vec<KeptnContextExtendedCE>> {
        retry_until_found(cancel, RetryPolicy::new(max_attempts, delay), || {
            self.get_events(cancel, filter)
        })
        .await
    }
}
