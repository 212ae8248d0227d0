//! Sequence control (pause, resume, abort)

use keptn_api_contract::validation::validate_sequence_control_params;
use keptn_api_contract::{SequenceControlBody, SequenceControlParams};
use tokio_util::sync::CancellationToken;

use crate::auth::{service_base_url, Credentials, DEFAULT_SCHEME};
use crate::client::RestClient;
use crate::error::RestClientResult;
use crate::project::SHIPYARD_CONTROLLER_BASE_URL;
use crate::transport::{BaseTransport, Transport};

const V1_SEQUENCE_PATH: &str = "/v1/sequence";

/// Handles sequence control
#[derive(Debug, Clone)]
pub struct SequenceControlHandler {
    client: RestClient,
}

impl SequenceControlHandler {
    /// Handler talking to the service directly, without authentication
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
            service_base_url(base_url, SHIPYARD_CONTROLLER_BASE_URL),
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

    /// Change the state of a running sequence.
    ///
    /// Parameters are validated locally first; invalid ones never reach the network.
    pub async fn control_sequence(
        &self,
        cancel: &CancellationToken,
        params: &SequenceControlParams,
    ) -> RestClientResult<()> {
        validate_sequence_control_params(params)?;

        let url = self.client.endpoint_with_segments(
            V1_SEQUENCE_PATH,
            &[params.project.as_str(), params.keptn_context.as_str(), "control"],
        )?;
        self.client
            .post(cancel, url, &SequenceControlBody::from(params))
            .await?;
        Ok(())
    }
}
