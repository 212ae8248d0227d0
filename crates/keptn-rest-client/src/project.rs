//! Project endpoints of the control plane

use keptn_api_contract::{EventContext, Project, Projects};
use tokio_util::sync::CancellationToken;

use crate::auth::{service_base_url, Credentials, DEFAULT_SCHEME};
use crate::client::RestClient;
use crate::error::RestClientResult;
use crate::pagination::fetch_all;
use crate::transport::{BaseTransport, Transport};

/// Path segment of the shipyard controller behind the API gateway
pub const SHIPYARD_CONTROLLER_BASE_URL: &str = "controlPlane";

const V1_PROJECT_PATH: &str = "/v1/project";

/// Handles projects
#[derive(Debug, Clone)]
pub struct ProjectHandler {
    client: RestClient,
}

impl ProjectHandler {
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

    /// Create a new project
    pub async fn create_project(
        &self,
        cancel: &CancellationToken,
        project: &Project,
    ) -> RestClientResult<Option<EventContext>> {
        let url = self.client.endpoint(V1_PROJECT_PATH)?;
        self.client.post_with_context(cancel, url, project).await
    }

    /// Delete a project
    pub async fn delete_project(
        &self,
        cancel: &CancellationToken,
        project: &Project,
    ) -> RestClientResult<Option<EventContext>> {
        let url = self.project_url(project)?;
        self.client.delete_with_context(cancel, url).await
    }

    /// Get a project; `None` when the server answers with an empty body
    pub async fn get_project(
        &self,
        cancel: &CancellationToken,
        project: &Project,
    ) -> RestClientResult<Option<Project>> {
        let url = self.project_url(project)?;
        Ok(self.client.get(cancel, url).await?.into_option())
    }

    /// Get every project, following all pages
    pub async fn get_all_projects(&self, cancel: &CancellationToken) -> RestClientResult<Vec<Project>> {
        let url = self.client.endpoint(V1_PROJECT_PATH)?;
        fetch_all::<Projects>(&self.client, cancel, &url, 0).await
    }

    /// Update the project's configuration-service settings (git upstream and credentials)
    pub async fn update_configuration_service_project(
        &self,
        cancel: &CancellationToken,
        project: &Project,
    ) -> RestClientResult<Option<EventContext>> {
        let url = self.project_url(project)?;
        self.client.put_with_context(cancel, url, project).await
    }

    fn project_url(&self, project: &Project) -> RestClientResult<url::Url> {
        self.client
            .endpoint_with_segments(V1_PROJECT_PATH, &[project.project_name.as_str()])
    }
}
