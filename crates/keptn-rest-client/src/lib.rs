//! REST API client for the Keptn control plane
//!
//! This crate implements the shared request pipeline used by the project,
//! event and sequence handlers: credential handling, a traced HTTP transport,
//! response classification, cursor pagination and fixed-interval retries.
//! Every operation honours a [`CancellationToken`].

pub mod auth;
pub mod client;
pub mod error;
pub mod event;
pub mod pagination;
pub mod project;
pub mod response;
pub mod retry;
pub mod sequence;
pub mod transport;

pub use auth::*;
pub use client::RestClient;
pub use error::*;
pub use event::*;
pub use project::*;
pub use response::{Outcome, StatusBand};
pub use retry::RetryPolicy;
pub use sequence::*;
pub use transport::*;

pub use keptn_client_api::CancellationToken;

use std::time::Duration;

use async_trait::async_trait;
use keptn_api_contract::*;
use keptn_client_api::{
    ClientApiError, ClientApiResult, EventsApi, ProjectsApi, SequencesApi,
};

impl From<RestClientError> for ClientApiError {
    fn from(err: RestClientError) -> Self {
        match err {
            RestClientError::Cancelled => ClientApiError::Cancelled,
            RestClientError::Validation(message) => ClientApiError::Validation(message),
            err @ (RestClientError::Server { .. } | RestClientError::UnexpectedStatus { .. }) => {
                ClientApiError::Server(err.to_string())
            }
            other => ClientApiError::Unexpected(other.to_string()),
        }
    }
}

#[async_trait]
impl ProjectsApi for ProjectHandler {
    async fn create_project(
        &self,
        cancel: &CancellationToken,
        project: &Project,
    ) -> ClientApiResult<Option<EventContext>> {
        Ok(self.create_project(cancel, project).await?)
    }

    async fn delete_project(
        &self,
        cancel: &CancellationToken,
        project: &Project,
    ) -> ClientApiResult<Option<EventContext>> {
        Ok(self.delete_project(cancel, project).await?)
    }

    async fn get_project(
        &self,
        cancel: &CancellationToken,
        project: &Project,
    ) -> ClientApiResult<Option<Project>> {
        Ok(self.get_project(cancel, project).await?)
    }

    async fn get_all_projects(&self, cancel: &CancellationToken) -> ClientApiResult<Vec<Project>> {
        Ok(self.get_all_projects(cancel).await?)
    }

    async fn update_configuration_service_project(
        &self,
        cancel: &CancellationToken,
        project: &Project,
    ) -> ClientApiResult<Option<EventContext>> {
        Ok(self.update_configuration_service_project(cancel, project).await?)
    }
}

#[async_trait]
impl EventsApi for EventHandler {
    async fn get_events(
        &self,
        cancel: &CancellationToken,
        filter: &EventFilter,
    ) -> ClientApiResult<Vec<KeptnContextExtendedCE>> {
        Ok(self.get_events(cancel, filter).await?)
    }

    async fn get_events_with_retry(
        &self,
        cancel: &CancellationToken,
        filter: &EventFilter,
        max_attempts: u32,
        delay: Duration,
    ) -> ClientApiResult<Vec<KeptnContextExtendedCE>> {
        Ok(self
            .get_events_with_retry(cancel, filter, max_attempts, delay)
            .await?)
    }
}

#[async_trait]
impl SequencesApi for SequenceControlHandler {
    async fn control_sequence(
        &self,
        cancel: &CancellationToken,
        params: &SequenceControlParams,
    ) -> ClientApiResult<()> {
        Ok(self.control_sequence(cancel, params).await?)
    }
}
