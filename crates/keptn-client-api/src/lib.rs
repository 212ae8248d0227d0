//! Client capability traits for the Keptn control plane
//!
//! Callers program against these traits; `keptn-rest-client` provides the
//! HTTP implementation. Every operation takes a [`CancellationToken`] that
//! aborts the in-flight request and any pending retry sleep.

use std::time::Duration;

use async_trait::async_trait;
use keptn_api_contract::*;
use thiserror::Error;
pub use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum ClientApiError {
    /// The control plane answered with a failure status
    #[error("server error: {0}")]
    Server(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("operation cancelled")]
    Cancelled,
    /// Failure raised on the client side, such as a transport or decode error
    #[error("unexpected: {0}")]
    Unexpected(String),
}

pub type ClientApiResult<T> = Result<T, ClientApiError>;

#[async_trait]
pub trait ProjectsApi: Send + Sync {
    async fn create_project(
        &self,
        cancel: &CancellationToken,
        project: &Project,
    ) -> ClientApiResult<Option<EventContext>>;

    async fn delete_project(
        &self,
        cancel: &CancellationToken,
        project: &Project,
    ) -> ClientApiResult<Option<EventContext>>;

    async fn get_project(
        &self,
        cancel: &CancellationToken,
        project: &Project,
    ) -> ClientApiResult<Option<Project>>;

    async fn get_all_projects(&self, cancel: &CancellationToken) -> ClientApiResult<Vec<Project>>;

    async fn update_configuration_service_project(
        &self,
        cancel: &CancellationToken,
        project: &Project,
    ) -> ClientApiResult<Option<EventContext>>;
}

#[async_trait]
pub trait EventsApi: Send + Sync {
    async fn get_events(
        &self,
        cancel: &CancellationToken,
        filter: &EventFilter,
    ) -> ClientApiResult<Vec<KeptnContextExtendedCE>>;

    /// Poll until at least one matching event exists or the attempts run out.
    async fn get_events_with_retry(
        &self,
        cancel: &CancellationToken,
        filter: &EventFilter,
        max_attempts: u32,
        delay: Duration,
    ) -> ClientApiResult<Vec<KeptnContextExtendedCE>>;
}

#[async_trait]
pub trait SequencesApi: Send + Sync {
    async fn control_sequence(
        &self,
        cancel: &CancellationToken,
        params: &SequenceControlParams,
    ) -> ClientApiResult<()>;
}
