use std::time::Duration;

use anyhow::Result;
use clap::{Args, Subcommand};
use keptn_api_contract::EventFilter;
use keptn_rest_client::EventHandler;
use tokio_util::sync::CancellationToken;

use crate::{print_json, ConnectionArgs};

/// Event-related commands
#[derive(Subcommand, Debug)]
pub enum EventCommands {
    /// List events matching a filter
    List(EventListArgs),
}

#[derive(Args, Debug, Default)]
pub struct EventListArgs {
    #[arg(long, default_value = "")]
    pub project: String,

    #[arg(long, default_value = "")]
    pub stage: String,

    #[arg(long, default_value = "")]
    pub service: String,

    /// Event type, e.g. sh.keptn.event.evaluation.finished
    #[arg(long = "type", default_value = "")]
    pub event_type: String,

    #[arg(long, default_value = "")]
    pub keptn_context: String,

    #[arg(long, default_value = "")]
    pub event_id: String,

    #[arg(long, default_value = "")]
    pub page_size: String,

    /// Stop after this many pages (0 reads all)
    #[arg(long, default_value_t = 0)]
    pub pages: u32,

    /// Only events newer than this timestamp
    #[arg(long, default_value = "")]
    pub from_time: String,

    /// Poll until events show up, at most this many times
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Pause between polls
    #[arg(long, value_name = "MS", default_value_t = 5000)]
    pub retry_delay_ms: u64,
}

impl EventListArgs {
    pub fn filter(&self) -> EventFilter {
        EventFilter {
            project: self.project.clone(),
            stage: self.stage.clone(),
            service: self.service.clone(),
            event_type: self.event_type.clone(),
            keptn_context: self.keptn_context.clone(),
            event_id: self.event_id.clone(),
            page_size: self.page_size.clone(),
            number_of_pages: self.pages,
            from_time: self.from_time.clone(),
        }
    }
}

impl EventCommands {
    /// Execute the event command
    pub async fn run(self, connection: &ConnectionArgs, cancel: &CancellationToken) -> Result<()> {
        let handler = EventHandler::new_authenticated(
            &connection.endpoint,
            &connection.api_token,
            &connection.auth_header,
            connection.transport(),
            &connection.scheme,
        )?;

        match self {
            EventCommands::List(args) => {
                let filter = args.filter();
                let events = match args.retries {
                    Some(retries) => {
                        handler
                            .get_events_with_retry(
                                cancel,
                                &filter,
                                retries,
                                Duration::from_millis(args.retry_delay_ms),
                            )
                            .await?
                    }
                    None => handler.get_events(cancel, &filter).await?,
                };
                print_json(&events)
            }
        }
    }
}
