use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use keptn_api_contract::{SequenceControlParams, SequenceState};
use keptn_rest_client::SequenceControlHandler;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::ConnectionArgs;

/// Sequence-related commands
#[derive(Subcommand, Debug)]
pub enum SequenceCommands {
    /// Pause, resume or abort a running sequence
    Control(SequenceControlArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Pause,
    Resume,
    Abort,
}

impl ControlState {
    fn as_str(self) -> &'static str {
        match self {
            ControlState::Pause => SequenceState::PAUSE,
            ControlState::Resume => SequenceState::RESUME,
            ControlState::Abort => SequenceState::ABORT,
        }
    }
}

#[derive(Args, Debug)]
pub struct SequenceControlArgs {
    #[arg(long)]
    pub project: String,

    #[arg(long)]
    pub keptn_context: String,

    /// Restrict the control to one stage
    #[arg(long, default_value = "")]
    pub stage: String,

    #[arg(value_enum)]
    pub state: ControlState,
}

impl SequenceControlArgs {
    pub fn params(&self) -> SequenceControlParams {
        SequenceControlParams {
            project: self.project.clone(),
            keptn_context: self.keptn_context.clone(),
            stage: self.stage.clone(),
            state: self.state.as_str().to_string(),
        }
    }
}

impl SequenceCommands {
    /// Execute the sequence command
    pub async fn run(self, connection: &ConnectionArgs, cancel: &CancellationToken) -> Result<()> {
        let handler = SequenceControlHandler::new_authenticated(
            &connection.endpoint,
            &connection.api_token,
            &connection.auth_header,
            connection.transport(),
            &connection.scheme,
        )?;

        match self {
            SequenceCommands::Control(args) => {
                let params = args.params();
                handler.control_sequence(cancel, &params).await?;
                info!(
                    project = %params.project,
                    keptn_context = %params.keptn_context,
                    state = %params.state,
                    "sequence state changed"
                );
                Ok(())
            }
        }
    }
}
