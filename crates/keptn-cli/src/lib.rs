//! Keptn command-line client library

pub mod event;
pub mod project;
pub mod sequence;

// Re-export CLI types for testing
pub use clap::{Parser, Subcommand};

use anyhow::Result;
use clap::Args;
use keptn_rest_client::{BaseTransport, TransportConfig};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "keptn")]
#[command(about = "Keptn control-plane client")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Log requests and responses
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Project management commands
    Project {
        #[command(subcommand)]
        subcommand: project::ProjectCommands,
    },
    /// Event queries
    Event {
        #[command(subcommand)]
        subcommand: event::EventCommands,
    },
    /// Sequence control commands
    Sequence {
        #[command(subcommand)]
        subcommand: sequence::SequenceCommands,
    },
}

/// Where the control plane lives and how to authenticate
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// API endpoint, with or without scheme
    #[arg(long, env = "KEPTN_ENDPOINT", value_name = "URL")]
    pub endpoint: String,

    /// API token; requests are unauthenticated when empty
    #[arg(long, env = "KEPTN_API_TOKEN", default_value = "", hide_env_values = true)]
    pub api_token: String,

    /// Header carrying the API token
    #[arg(long, env = "KEPTN_AUTH_HEADER", default_value = "x-token")]
    pub auth_header: String,

    /// URL scheme used for requests
    #[arg(long, default_value = "http", value_parser = ["http", "https"])]
    pub scheme: String,

    /// Verify server TLS certificates
    #[arg(long)]
    pub verify_tls: bool,
}

impl ConnectionArgs {
    pub fn transport(&self) -> Option<BaseTransport> {
        Some(BaseTransport::Standard(TransportConfig {
            accept_invalid_certs: !self.verify_tls,
            ..TransportConfig::default()
        }))
    }
}

impl Cli {
    /// Execute the selected command
    pub async fn run(self, cancel: &CancellationToken) -> Result<()> {
        match self.command {
            Commands::Project { subcommand } => subcommand.run(&self.connection, cancel).await,
            Commands::Event { subcommand } => subcommand.run(&self.connection, cancel).await,
            Commands::Sequence { subcommand } => subcommand.run(&self.connection, cancel).await,
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default level.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print a value as pretty JSON on stdout
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
