use std::path::PathBuf;

use anyhow::{Context, Result};
use base64::Engine;
use clap::{Args, Subcommand};
use keptn_api_contract::Project;
use keptn_rest_client::ProjectHandler;
use tokio_util::sync::CancellationToken;

use crate::{print_json, ConnectionArgs};

/// Project-related commands
#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List all projects
    List,
    /// Show a single project
    Get {
        #[arg(value_name = "PROJECT")]
        name: String,
    },
    /// Create a project from a shipyard file
    Create(ProjectCreateArgs),
    /// Delete a project
    Delete {
        #[arg(value_name = "PROJECT")]
        name: String,
    },
    /// Update the git upstream of a project
    Update(GitUpstreamArgs),
}

#[derive(Args, Debug)]
pub struct ProjectCreateArgs {
    #[command(flatten)]
    pub upstream: GitUpstreamArgs,

    /// Shipyard file describing the stages of the project
    #[arg(long, value_name = "FILE")]
    pub shipyard: PathBuf,
}

#[derive(Args, Debug)]
pub struct GitUpstreamArgs {
    #[arg(value_name = "PROJECT")]
    pub name: String,

    #[arg(long, value_name = "URL")]
    pub git_remote_url: Option<String>,

    #[arg(long, value_name = "USER")]
    pub git_user: Option<String>,

    #[arg(long, value_name = "TOKEN", env = "KEPTN_GIT_TOKEN", hide_env_values = true)]
    pub git_token: Option<String>,
}

impl GitUpstreamArgs {
    fn to_project(&self) -> Project {
        Project {
            git_remote_url: self.git_remote_url.clone(),
            git_user: self.git_user.clone(),
            git_token: self.git_token.clone(),
            ..Project::named(&self.name)
        }
    }
}

impl ProjectCreateArgs {
    /// Project payload with the shipyard file base64 encoded
    pub fn to_project(&self) -> Result<Project> {
        let shipyard = std::fs::read(&self.shipyard)
            .with_context(|| format!("Failed to read shipyard file {}", self.shipyard.display()))?;
        Ok(Project {
            shipyard: Some(base64::engine::general_purpose::STANDARD.encode(shipyard)),
            ..self.upstream.to_project()
        })
    }
}

impl ProjectCommands {
    /// Execute the project command
    pub async fn run(self, connection: &ConnectionArgs, cancel: &CancellationToken) -> Result<()> {
        let handler = ProjectHandler::new_authenticated(
            &connection.endpoint,
            &connection.api_token,
            &connection.auth_header,
            connection.transport(),
            &connection.scheme,
        )?;

        match self {
            ProjectCommands::List => print_json(&handler.get_all_projects(cancel).await?),
            ProjectCommands::Get { name } => {
                match handler.get_project(cancel, &Project::named(&name)).await? {
                    Some(project) => print_json(&project),
                    None => anyhow::bail!("project {name} returned no content"),
                }
            }
            ProjectCommands::Create(args) => {
                let context = handler.create_project(cancel, &args.to_project()?).await?;
                print_json(&context)
            }
            ProjectCommands::Delete { name } => {
                let context = handler.delete_project(cancel, &Project::named(&name)).await?;
                print_json(&context)
            }
            ProjectCommands::Update(args) => {
                let context = handler
                    .update_configuration_service_project(cancel, &args.to_project())
                    .await?;
                print_json(&context)
            }
        }
    }
}
