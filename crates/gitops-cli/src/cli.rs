//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Generate and maintain a GitOps repository from its pipelines manifest
#[derive(Parser, Debug)]
#[command(name = "gitops")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create a new pipelines.yaml
    ///
    /// Examples:
    ///   gitops init --gitops-repo-url https://github.com/org/gitops
    ///   gitops init --gitops-repo-url https://github.com/org/gitops --pipelines-namespace cicd
    Init(InitArgs),

    /// Manage environments
    Environment {
        #[command(subcommand)]
        action: EnvironmentAction,
    },

    /// Manage services
    Service {
        #[command(subcommand)]
        action: ServiceAction,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct InitArgs {
    /// URL of the GitOps repository
    #[arg(long)]
    pub gitops_repo_url: String,

    /// Namespace for CI resources; enables pipeline generation
    #[arg(long)]
    pub pipelines_namespace: Option<String>,

    /// Namespace for delivery applications; enables their generation
    #[arg(long)]
    pub delivery_namespace: Option<String>,

    /// Directory to create the manifest in
    #[arg(long, default_value = ".")]
    pub output: PathBuf,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentAction {
    /// Add an environment to the manifest
    Add {
        /// Name of the new environment
        #[arg(long)]
        env_name: String,

        /// Folder containing pipelines.yaml
        #[arg(long, env = "GITOPS_PIPELINES_FOLDER", default_value = ".")]
        pipelines_folder: PathBuf,

        /// Folder that receives generated secrets [default: parent of the pipelines folder]
        #[arg(long, env = "GITOPS_SECRETS_FOLDER")]
        secrets_folder: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ServiceAction {
    /// Add a service to an application, creating the application if needed
    ///
    /// Examples:
    ///   gitops service add --env-name dev --app-name web --service-name api
    ///   gitops service add --env-name dev --app-name web --service-name api \
    ///       --git-repo-url https://github.com/org/api --dry-run
    Add(AddServiceArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AddServiceArgs {
    /// Environment the service is deployed to
    #[arg(long)]
    pub env_name: String,

    /// Application the service belongs to
    #[arg(long)]
    pub app_name: String,

    /// Name of the new service
    #[arg(long)]
    pub service_name: String,

    /// Source repository of the service; enables CI wiring
    #[arg(long)]
    pub git_repo_url: Option<String>,

    /// Image repository, <registry>/<org>/<name> or <org>/<name>
    #[arg(long)]
    pub image_repo: Option<String>,

    /// Webhook token [default: generated]
    #[arg(long, env = "GITOPS_WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: Option<String>,

    /// Folder containing pipelines.yaml
    #[arg(long, env = "GITOPS_PIPELINES_FOLDER", default_value = ".")]
    pub pipelines_folder: PathBuf,

    /// Folder that receives generated secrets [default: parent of the pipelines folder]
    #[arg(long, env = "GITOPS_SECRETS_FOLDER")]
    pub secrets_folder: Option<PathBuf>,

    /// Print what would be written without touching the disk
    #[arg(long)]
    pub dry_run: bool,
}
