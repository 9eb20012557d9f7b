//! GitOps CLI
//!
//! Creates and extends a GitOps repository from its `pipelines.yaml`.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, EnvironmentAction, ServiceAction};
use error::Result;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = execute_command(cli.command) {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise warnings, or debug output with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
    if installed.is_ok() {
        tracing::debug!("Verbose mode enabled");
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init(args) => commands::run_init(&args),
        Commands::Environment {
            action:
                EnvironmentAction::Add {
                    env_name,
                    pipelines_folder,
                    secrets_folder,
                },
        } => commands::run_add_environment(&env_name, &pipelines_folder, secrets_folder.as_deref()),
        Commands::Service {
            action: ServiceAction::Add(args),
        } => commands::run_add_service(&args),
    }
}
