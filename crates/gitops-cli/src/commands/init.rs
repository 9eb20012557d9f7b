//! The init command

use colored::Colorize;

use gitops_core::{CompileOptions, init_manifest};
use gitops_fs::OsFilesystem;

use crate::cli::InitArgs;
use crate::commands::absolute;
use crate::error::{CliError, Result};

pub fn run_init(args: &InitArgs) -> Result<()> {
    let root = absolute(&args.output)?;
    let options = CompileOptions::default();
    println!("{} Initialising {}", "=>".blue().bold(), root.to_string().cyan());

    init_manifest(
        &OsFilesystem::new(),
        &root,
        &args.gitops_repo_url,
        args.pipelines_namespace.as_deref(),
        args.delivery_namespace.as_deref(),
        &options,
    )
    .map_err(CliError::from_compile)?;

    println!(
        "{} Created {}",
        "OK".green().bold(),
        options.manifest_path(&root).to_string().cyan()
    );
    Ok(())
}
