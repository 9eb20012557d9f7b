//! Environment commands

use std::path::Path;

use colored::Colorize;

use gitops_core::{CompileOptions, DirectorySecretSink, add_environment};
use gitops_fs::OsFilesystem;

use crate::commands::{absolute, print_report, secrets_root};
use crate::error::{CliError, Result};

pub fn run_add_environment(name: &str, pipelines_folder: &Path, secrets_folder: Option<&Path>) -> Result<()> {
    let root = absolute(pipelines_folder)?;
    println!("{} Adding environment {}", "=>".blue().bold(), name.cyan());

    let fs = OsFilesystem::new();
    let sink = DirectorySecretSink::new(&fs, secrets_root(&root, secrets_folder)?);
    let report =
        add_environment(&fs, &sink, &root, name, &CompileOptions::default()).map_err(CliError::from_compile)?;

    print_report(&report);
    Ok(())
}
