//! Command implementations for gitops-cli

pub mod environment;
pub mod init;
pub mod service;

use std::path::Path;

use colored::Colorize;

use gitops_core::{WriteAction, WriteReport};
use gitops_fs::NormalizedPath;

pub use environment::run_add_environment;
pub use init::run_init;
pub use service::run_add_service;

/// Resolve a folder argument against the current directory.
pub(crate) fn absolute(path: &Path) -> std::io::Result<NormalizedPath> {
    if path.is_absolute() {
        Ok(NormalizedPath::new(path))
    } else {
        Ok(NormalizedPath::new(std::env::current_dir()?.join(path)))
    }
}

/// Where secrets go when no folder is given: next to the repository, not in it.
pub(crate) fn secrets_root(root: &NormalizedPath, secrets_folder: Option<&Path>) -> std::io::Result<NormalizedPath> {
    match secrets_folder {
        Some(folder) => absolute(folder),
        None => Ok(root.parent().unwrap_or_else(|| root.clone())),
    }
}

pub(crate) fn print_report(report: &WriteReport) {
    for (path, action) in &report.files {
        let label = match action {
            WriteAction::Created => "created".green(),
            WriteAction::Updated => "updated".yellow(),
            WriteAction::Unchanged => continue,
        };
        println!("  {:>9} {}", label, path);
    }
    for secret in &report.secrets {
        println!("  {:>9} {}", "secret".cyan(), secret);
    }
    println!(
        "{} {} written, {} unchanged",
        "OK".green().bold(),
        report.changed().count(),
        report.count(WriteAction::Unchanged)
    );
}
