//! Service commands

use colored::Colorize;

use gitops_core::{AddServiceRequest, CompileOptions, DirectorySecretSink, add_service};
use gitops_fs::{Filesystem, OsFilesystem, OverlayFilesystem};

use crate::cli::AddServiceArgs;
use crate::commands::{absolute, print_report, secrets_root};
use crate::error::{CliError, Result};

pub fn run_add_service(args: &AddServiceArgs) -> Result<()> {
    let root = absolute(&args.pipelines_folder)?;
    let secrets = secrets_root(&root, args.secrets_folder.as_deref())?;
    println!(
        "{} Adding service {} to {}/{}",
        "=>".blue().bold(),
        args.service_name.cyan(),
        args.env_name,
        args.app_name
    );

    let request = AddServiceRequest {
        env_name: args.env_name.clone(),
        app_name: args.app_name.clone(),
        service_name: args.service_name.clone(),
        git_repo_url: args.git_repo_url.clone(),
        image_repo: args.image_repo.clone(),
        webhook_secret: args.webhook_secret.clone(),
    };
    let options = CompileOptions::default();
    let disk = OsFilesystem::new();

    if args.dry_run {
        let overlay = OverlayFilesystem::new(&disk);
        let sink = DirectorySecretSink::new(&overlay, secrets);
        let report = add_service(&overlay, &sink, &root, &request, &options).map_err(CliError::from_compile)?;

        println!("{} Nothing written.", "[dry-run]".yellow().bold());
        let captured = overlay.captured();
        for path in report.changed() {
            if let Some(content) = captured.get(path) {
                println!("--- {}", path.to_string().cyan());
                print!("{}", String::from_utf8_lossy(content));
            }
        }
        for dir in overlay.captured_dirs().iter().filter(|d| !disk.is_dir(d)) {
            println!("  {:>9} {}/", "mkdir".blue(), dir);
        }
        print_report(&report);
        return Ok(());
    }

    let sink = DirectorySecretSink::new(&disk, secrets);
    let report = add_service(&disk, &sink, &root, &request, &options).map_err(CliError::from_compile)?;
    print_report(&report);
    Ok(())
}
