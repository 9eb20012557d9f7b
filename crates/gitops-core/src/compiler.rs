//! Compile results and persisting them
//!
//! A compile is derived entirely in memory first. Only a complete
//! [`Compiled`] is ever written, with the manifest last so that a failed
//! write leaves the manifest describing the previous state.

use tracing::{info, warn};

use gitops_fs::{Filesystem, NormalizedPath};

use crate::manifest::Manifest;
use crate::options::CompileOptions;
use crate::paths::KUSTOMIZATION;
use crate::resources::{Kustomization, Resources, reconcile};
use crate::secrets::SecretSink;
use crate::writer::{TreeWriter, WriteReport};
use crate::Result;

/// Everything one compile produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    /// The manifest after the mutation
    pub manifest: Manifest,
    /// Documents for the repository tree, keyed by relative path
    pub resources: Resources,
    /// Secrets for the secret sink, keyed by path below the secrets root
    pub secrets: Resources,
    /// Directories that must exist even when empty
    pub directories: Vec<String>,
}

impl Compiled {
    /// Fold previously persisted resources into this compile.
    pub fn reconciled_with(mut self, previous: &Resources) -> Self {
        self.resources = reconcile(previous, &self.resources);
        self
    }
}

/// Read the persisted kustomizations at the paths `compiled` will write.
///
/// A kustomization that cannot be parsed is logged and left out, so the
/// derived one replaces it.
pub fn load_previous(fs: &dyn Filesystem, root: &NormalizedPath, compiled: &Compiled) -> Result<Resources> {
    let mut previous = Resources::new();
    for path in compiled.resources.keys().filter(|p| p.ends_with(KUSTOMIZATION)) {
        let target = root.join(path);
        if !fs.exists(&target) {
            continue;
        }
        let bytes = fs.read(&target)?;
        match serde_yaml::from_slice::<Kustomization>(&bytes) {
            Ok(kustomization) => {
                previous.insert(path, kustomization);
            }
            Err(e) => {
                warn!(path = %target, error = %e, "unreadable kustomization will be replaced");
            }
        }
    }
    Ok(previous)
}

/// Reconcile `compiled` with the tree under `root` and write it out.
pub fn persist(
    fs: &dyn Filesystem,
    sink: &dyn SecretSink,
    root: &NormalizedPath,
    compiled: Compiled,
    options: &CompileOptions,
) -> Result<WriteReport> {
    let previous = load_previous(fs, root, &compiled)?;
    let compiled = compiled.reconciled_with(&previous);

    let mut writer = TreeWriter::new(fs, root.clone());
    for (path, resource) in compiled.resources.iter() {
        writer.write_resource(path, resource)?;
    }
    for dir in &compiled.directories {
        writer.create_dir(dir)?;
    }
    for (path, secret) in compiled.secrets.iter() {
        sink.accept(path, secret)?;
        writer.record_secret(path);
    }
    writer.write_config(&options.manifest_file, &compiled.manifest)?;

    let report = writer.finish();
    info!(
        changed = report.changed().count(),
        secrets = report.secrets.len(),
        "persisted compile"
    );
    Ok(report)
}
