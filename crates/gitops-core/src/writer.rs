//! Writes generated resources into a repository tree
//!
//! Content is compared by checksum first, so files whose rendering did not
//! change are left untouched.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use gitops_fs::checksum::compute_checksum;
use gitops_fs::{Filesystem, NormalizedPath};

use crate::Result;
use crate::resources::Resource;

/// What happened to a single path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    Created,
    Updated,
    Unchanged,
}

impl fmt::Display for WriteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        })
    }
}

/// Outcome of persisting a compile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Files in the order they were handled
    pub files: Vec<(NormalizedPath, WriteAction)>,
    /// Directories that were ensured to exist
    pub directories: Vec<NormalizedPath>,
    /// Secrets handed to the secret sink, by secret path
    pub secrets: Vec<String>,
}

impl WriteReport {
    pub fn action(&self, path: &NormalizedPath) -> Option<WriteAction> {
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, action)| *action)
    }

    /// Paths that were created or updated.
    pub fn changed(&self) -> impl Iterator<Item = &NormalizedPath> {
        self.files
            .iter()
            .filter(|(_, action)| *action != WriteAction::Unchanged)
            .map(|(path, _)| path)
    }

    pub fn count(&self, action: WriteAction) -> usize {
        self.files.iter().filter(|(_, a)| *a == action).count()
    }
}

/// Writes documents below a repository root.
pub struct TreeWriter<'a> {
    fs: &'a dyn Filesystem,
    root: NormalizedPath,
    report: WriteReport,
}

impl<'a> TreeWriter<'a> {
    pub fn new(fs: &'a dyn Filesystem, root: NormalizedPath) -> Self {
        Self {
            fs,
            root,
            report: WriteReport::default(),
        }
    }

    /// Render `resource` and write it at `path` relative to the root.
    pub fn write_resource(&mut self, path: &str, resource: &Resource) -> Result<WriteAction> {
        let content = resource.to_yaml(path)?;
        self.write_bytes(path, content.as_bytes())
    }

    /// Serialize `value` in the format implied by the path's extension.
    pub fn write_config<T: Serialize>(&mut self, path: &str, value: &T) -> Result<WriteAction> {
        let target = self.root.join(path);
        let content = gitops_fs::config::encode(&target, value)?;
        self.write_bytes(path, content.as_bytes())
    }

    pub fn write_bytes(&mut self, path: &str, content: &[u8]) -> Result<WriteAction> {
        let target = self.root.join(path);

        let action = if !self.fs.exists(&target) {
            WriteAction::Created
        } else if compute_checksum(&self.fs.read(&target)?) == compute_checksum(content) {
            WriteAction::Unchanged
        } else {
            WriteAction::Updated
        };

        if action == WriteAction::Unchanged {
            debug!(path = %target, "content unchanged, skipping write");
        } else {
            self.fs.write(&target, content)?;
            info!(path = %target, %action, "wrote file");
        }

        self.report.files.push((target, action));
        Ok(action)
    }

    pub fn create_dir(&mut self, path: &str) -> Result<()> {
        let target = self.root.join(path);
        if !self.fs.is_dir(&target) {
            self.fs.create_dir_all(&target)?;
            debug!(path = %target, "created directory");
        }
        self.report.directories.push(target);
        Ok(())
    }

    /// Record a secret handed off elsewhere.
    pub fn record_secret(&mut self, path: &str) {
        self.report.secrets.push(path.to_string());
    }

    pub fn finish(self) -> WriteReport {
        self.report
    }
}
