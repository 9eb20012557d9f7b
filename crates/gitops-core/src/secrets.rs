//! Secret handling
//!
//! Generated secrets never land in the repository tree. They are handed to a
//! [`SecretSink`], which may seal them or, as [`DirectorySecretSink`] does,
//! write them somewhere outside the tracked tree.

use tracing::info;

use gitops_fs::{Filesystem, NormalizedPath};

use crate::Result;
use crate::resources::Resource;

/// Receives every secret a compile produces.
pub trait SecretSink {
    /// Accept `secret`, keyed by its path relative to the secrets root.
    fn accept(&self, path: &str, secret: &Resource) -> Result<()>;
}

/// Writes secrets unsealed below a directory.
pub struct DirectorySecretSink<'a> {
    fs: &'a dyn Filesystem,
    root: NormalizedPath,
}

impl<'a> DirectorySecretSink<'a> {
    pub fn new(fs: &'a dyn Filesystem, root: impl Into<NormalizedPath>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }
}

impl SecretSink for DirectorySecretSink<'_> {
    fn accept(&self, path: &str, secret: &Resource) -> Result<()> {
        let target = self.root.join(path);
        let yaml = secret.to_yaml(path)?;
        self.fs.write(&target, yaml.as_bytes())?;
        info!(path = %target, "wrote secret");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{ObjectMeta, Secret};
    use gitops_fs::MemoryFilesystem;

    #[test]
    fn directory_sink_writes_below_root() {
        let fs = MemoryFilesystem::new();
        let sink = DirectorySecretSink::new(&fs, "/work");
        let secret = Resource::from(Secret::opaque(
            ObjectMeta::namespaced("cicd", "webhook-secret-dev-api"),
            "webhook-secret-key",
            "token",
        ));

        sink.accept("secrets/webhook-secret-dev-api.yaml", &secret).unwrap();

        let written = fs
            .read(&NormalizedPath::new("/work/secrets/webhook-secret-dev-api.yaml"))
            .unwrap();
        let text = String::from_utf8(written).unwrap();
        assert!(text.contains("webhook-secret-key: token"));
        assert!(text.contains("namespace: cicd"));
    }
}
