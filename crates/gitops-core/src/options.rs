//! Compile-time knobs with their defaults

use gitops_fs::NormalizedPath;

/// Name of the manifest file at the repository root
pub const MANIFEST_FILE: &str = "pipelines.yaml";

/// In-cluster registry used when a service has no explicit image repository
pub const INTERNAL_REGISTRY: &str = "image-registry.openshift-image-registry.svc:5000";

/// Pipeline template assigned to environments when CI is configured
pub const DEFAULT_CI_TEMPLATE: &str = "app-ci-template";

/// Binding shared by every service's CI pipeline
pub const PUSH_BINDING: &str = "github-push-binding";

/// Settings shared by every compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// File name of the manifest below the repository root
    pub manifest_file: String,
    /// Registry host for default image locations
    pub internal_registry: String,
    /// Template given to an environment's pipelines when none is set
    pub ci_template: String,
    /// Binding every service pipeline shares with its environment
    pub push_binding: String,
    /// Length of generated webhook tokens
    pub webhook_token_length: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            manifest_file: MANIFEST_FILE.to_string(),
            internal_registry: INTERNAL_REGISTRY.to_string(),
            ci_template: DEFAULT_CI_TEMPLATE.to_string(),
            push_binding: PUSH_BINDING.to_string(),
            webhook_token_length: 20,
        }
    }
}

impl CompileOptions {
    /// Location of the manifest for a repository rooted at `root`.
    pub fn manifest_path(&self, root: &NormalizedPath) -> NormalizedPath {
        root.join(&self.manifest_file)
    }
}
