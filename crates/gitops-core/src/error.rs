//! Error types for gitops-core

use std::path::PathBuf;

/// Result type for gitops-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while compiling or persisting a manifest
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The named environment is not in the manifest
    #[error("Environment {name:?} does not exist")]
    UnknownEnvironment { name: String },

    #[error("Environment {name:?} already exists")]
    DuplicateEnvironment { name: String },

    #[error("Application {name:?} is defined more than once in environment {env:?}")]
    DuplicateApplication { env: String, name: String },

    #[error("Service {name:?} already exists in application {app:?} of environment {env:?}")]
    DuplicateService {
        env: String,
        app: String,
        name: String,
    },

    /// A name that cannot be used as a path segment and Kubernetes label
    #[error("Invalid {kind} name {name:?}: {reason}")]
    InvalidName {
        kind: &'static str,
        name: String,
        reason: String,
    },

    #[error("Invalid repository URL {url:?}: {reason}")]
    InvalidRepositoryUrl { url: String, reason: String },

    #[error("Invalid image repository {repo:?}: expected <registry>/<org>/<name> or <org>/<name>")]
    InvalidImageRepository { repo: String },

    #[error("A manifest already exists at {path}")]
    ManifestExists { path: PathBuf },

    /// A generated resource could not be rendered
    #[error("Failed to serialize {path}: {source}")]
    Serialize {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Filesystem or manifest (de)serialization error from gitops-fs
    #[error(transparent)]
    Fs(#[from] gitops_fs::Error),
}

impl Error {
    /// True for errors raised before anything is mutated or written.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownEnvironment { .. }
                | Self::DuplicateEnvironment { .. }
                | Self::DuplicateApplication { .. }
                | Self::DuplicateService { .. }
                | Self::InvalidName { .. }
                | Self::InvalidRepositoryUrl { .. }
                | Self::InvalidImageRepository { .. }
                | Self::ManifestExists { .. }
        )
    }
}
