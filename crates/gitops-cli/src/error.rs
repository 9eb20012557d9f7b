//! Error types for gitops-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from gitops-core
    #[error(transparent)]
    Core(#[from] gitops_core::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Point the user at a re-run when writing the tree failed part way.
    pub fn from_compile(error: gitops_core::Error) -> Self {
        match error {
            gitops_core::Error::Fs(gitops_fs::Error::Io { .. } | gitops_fs::Error::LockFailed { .. }) => {
                Self::user(format!(
                    "{error}\nThe repository may be partially updated. Re-running the command regenerates identical content."
                ))
            }
            other => Self::Core(other),
        }
    }
}
