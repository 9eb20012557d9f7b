//! Name and URL validation
//!
//! Environment, application and service names become path segments,
//! Kubernetes object names and label values, so they are restricted to
//! DNS-1123 labels.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

const MAX_NAME_LENGTH: usize = 63;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]([-a-z0-9]*[a-z0-9])?$").expect("valid name pattern"));

/// Check that `name` is usable as an environment, application or service name.
pub fn validate_name(kind: &'static str, name: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidName {
        kind,
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(invalid("must be at most 63 characters"));
    }
    if !NAME_PATTERN.is_match(name) {
        return Err(invalid(
            "must consist of lowercase alphanumerics and '-', start with a letter and end with an alphanumeric",
        ));
    }
    Ok(())
}

/// The `<org>/<repo>` pair identified by a repository URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub org: String,
    pub repo: String,
}

impl RepositoryRef {
    /// Parse the last two path segments of a repository URL.
    ///
    /// Accepts `scheme://host/.../org/repo[.git]` and `user@host:org/repo[.git]`.
    pub fn parse(url: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidRepositoryUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(invalid("no repository URL is set"));
        }

        let path = match trimmed.split_once("://") {
            Some((_, rest)) => rest
                .split_once('/')
                .map(|(_, path)| path)
                .ok_or_else(|| invalid("missing repository path"))?,
            None => match trimmed.split_once(':') {
                Some((_, path)) => path,
                None => return Err(invalid("not a URL")),
            },
        };

        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let [.., org, repo] = segments.as_slice() else {
            return Err(invalid("expected at least <org>/<repo> in the path"));
        };

        let repo = repo.strip_suffix(".git").unwrap_or(*repo);
        if repo.is_empty() {
            return Err(invalid("empty repository name"));
        }

        Ok(Self {
            org: (*org).to_string(),
            repo: repo.to_string(),
        })
    }

    /// Value used for the `app.openshift.io/vcs-source` label.
    pub fn label_value(&self) -> String {
        format!("{}/{}", self.org, self.repo)
    }
}
