//! Manifest-to-resource-tree compiler for GitOps repositories
//!
//! A manifest (`pipelines.yaml`) describes environments, the applications
//! deployed to them and the services those applications are built from.
//! This crate turns a mutation of that manifest into the full set of files a
//! GitOps repository needs:
//!
//! - layered Kustomize bases and overlays ([`kustomize`])
//! - CI trigger bindings and webhook secrets ([`pipelines`])
//! - cluster-delivery application descriptors ([`delivery`])
//!
//! # Architecture
//!
//! ```text
//!          service / environment        (orchestration)
//!                    |
//!     +--------------+--------------+
//!     |              |              |
//! kustomize      pipelines      delivery   (builders, independent)
//!     |              |              |
//!     +------ resources::merge -----+
//!                    |
//!          compiler::persist --> gitops-fs, SecretSink
//! ```
//!
//! Everything up to `persist` is pure. Every generated path comes from
//! [`paths::TreePath`], so repeated compiles produce identical keys and
//! merging de-duplicates.

pub mod compiler;
pub mod delivery;
pub mod environment;
pub mod error;
pub mod kustomize;
pub mod manifest;
pub mod options;
pub mod paths;
pub mod pipelines;
pub mod resources;
pub mod secrets;
pub mod service;
pub mod validation;
pub mod writer;

pub use compiler::Compiled;
pub use environment::add_environment;
pub use error::{Error, Result};
pub use manifest::{Manifest, init_manifest};
pub use options::CompileOptions;
pub use paths::TreePath;
pub use resources::{Resource, Resources, merge, reconcile};
pub use secrets::{DirectorySecretSink, SecretSink};
pub use service::{AddServiceRequest, add_service};
pub use writer::{WriteAction, WriteReport};
