//! Canonical repository-relative paths and derived names
//!
//! Every generated resource is keyed by the path it is written to. Keys must
//! be identical across runs for merging to de-duplicate, so all paths and
//! every name embedded in them come from this module.

use std::fmt;

pub const KUSTOMIZATION: &str = "kustomization.yaml";

const ENVIRONMENTS_DIR: &str = "environments";
const CICD_BASE_DIR: &str = "config/cicd/base";
const BINDINGS_DIR: &str = "05-bindings";
const DELIVERY_DIR: &str = "config/argocd";
const SECRETS_DIR: &str = "secrets";

/// Name of the webhook secret for a service.
pub fn secret_name(env: &str, service: &str) -> String {
    format!("webhook-secret-{}-{}", env, service)
}

/// Name of the trigger binding that carries a service's image location.
pub fn binding_name(env: &str, app: &str, service: &str) -> String {
    format!("{}-{}-{}-binding", env, app, service)
}

/// Name of the delivery application for an environment's application.
pub fn delivery_app_name(env: &str, app: &str) -> String {
    format!("{}-{}", env, app)
}

/// File holding an environment's namespace, relative to the environment base.
pub fn env_namespace_file(env: &str) -> String {
    format!("{}-environment.yaml", env)
}

/// Reference from an application base to one of its services.
pub fn service_ref(service: &str) -> String {
    format!("../services/{}", service)
}

/// Reference from an environment base to an application's overlays.
pub fn app_overlay_ref(app: &str) -> String {
    format!("../../apps/{}/overlays", app)
}

/// Reference from the CI base kustomization to a binding file.
pub fn binding_ref(env: &str, app: &str, service: &str) -> String {
    format!("{}/{}.yaml", BINDINGS_DIR, binding_name(env, app, service))
}

/// Reference from the delivery kustomization to an application file.
pub fn delivery_app_ref(env: &str, app: &str) -> String {
    format!("{}-app.yaml", delivery_app_name(env, app))
}

/// Directory a delivery application points the controller at.
pub fn app_overlay_dir(env: &str, app: &str) -> String {
    format!("{}/overlays", app_dir(env, app))
}

fn app_dir(env: &str, app: &str) -> String {
    format!("{}/{}/apps/{}", ENVIRONMENTS_DIR, env, app)
}

fn service_dir(env: &str, app: &str, service: &str) -> String {
    format!("{}/services/{}", app_dir(env, app), service)
}

fn env_base_dir(env: &str) -> String {
    format!("{}/{}/env/base", ENVIRONMENTS_DIR, env)
}

/// A location in the generated repository tree.
///
/// Each variant carries exactly the identity it needs, so every value has a
/// path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreePath<'a> {
    ServiceBase { env: &'a str, app: &'a str, service: &'a str },
    /// Directory for a service's raw manifests, referenced by its base
    ServiceConfigDir { env: &'a str, app: &'a str, service: &'a str },
    ServiceOverlay { env: &'a str, app: &'a str, service: &'a str },
    ServiceTop { env: &'a str, app: &'a str, service: &'a str },
    AppBase { env: &'a str, app: &'a str },
    AppOverlay { env: &'a str, app: &'a str },
    AppTop { env: &'a str, app: &'a str },
    EnvBase { env: &'a str },
    EnvNamespace { env: &'a str },
    CicdBase,
    CicdBinding { env: &'a str, app: &'a str, service: &'a str },
    DeliveryApp { env: &'a str, app: &'a str },
    DeliveryBase,
    Secret { env: &'a str, service: &'a str },
}

impl TreePath<'_> {
    /// The forward-slash path relative to the repository root.
    pub fn render(&self) -> String {
        match *self {
            Self::ServiceBase { env, app, service } => {
                format!("{}/base/{}", service_dir(env, app, service), KUSTOMIZATION)
            }
            Self::ServiceConfigDir { env, app, service } => {
                format!("{}/base/config", service_dir(env, app, service))
            }
            Self::ServiceOverlay { env, app, service } => {
                format!("{}/overlays/{}", service_dir(env, app, service), KUSTOMIZATION)
            }
            Self::ServiceTop { env, app, service } => {
                format!("{}/{}", service_dir(env, app, service), KUSTOMIZATION)
            }
            Self::AppBase { env, app } => format!("{}/base/{}", app_dir(env, app), KUSTOMIZATION),
            Self::AppOverlay { env, app } => {
                format!("{}/overlays/{}", app_dir(env, app), KUSTOMIZATION)
            }
            Self::AppTop { env, app } => format!("{}/{}", app_dir(env, app), KUSTOMIZATION),
            Self::EnvBase { env } => format!("{}/{}", env_base_dir(env), KUSTOMIZATION),
            Self::EnvNamespace { env } => format!("{}/{}", env_base_dir(env), env_namespace_file(env)),
            Self::CicdBase => format!("{}/{}", CICD_BASE_DIR, KUSTOMIZATION),
            Self::CicdBinding { env, app, service } => {
                format!("{}/{}", CICD_BASE_DIR, binding_ref(env, app, service))
            }
            Self::DeliveryApp { env, app } => format!("{}/{}", DELIVERY_DIR, delivery_app_ref(env, app)),
            Self::DeliveryBase => format!("{}/{}", DELIVERY_DIR, KUSTOMIZATION),
            Self::Secret { env, service } => {
                format!("{}/{}.yaml", SECRETS_DIR, secret_name(env, service))
            }
        }
    }
}

impl fmt::Display for TreePath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<TreePath<'_>> for String {
    fn from(path: TreePath<'_>) -> Self {
        path.render()
    }
}
