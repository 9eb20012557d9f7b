//! Kustomize tree builder
//!
//! Every service and application gets a three-tier layout:
//!
//! ```text
//! <dir>/kustomization.yaml           bases: [overlays]
//! <dir>/overlays/kustomization.yaml  bases: [../base]
//! <dir>/base/kustomization.yaml      bases: [...]
//! ```
//!
//! An application's base aggregates its services. An environment's base
//! aggregates its applications' overlays, but only when neither CI nor
//! delivery is configured; otherwise those configurations wire environments.

use tracing::debug;

use crate::manifest::{Application, Environment, Manifest};
use crate::paths::{self, TreePath};
use crate::resources::{Kustomization, Namespace, Resources};
use crate::validation::RepositoryRef;

/// Label tying an application to the repository it is delivered from
pub const VCS_SOURCE_LABEL: &str = "app.openshift.io/vcs-source";

/// Derive the Kustomize tree for every environment in `manifest`.
pub fn build(manifest: &Manifest, repository: &RepositoryRef) -> Resources {
    let mut resources = Resources::new();
    let wire_environments = manifest.pipelines_config().is_none() && manifest.delivery_config().is_none();

    for env in &manifest.environments {
        for app in &env.apps {
            add_application(&mut resources, env, app, repository);
        }
        if wire_environments {
            add_environment(&mut resources, env);
        }
    }

    debug!(count = resources.len(), "derived kustomizations");
    resources
}

/// Resources for one environment's own base, independent of its applications.
pub fn environment_base(env: &Environment) -> Resources {
    let mut resources = Resources::new();
    add_environment(&mut resources, env);
    resources
}

fn add_application(resources: &mut Resources, env: &Environment, app: &Application, repository: &RepositoryRef) {
    let (env_name, app_name) = (env.name.as_str(), app.name.as_str());

    for service in &app.services {
        let service_name = service.name.as_str();
        resources.insert(
            TreePath::ServiceBase { env: env_name, app: app_name, service: service_name },
            Kustomization::with_bases(["./config"]),
        );
        resources.insert(
            TreePath::ServiceOverlay { env: env_name, app: app_name, service: service_name },
            Kustomization::with_bases(["../base"]),
        );
        resources.insert(
            TreePath::ServiceTop { env: env_name, app: app_name, service: service_name },
            Kustomization::with_bases(["overlays"]),
        );
    }

    resources.insert(
        TreePath::AppBase { env: env_name, app: app_name },
        Kustomization::with_bases(app.services.iter().map(|svc| paths::service_ref(&svc.name))),
    );
    resources.insert(
        TreePath::AppOverlay { env: env_name, app: app_name },
        Kustomization::with_bases(["../base"]),
    );
    resources.insert(
        TreePath::AppTop { env: env_name, app: app_name },
        Kustomization::with_bases(["overlays"]).label(VCS_SOURCE_LABEL, repository.label_value()),
    );
}

fn add_environment(resources: &mut Resources, env: &Environment) {
    let env_name = env.name.as_str();
    let base = Kustomization {
        resources: vec![paths::env_namespace_file(env_name)],
        ..Kustomization::with_bases(env.apps.iter().map(|app| paths::app_overlay_ref(&app.name)))
    };

    resources.insert(TreePath::EnvBase { env: env_name }, base);
    resources.insert(TreePath::EnvNamespace { env: env_name }, Namespace::new(env_name));
}
