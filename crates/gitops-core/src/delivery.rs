//! Cluster-delivery application builder
//!
//! One delivery application per (environment, application) pair, each
//! pointing the controller at that application's overlays.

use tracing::debug;

use crate::manifest::Manifest;
use crate::paths::{self, TreePath};
use crate::resources::{
    ApplicationDestination, ApplicationSource, ApplicationSpec, AutomatedSync, DeliveryApplication,
    Kustomization, ObjectMeta, Resources, SyncPolicy,
};

/// API server address used as every application's destination
pub const IN_CLUSTER_SERVER: &str = "https://kubernetes.default.svc";

const DEFAULT_PROJECT: &str = "default";
const TARGET_REVISION: &str = "HEAD";

/// Derive the delivery applications for every environment in `manifest`.
///
/// `namespace` is where the applications are created and `repo_url` is the
/// repository they reconcile from. The delivery kustomization lists the
/// application files in manifest order.
pub fn build(namespace: &str, repo_url: &str, manifest: &Manifest) -> Resources {
    let mut resources = Resources::new();
    let mut listed = Vec::new();

    for env in &manifest.environments {
        for app in &env.apps {
            let (env_name, app_name) = (env.name.as_str(), app.name.as_str());
            resources.insert(
                TreePath::DeliveryApp { env: env_name, app: app_name },
                application(namespace, repo_url, env_name, app_name),
            );
            listed.push(paths::delivery_app_ref(env_name, app_name));
        }
    }

    if !listed.is_empty() {
        resources.insert(TreePath::DeliveryBase, Kustomization::with_resources(listed));
    }

    debug!(count = resources.len(), namespace, "derived delivery applications");
    resources
}

fn application(namespace: &str, repo_url: &str, env: &str, app: &str) -> DeliveryApplication {
    DeliveryApplication::new(
        ObjectMeta::namespaced(namespace, paths::delivery_app_name(env, app)),
        ApplicationSpec {
            project: DEFAULT_PROJECT.to_string(),
            source: ApplicationSource {
                repo_url: repo_url.to_string(),
                path: paths::app_overlay_dir(env, app),
                target_revision: TARGET_REVISION.to_string(),
            },
            destination: ApplicationDestination {
                server: IN_CLUSTER_SERVER.to_string(),
                namespace: env.to_string(),
            },
            sync_policy: Some(SyncPolicy {
                automated: AutomatedSync {
                    prune: true,
                    self_heal: true,
                },
            }),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Environment, Service};
    use crate::resources::Resource;
    use pretty_assertions::assert_eq;

    const REPO: &str = "http://github.com/org/gitops";

    fn manifest() -> Manifest {
        Manifest::new(REPO)
            .with_environment(Environment::new("test-dev"))
            .unwrap()
            .with_service("test-dev", "test-app", Service::new("test", None))
            .unwrap()
    }

    #[test]
    fn one_application_per_environment_app() {
        let resources = build("argocd", REPO, &manifest());
        let keys: Vec<&str> = resources.keys().collect();
        assert_eq!(
            keys,
            vec!["config/argocd/kustomization.yaml", "config/argocd/test-dev-test-app-app.yaml"]
        );
    }

    #[test]
    fn application_shape() {
        let resources = build("argocd", REPO, &manifest());
        let yaml = resources
            .get("config/argocd/test-dev-test-app-app.yaml")
            .unwrap()
            .to_yaml("app")
            .unwrap();
        insta::assert_snapshot!(yaml, @r###"
        apiVersion: argoproj.io/v1alpha1
        kind: Application
        metadata:
          name: test-dev-test-app
          namespace: argocd
        spec:
          project: default
          source:
            repoURL: http://github.com/org/gitops
            path: environments/test-dev/apps/test-app/overlays
            targetRevision: HEAD
          destination:
            server: https://kubernetes.default.svc
            namespace: test-dev
          syncPolicy:
            automated:
              prune: true
              selfHeal: true
        "###);
    }

    #[test]
    fn kustomization_lists_apps_in_manifest_order() {
        let m = manifest()
            .with_service("test-dev", "another", Service::new("svc", None))
            .unwrap()
            .with_environment(Environment::new("prod"))
            .unwrap()
            .with_service("prod", "test-app", Service::new("test", None))
            .unwrap();

        let resources = build("argocd", REPO, &m);
        let listed = resources
            .kustomization("config/argocd/kustomization.yaml")
            .unwrap();
        assert_eq!(
            listed.resources,
            vec![
                "test-dev-test-app-app.yaml",
                "test-dev-another-app.yaml",
                "prod-test-app-app.yaml"
            ]
        );
    }

    #[test]
    fn empty_manifest_has_no_delivery_resources() {
        assert!(build("argocd", REPO, &Manifest::new(REPO)).is_empty());
    }

    #[test]
    fn rebuild_is_byte_identical() {
        let m = manifest();
        let render = |resources: Resources| -> Vec<String> {
            resources
                .iter()
                .map(|(path, r): (&str, &Resource)| r.to_yaml(path).unwrap())
                .collect()
        };
        assert_eq!(render(build("argocd", REPO, &m)), render(build("argocd", REPO, &m)));
    }
}
