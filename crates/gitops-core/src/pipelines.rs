//! CI pipeline wiring
//!
//! Active only when the manifest configures a CI namespace. For a service
//! with a source repository this produces a webhook secret, a trigger binding
//! that tells the pipeline where to push the service's image, and the
//! binding lists recorded in the manifest.

use tracing::debug;
use uuid::Uuid;

use crate::manifest::{Environment, Manifest, PipelinesConfig, SecretRef, Service, TemplateBinding, Webhook};
use crate::options::CompileOptions;
use crate::paths::{self, TreePath};
use crate::resources::{Kustomization, ObjectMeta, Param, Resources, Secret, TriggerBinding};
use crate::{Error, Result};

/// Key under which the webhook token is stored in its secret
pub const WEBHOOK_SECRET_KEY: &str = "webhook-secret-key";

/// Where a service's pipeline pushes images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTarget {
    pub location: String,
    pub tls_verify: bool,
}

impl ImageTarget {
    /// Resolve the image location for `service`.
    ///
    /// Without an explicit repository the image goes to the in-cluster
    /// registry, which has no externally trusted TLS endpoint, so TLS
    /// verification is turned off for that case only.
    pub fn resolve(
        explicit: Option<&str>,
        config: &PipelinesConfig,
        service: &str,
        options: &CompileOptions,
    ) -> Result<Self> {
        match explicit {
            Some(repo) => {
                validate_image_repo(repo)?;
                Ok(Self {
                    location: repo.to_string(),
                    tls_verify: true,
                })
            }
            None => Ok(Self {
                location: format!("{}/{}/{}", options.internal_registry, config.name, service),
                tls_verify: false,
            }),
        }
    }
}

/// Check the shape of an explicit image repository.
///
/// Accepts `<org>/<name>` and `<registry>/<org>/<name>` with non-empty,
/// whitespace-free segments.
pub fn validate_image_repo(repo: &str) -> Result<()> {
    let segments: Vec<&str> = repo.split('/').collect();
    let well_formed = (2..=3).contains(&segments.len())
        && segments
            .iter()
            .all(|s| !s.is_empty() && !s.chars().any(char::is_whitespace));
    if well_formed {
        Ok(())
    } else {
        Err(Error::InvalidImageRepository {
            repo: repo.to_string(),
        })
    }
}

/// Pipelines an environment gets when CI is configured and none are set.
pub fn environment_defaults(options: &CompileOptions) -> TemplateBinding {
    TemplateBinding {
        template: Some(options.ci_template.clone()),
        bindings: vec![options.push_binding.clone()],
    }
}

/// Record webhook and binding names on a service about to be inserted.
///
/// The service's bindings are its own image binding followed by the
/// environment's bindings. Services without a source repository are
/// returned unchanged.
pub fn wire_service(
    config: &PipelinesConfig,
    env: &Environment,
    app: &str,
    mut service: Service,
    options: &CompileOptions,
) -> Service {
    if service.source_url.is_none() {
        return service;
    }

    service.webhook = Some(Webhook {
        secret: SecretRef {
            name: paths::secret_name(&env.name, &service.name),
            namespace: config.name.clone(),
        },
    });

    let env_bindings = env
        .pipelines
        .clone()
        .unwrap_or_else(|| environment_defaults(options))
        .bindings;
    let mut bindings = vec![paths::binding_name(&env.name, app, &service.name)];
    for binding in env_bindings {
        if !bindings.contains(&binding) {
            bindings.push(binding);
        }
    }
    service.pipelines = Some(TemplateBinding {
        template: None,
        bindings,
    });
    service
}

/// Output of the CI builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiResources {
    /// Resources that belong in the repository tree
    pub resources: Resources,
    /// Secrets that must be handed to the secret sink, never written to the tree
    pub secrets: Resources,
}

/// Derive the CI resources for a service already present in `manifest`.
pub fn build(manifest: &Manifest, env: &str, app: &str, service: &str, image: &ImageTarget, token: &str) -> CiResources {
    let mut output = CiResources::default();
    let Some(config) = manifest.pipelines_config() else {
        return output;
    };
    let Some(svc) = manifest
        .environment(env)
        .and_then(|e| e.application(app))
        .and_then(|a| a.service(service))
    else {
        debug!(env, app, service, "service not in manifest, no CI resources");
        return output;
    };
    let Some(webhook) = &svc.webhook else {
        debug!(env, app, service, "service has no webhook, no CI resources");
        return output;
    };

    output.secrets.insert(
        TreePath::Secret { env, service },
        Secret::opaque(
            ObjectMeta::namespaced(&webhook.secret.namespace, &webhook.secret.name),
            WEBHOOK_SECRET_KEY,
            token,
        ),
    );

    output.resources.insert(
        TreePath::CicdBinding { env, app, service },
        image_binding(config, env, app, service, image),
    );
    output.resources.insert(
        TreePath::CicdBase,
        Kustomization::with_resources([paths::binding_ref(env, app, service)]),
    );

    output
}

/// The trigger binding carrying a service's image location.
pub fn image_binding(config: &PipelinesConfig, env: &str, app: &str, service: &str, image: &ImageTarget) -> TriggerBinding {
    TriggerBinding::new(
        ObjectMeta::namespaced(&config.name, paths::binding_name(env, app, service)),
        vec![
            Param::new("imageRepo", &image.location),
            Param::new("tlsVerify", image.tls_verify.to_string()),
        ],
    )
}

/// A random webhook token of `length` hex characters.
pub fn generate_token(length: usize) -> String {
    let mut token = String::with_capacity(length);
    while token.len() < length {
        token.push_str(&Uuid::new_v4().simple().to_string());
    }
    token.truncate(length);
    token
}
