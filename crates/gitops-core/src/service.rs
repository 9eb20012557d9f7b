//! Adding a service
//!
//! [`compile`] is the pure core: it validates the request, rebuilds the
//! manifest with the new service and derives every resource from the result.
//! [`add_service`] wraps it with loading and persisting.

use tracing::{debug, info};

use gitops_fs::{Filesystem, NormalizedPath};

use crate::compiler::{self, Compiled};
use crate::manifest::{Manifest, Service};
use crate::options::CompileOptions;
use crate::paths::TreePath;
use crate::pipelines::{self, ImageTarget};
use crate::resources::{Resources, merge};
use crate::secrets::SecretSink;
use crate::validation::{RepositoryRef, validate_name};
use crate::writer::WriteReport;
use crate::{Error, Result, delivery, kustomize};

/// A request to add one service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddServiceRequest {
    pub env_name: String,
    pub app_name: String,
    pub service_name: String,
    /// Source repository; CI wiring is only generated when present
    pub git_repo_url: Option<String>,
    /// Explicit image repository, `<registry>/<org>/<name>` or `<org>/<name>`
    pub image_repo: Option<String>,
    /// Webhook token; generated when absent
    pub webhook_secret: Option<String>,
}

impl AddServiceRequest {
    pub fn new(env: impl Into<String>, app: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            env_name: env.into(),
            app_name: app.into(),
            service_name: service.into(),
            ..Self::default()
        }
    }

    pub fn with_git_repo_url(mut self, url: impl Into<String>) -> Self {
        self.git_repo_url = Some(url.into());
        self
    }

    pub fn with_image_repo(mut self, repo: impl Into<String>) -> Self {
        self.image_repo = Some(repo.into());
        self
    }

    pub fn with_webhook_secret(mut self, token: impl Into<String>) -> Self {
        self.webhook_secret = Some(token.into());
        self
    }
}

/// Add a service to `manifest` and derive the resulting tree.
///
/// Nothing is derived unless every check passes. `previous` is the tree
/// written by earlier runs; colliding kustomizations are extended rather
/// than replaced.
pub fn compile(
    manifest: &Manifest,
    previous: &Resources,
    request: &AddServiceRequest,
    options: &CompileOptions,
) -> Result<Compiled> {
    let (env, app, name) = (
        request.env_name.as_str(),
        request.app_name.as_str(),
        request.service_name.as_str(),
    );

    validate_name("environment", env)?;
    validate_name("application", app)?;
    validate_name("service", name)?;

    let environment = manifest.environment(env).ok_or_else(|| unknown_environment(env))?;
    if environment.application(app).and_then(|a| a.service(name)).is_some() {
        return Err(Error::DuplicateService {
            env: env.to_string(),
            app: app.to_string(),
            name: name.to_string(),
        });
    }

    let repository = RepositoryRef::parse(&manifest.git_ops_url)?;
    if let Some(repo) = &request.image_repo {
        pipelines::validate_image_repo(repo)?;
    }

    let mut service = Service::new(name, request.git_repo_url.clone());
    let mut updated = manifest.clone();
    let mut image = None;
    if let Some(ci) = manifest.pipelines_config() {
        updated = updated.with_environment_pipelines(env, pipelines::environment_defaults(options))?;
        let environment = updated.environment(env).ok_or_else(|| unknown_environment(env))?;
        service = pipelines::wire_service(ci, environment, app, service, options);
        image = Some(ImageTarget::resolve(request.image_repo.as_deref(), ci, name, options)?);
    }
    let updated = updated.with_service(env, app, service)?;
    debug!(env, app, service = name, "inserted service");

    let mut resources = kustomize::build(&updated, &repository);
    let mut secrets = Resources::new();

    if let Some(image) = &image {
        let token = match &request.webhook_secret {
            Some(token) => token.clone(),
            None => pipelines::generate_token(options.webhook_token_length),
        };
        let ci = pipelines::build(&updated, env, app, name, image, &token);
        resources = merge(&resources, &ci.resources);
        secrets = ci.secrets;
    }

    if let Some(delivery) = updated.delivery_config() {
        let apps = delivery::build(&delivery.namespace, &updated.git_ops_url, &updated);
        resources = merge(&resources, &apps);
    }

    let compiled = Compiled {
        directories: vec![TreePath::ServiceConfigDir { env, app, service: name }.render()],
        manifest: updated,
        resources,
        secrets,
    };
    Ok(compiled.reconciled_with(previous))
}

/// Add a service to the repository rooted at `root`.
///
/// Loads the manifest (or starts from an empty one), compiles, and writes
/// the tree. Secrets go to `sink`, never into the tree.
pub fn add_service(
    fs: &dyn Filesystem,
    sink: &dyn SecretSink,
    root: &NormalizedPath,
    request: &AddServiceRequest,
    options: &CompileOptions,
) -> Result<WriteReport> {
    let manifest = Manifest::load(fs, &options.manifest_path(root))?;
    manifest.validate()?;

    let compiled = compile(&manifest, &Resources::new(), request, options)?;
    info!(
        env = %request.env_name,
        app = %request.app_name,
        service = %request.service_name,
        resources = compiled.resources.len(),
        "compiled service"
    );

    compiler::persist(fs, sink, root, compiled, options)
}

fn unknown_environment(name: &str) -> Error {
    Error::UnknownEnvironment {
        name: name.to_string(),
    }
}
