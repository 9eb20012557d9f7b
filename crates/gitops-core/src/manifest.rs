//! The manifest model
//!
//! The manifest (`pipelines.yaml`) is the single source of truth for the
//! delivery topology: environments contain applications, which contain
//! services. Every generated resource is derived from it.
//!
//! Mutations never modify a manifest in place. They return a rebuilt copy,
//! so one manifest can be fed to several derivations without aliasing.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use gitops_fs::{ConfigStore, Filesystem, NormalizedPath};

use crate::options::CompileOptions;
use crate::validation::{RepositoryRef, validate_name};
use crate::{Error, Result};

/// Root of the delivery topology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// URL of the GitOps repository the delivery controller reconciles from
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub git_ops_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Config>,

    /// Environments in display and processing order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environments: Vec<Environment>,
}

/// Optional cluster-wide configuration. Each section switches on a builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipelines: Option<PipelinesConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryConfig>,
}

/// CI pipelines configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelinesConfig {
    /// Namespace the CI resources live in
    pub name: String,
}

/// Cluster-delivery configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Namespace the delivery applications are created in
    pub namespace: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,

    /// Pipeline template and bindings shared by the environment's services
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipelines: Option<TemplateBinding>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apps: Vec<Application>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<Webhook>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipelines: Option<TemplateBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webhook {
    pub secret: SecretRef,
}

/// Reference to a Secret by name and namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRef {
    pub name: String,
    pub namespace: String,
}

/// A pipeline template plus the ordered trigger bindings that feed it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateBinding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<String>,
}

impl Manifest {
    pub fn new(git_ops_url: impl Into<String>) -> Self {
        Self {
            git_ops_url: git_ops_url.into(),
            ..Self::default()
        }
    }

    /// Load the manifest at `path`, or an empty manifest if there is none.
    pub fn load(fs: &dyn Filesystem, path: &NormalizedPath) -> Result<Self> {
        match ConfigStore::new(fs).load_optional::<Manifest>(path)? {
            Some(manifest) => Ok(manifest),
            None => {
                debug!(path = %path, "no manifest found, starting from an empty one");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, fs: &dyn Filesystem, path: &NormalizedPath) -> Result<()> {
        ConfigStore::new(fs).save(path, self)?;
        Ok(())
    }

    pub fn pipelines_config(&self) -> Option<&PipelinesConfig> {
        self.config.as_ref()?.pipelines.as_ref()
    }

    pub fn delivery_config(&self) -> Option<&DeliveryConfig> {
        self.config.as_ref()?.delivery.as_ref()
    }

    pub fn environment(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|env| env.name == name)
    }

    /// Check the structural invariants of a loaded manifest.
    ///
    /// Names must be valid and unique at every level.
    pub fn validate(&self) -> Result<()> {
        let mut envs = HashSet::new();
        for env in &self.environments {
            validate_name("environment", &env.name)?;
            if !envs.insert(env.name.as_str()) {
                return Err(Error::DuplicateEnvironment {
                    name: env.name.clone(),
                });
            }

            let mut apps = HashSet::new();
            for app in &env.apps {
                validate_name("application", &app.name)?;
                if !apps.insert(app.name.as_str()) {
                    return Err(Error::DuplicateApplication {
                        env: env.name.clone(),
                        name: app.name.clone(),
                    });
                }

                let mut services = HashSet::new();
                for service in &app.services {
                    validate_name("service", &service.name)?;
                    if !services.insert(service.name.as_str()) {
                        return Err(Error::DuplicateService {
                            env: env.name.clone(),
                            app: app.name.clone(),
                            name: service.name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// A copy with `env` appended.
    pub fn with_environment(&self, env: Environment) -> Result<Self> {
        if self.environment(&env.name).is_some() {
            return Err(Error::DuplicateEnvironment { name: env.name });
        }
        let mut rebuilt = self.clone();
        rebuilt.environments.push(env);
        Ok(rebuilt)
    }

    /// A copy with `service` appended to `app` in `env`.
    ///
    /// The application is created at the end of the environment's list when
    /// its name is unseen.
    pub fn with_service(&self, env: &str, app: &str, service: Service) -> Result<Self> {
        self.rebuild_environment(env, |environment| {
            let mut environment = environment.clone();
            match environment.apps.iter_mut().find(|a| a.name == app) {
                Some(application) => {
                    if application.service(&service.name).is_some() {
                        return Err(Error::DuplicateService {
                            env: env.to_string(),
                            app: app.to_string(),
                            name: service.name,
                        });
                    }
                    application.services.push(service);
                }
                None => environment.apps.push(Application {
                    name: app.to_string(),
                    services: vec![service],
                }),
            }
            Ok(environment)
        })
    }

    /// A copy where `env` has pipelines, using `defaults` only if none are set.
    pub fn with_environment_pipelines(&self, env: &str, defaults: TemplateBinding) -> Result<Self> {
        self.rebuild_environment(env, |environment| {
            let mut environment = environment.clone();
            if environment.pipelines.is_none() {
                environment.pipelines = Some(defaults);
            }
            Ok(environment)
        })
    }

    fn rebuild_environment<F>(&self, name: &str, rebuild: F) -> Result<Self>
    where
        F: FnOnce(&Environment) -> Result<Environment>,
    {
        let index = self
            .environments
            .iter()
            .position(|env| env.name == name)
            .ok_or_else(|| Error::UnknownEnvironment {
                name: name.to_string(),
            })?;

        let mut rebuilt = self.clone();
        rebuilt.environments[index] = rebuild(&self.environments[index])?;
        Ok(rebuilt)
    }
}

/// Write a fresh manifest for a repository rooted at `root`.
///
/// Fails if a manifest already exists there. The namespaces switch on CI
/// and delivery generation for every later compile.
pub fn init_manifest(
    fs: &dyn Filesystem,
    root: &NormalizedPath,
    git_ops_url: &str,
    pipelines_namespace: Option<&str>,
    delivery_namespace: Option<&str>,
    options: &CompileOptions,
) -> Result<Manifest> {
    let path = options.manifest_path(root);
    if fs.exists(&path) {
        return Err(Error::ManifestExists {
            path: path.to_native(),
        });
    }

    RepositoryRef::parse(git_ops_url)?;
    for namespace in pipelines_namespace.iter().chain(delivery_namespace.iter()) {
        validate_name("namespace", namespace)?;
    }

    let config = match (pipelines_namespace, delivery_namespace) {
        (None, None) => None,
        (pipelines, delivery) => Some(Config {
            pipelines: pipelines.map(|name| PipelinesConfig { name: name.to_string() }),
            delivery: delivery.map(|namespace| DeliveryConfig {
                namespace: namespace.to_string(),
            }),
        }),
    };
    let manifest = Manifest {
        config,
        ..Manifest::new(git_ops_url)
    };

    manifest.save(fs, &path)?;
    info!(path = %path, "initialised manifest");
    Ok(manifest)
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pipelines: None,
            apps: Vec::new(),
        }
    }

    pub fn application(&self, name: &str) -> Option<&Application> {
        self.apps.iter().find(|app| app.name == name)
    }
}

impl Application {
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|svc| svc.name == name)
    }
}

impl Service {
    pub fn new(name: impl Into<String>, source_url: Option<String>) -> Self {
        Self {
            name: name.into(),
            source_url,
            webhook: None,
            pipelines: None,
        }
    }
}
