//! Adding an environment

use tracing::info;

use gitops_fs::{Filesystem, NormalizedPath};

use crate::compiler::{self, Compiled};
use crate::manifest::{Environment, Manifest};
use crate::options::CompileOptions;
use crate::resources::Resources;
use crate::secrets::SecretSink;
use crate::validation::validate_name;
use crate::writer::WriteReport;
use crate::{Result, kustomize, pipelines};

/// Append environment `name` to `manifest` and derive its own resources.
///
/// With CI configured the environment gets the default pipelines. Without
/// any configuration it gets its base kustomization and namespace.
pub fn compile(manifest: &Manifest, name: &str, options: &CompileOptions) -> Result<Compiled> {
    validate_name("environment", name)?;

    let mut updated = manifest.with_environment(Environment::new(name))?;
    if manifest.pipelines_config().is_some() {
        updated = updated.with_environment_pipelines(name, pipelines::environment_defaults(options))?;
    }

    let resources = match (updated.pipelines_config(), updated.delivery_config(), updated.environment(name)) {
        (None, None, Some(env)) => kustomize::environment_base(env),
        _ => Resources::new(),
    };

    Ok(Compiled {
        manifest: updated,
        resources,
        secrets: Resources::new(),
        directories: Vec::new(),
    })
}

/// Add environment `name` to the repository rooted at `root`.
pub fn add_environment(
    fs: &dyn Filesystem,
    sink: &dyn SecretSink,
    root: &NormalizedPath,
    name: &str,
    options: &CompileOptions,
) -> Result<WriteReport> {
    let manifest = Manifest::load(fs, &options.manifest_path(root))?;
    manifest.validate()?;

    let compiled = compile(&manifest, name, options)?;
    info!(env = name, "added environment");

    compiler::persist(fs, sink, root, compiled, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::manifest::{Config, PipelinesConfig, TemplateBinding};
    use pretty_assertions::assert_eq;

    #[test]
    fn environment_without_configuration_gets_base_and_namespace() {
        let compiled = compile(&Manifest::new("http://github.com/org/test"), "dev", &CompileOptions::default()).unwrap();

        let keys: Vec<&str> = compiled.resources.keys().collect();
        assert_eq!(
            keys,
            vec![
                "environments/dev/env/base/dev-environment.yaml",
                "environments/dev/env/base/kustomization.yaml"
            ]
        );
        assert_eq!(compiled.manifest.environments, vec![Environment::new("dev")]);
    }

    #[test]
    fn environment_with_ci_gets_default_pipelines() {
        let mut m = Manifest::new("http://github.com/org/test");
        m.config = Some(Config {
            pipelines: Some(PipelinesConfig { name: "cicd".into() }),
            delivery: None,
        });

        let compiled = compile(&m, "dev", &CompileOptions::default()).unwrap();

        assert!(compiled.resources.is_empty());
        assert_eq!(
            compiled.manifest.environments[0].pipelines,
            Some(TemplateBinding {
                template: Some("app-ci-template".into()),
                bindings: vec!["github-push-binding".into()],
            })
        );
    }

    #[test]
    fn duplicate_environment_is_rejected() {
        let m = Manifest::new("http://github.com/org/test")
            .with_environment(Environment::new("dev"))
            .unwrap();
        let err = compile(&m, "dev", &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, Error::DuplicateEnvironment { .. }));
    }

    #[test]
    fn invalid_environment_name_is_rejected() {
        let err = compile(&Manifest::default(), "Dev", &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidName { kind: "environment", .. }));
    }
}
