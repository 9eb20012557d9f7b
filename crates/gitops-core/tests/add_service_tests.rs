use gitops_core::manifest::{Application, Config, DeliveryConfig, Environment, PipelinesConfig, Service, TemplateBinding};
use gitops_core::{
    AddServiceRequest, CompileOptions, DirectorySecretSink, Error, Manifest, Resources, WriteAction, add_service,
    service,
};
use gitops_fs::{Filesystem, MemoryFilesystem, NormalizedPath};
use pretty_assertions::assert_eq;
use rstest::rstest;

const GITOPS_URL: &str = "http://github.com/org/test";

fn base_manifest(config: Option<Config>) -> Manifest {
    Manifest {
        git_ops_url: GITOPS_URL.into(),
        config,
        environments: vec![Environment {
            name: "test-dev".into(),
            pipelines: None,
            apps: vec![Application {
                name: "test-app".into(),
                services: vec![Service::new("test-svc", Some("https://github.com/myproject/test-svc".into()))],
            }],
        }],
    }
}

fn cicd_config() -> Config {
    Config {
        pipelines: Some(PipelinesConfig { name: "cicd".into() }),
        delivery: None,
    }
}

fn delivery_config() -> Config {
    Config {
        pipelines: None,
        delivery: Some(DeliveryConfig {
            namespace: "argocd".into(),
        }),
    }
}

fn request() -> AddServiceRequest {
    AddServiceRequest::new("test-dev", "test-app", "test")
        .with_git_repo_url("http://github.com/org/test")
        .with_webhook_secret("123")
}

fn compile(manifest: &Manifest, request: &AddServiceRequest) -> gitops_core::Compiled {
    service::compile(manifest, &Resources::new(), request, &CompileOptions::default()).unwrap()
}

#[test]
fn service_without_configuration() {
    let compiled = compile(&base_manifest(None), &request());

    let app_base = compiled
        .resources
        .kustomization("environments/test-dev/apps/test-app/base/kustomization.yaml")
        .unwrap();
    assert_eq!(app_base.bases, vec!["../services/test-svc", "../services/test"]);

    let env_base = compiled
        .resources
        .kustomization("environments/test-dev/env/base/kustomization.yaml")
        .unwrap();
    assert_eq!(env_base.bases, vec!["../../apps/test-app/overlays"]);
    assert_eq!(env_base.resources, vec!["test-dev-environment.yaml"]);

    assert!(compiled.secrets.is_empty());
    let service = &compiled.manifest.environments[0].apps[0].services[1];
    assert_eq!(service.webhook, None);
    assert_eq!(service.pipelines, None);
}

#[test]
fn service_with_ci_configuration() {
    let compiled = compile(&base_manifest(Some(cicd_config())), &request());

    assert_eq!(compiled.secrets.len(), 1);
    let secret = compiled
        .secrets
        .get("secrets/webhook-secret-test-dev-test.yaml")
        .unwrap()
        .to_yaml("secret")
        .unwrap();
    insta::assert_snapshot!(secret, @r###"
    apiVersion: v1
    kind: Secret
    metadata:
      name: webhook-secret-test-dev-test
      namespace: cicd
    type: Opaque
    stringData:
      webhook-secret-key: '123'
    "###);

    let env = &compiled.manifest.environments[0];
    assert_eq!(
        env.pipelines,
        Some(TemplateBinding {
            template: Some("app-ci-template".into()),
            bindings: vec!["github-push-binding".into()],
        })
    );

    let service = env.apps[0].service("test").unwrap();
    assert_eq!(
        service.pipelines,
        Some(TemplateBinding {
            template: None,
            bindings: vec!["test-dev-test-app-test-binding".into(), "github-push-binding".into()],
        })
    );
    let webhook = service.webhook.as_ref().unwrap();
    assert_eq!(webhook.secret.name, "webhook-secret-test-dev-test");
    assert_eq!(webhook.secret.namespace, "cicd");

    assert!(
        compiled
            .resources
            .contains_key("config/cicd/base/05-bindings/test-dev-test-app-test-binding.yaml")
    );
    assert!(!compiled.resources.contains_key("environments/test-dev/env/base/kustomization.yaml"));
    assert!(compiled.resources.keys().all(|k| !k.starts_with("secrets/")));
}

#[rstest]
#[case::delivery_only(delivery_config())]
#[case::ci_and_delivery(Config { pipelines: cicd_config().pipelines, ..delivery_config() })]
fn service_with_delivery_configuration(#[case] config: Config) {
    let compiled = compile(&base_manifest(Some(config)), &request());

    let apps: Vec<&str> = compiled
        .resources
        .keys()
        .filter(|k| k.starts_with("config/argocd/") && k.ends_with("-app.yaml"))
        .collect();
    assert_eq!(apps, vec!["config/argocd/test-dev-test-app-app.yaml"]);
}

#[test]
fn delivery_without_ci_creates_no_secret() {
    let compiled = compile(&base_manifest(Some(delivery_config())), &request());
    assert!(compiled.secrets.is_empty());
}

#[test]
fn service_in_new_application_gets_full_skeleton() {
    let request = AddServiceRequest::new("test-dev", "new-app", "test");
    let compiled = compile(&base_manifest(None), &request);

    let prefix = "environments/test-dev/apps/new-app";
    let mut skeleton: Vec<&str> = compiled
        .resources
        .keys()
        .filter(|k| k.starts_with(prefix))
        .collect();
    skeleton.sort_unstable();
    assert_eq!(
        skeleton,
        vec![
            "environments/test-dev/apps/new-app/base/kustomization.yaml",
            "environments/test-dev/apps/new-app/kustomization.yaml",
            "environments/test-dev/apps/new-app/overlays/kustomization.yaml",
            "environments/test-dev/apps/new-app/services/test/base/kustomization.yaml",
            "environments/test-dev/apps/new-app/services/test/kustomization.yaml",
            "environments/test-dev/apps/new-app/services/test/overlays/kustomization.yaml",
        ]
    );

    let app_base = compiled
        .resources
        .kustomization("environments/test-dev/apps/test-app/base/kustomization.yaml")
        .unwrap();
    assert_eq!(app_base.bases, vec!["../services/test-svc"]);
}

#[rstest]
#[case(None, "image-registry.openshift-image-registry.svc:5000/cicd/test", "'false'")]
#[case(Some("quay.io/user/test"), "quay.io/user/test", "'true'")]
fn image_binding_params(#[case] image_repo: Option<&str>, #[case] location: &str, #[case] tls: &str) {
    let mut request = request();
    request.image_repo = image_repo.map(str::to_string);
    let compiled = compile(&base_manifest(Some(cicd_config())), &request);

    let binding = compiled
        .resources
        .get("config/cicd/base/05-bindings/test-dev-test-app-test-binding.yaml")
        .unwrap()
        .to_yaml("binding")
        .unwrap();
    assert!(binding.contains(location), "{binding}");
    assert!(binding.contains(&format!("value: {tls}")), "{binding}");
}

#[test]
fn recompiling_is_byte_identical() {
    let manifest = base_manifest(Some(Config {
        pipelines: Some(PipelinesConfig { name: "cicd".into() }),
        delivery: Some(DeliveryConfig {
            namespace: "argocd".into(),
        }),
    }));
    let render = |resources: &Resources| -> Vec<(String, String)> {
        resources
            .iter()
            .map(|(path, r)| (path.to_string(), r.to_yaml(path).unwrap()))
            .collect()
    };

    let first = compile(&manifest, &request());
    let second = compile(&manifest, &request());

    assert_eq!(render(&first.resources), render(&second.resources));
    assert_eq!(render(&first.secrets), render(&second.secrets));
    assert_eq!(first.manifest, second.manifest);
}

fn seeded(manifest: &Manifest) -> (MemoryFilesystem, NormalizedPath) {
    let fs = MemoryFilesystem::new();
    let root = NormalizedPath::new("/work/gitops");
    manifest.save(&fs, &root.join("pipelines.yaml")).unwrap();
    (fs, root)
}

#[test]
fn add_service_writes_expected_paths() {
    let (fs, root) = seeded(&base_manifest(Some(Config {
        pipelines: Some(PipelinesConfig { name: "cicd".into() }),
        delivery: Some(DeliveryConfig {
            namespace: "argocd".into(),
        }),
    })));
    let sink = DirectorySecretSink::new(&fs, "/work");

    let report = add_service(&fs, &sink, &root, &request(), &CompileOptions::default()).unwrap();

    for path in [
        "pipelines.yaml",
        "config/cicd/base/kustomization.yaml",
        "config/cicd/base/05-bindings/test-dev-test-app-test-binding.yaml",
        "config/argocd/kustomization.yaml",
        "config/argocd/test-dev-test-app-app.yaml",
        "environments/test-dev/apps/test-app/base/kustomization.yaml",
        "environments/test-dev/apps/test-app/services/test/base/kustomization.yaml",
        "environments/test-dev/apps/test-app/services/test/overlays/kustomization.yaml",
        "environments/test-dev/apps/test-app/services/test/kustomization.yaml",
    ] {
        assert!(fs.exists(&root.join(path)), "missing {path}");
    }
    assert!(fs.is_dir(&root.join("environments/test-dev/apps/test-app/services/test/base/config")));

    assert!(fs.exists(&NormalizedPath::new("/work/secrets/webhook-secret-test-dev-test.yaml")));
    assert!(!fs.exists(&root.join("secrets/webhook-secret-test-dev-test.yaml")));
    assert_eq!(report.secrets, vec!["secrets/webhook-secret-test-dev-test.yaml"]);
    assert_eq!(report.action(&root.join("pipelines.yaml")), Some(WriteAction::Updated));

    let persisted = Manifest::load(&fs, &root.join("pipelines.yaml")).unwrap();
    assert!(persisted.environments[0].apps[0].service("test").is_some());
}

#[test]
fn duplicate_service_leaves_tree_untouched() {
    let (fs, root) = seeded(&base_manifest(None));
    let sink = DirectorySecretSink::new(&fs, "/work");
    let before = fs.files();

    let request = AddServiceRequest::new("test-dev", "test-app", "test-svc");
    let err = add_service(&fs, &sink, &root, &request, &CompileOptions::default()).unwrap_err();

    assert!(matches!(err, Error::DuplicateService { .. }));
    assert!(err.is_validation());
    assert_eq!(fs.files(), before);
}

#[test]
fn ci_base_keeps_earlier_bindings() {
    let (fs, root) = seeded(&base_manifest(Some(cicd_config())));
    let sink = DirectorySecretSink::new(&fs, "/work");
    let options = CompileOptions::default();

    add_service(&fs, &sink, &root, &request(), &options).unwrap();
    let second = AddServiceRequest::new("test-dev", "test-app", "other")
        .with_git_repo_url("http://github.com/org/other")
        .with_webhook_secret("456");
    add_service(&fs, &sink, &root, &second, &options).unwrap();

    let content = String::from_utf8(fs.read(&root.join("config/cicd/base/kustomization.yaml")).unwrap()).unwrap();
    assert_eq!(
        content,
        "resources:\n- 05-bindings/test-dev-test-app-test-binding.yaml\n- 05-bindings/test-dev-test-app-other-binding.yaml\n"
    );
}

#[test]
fn hand_edited_base_survives_recompile() {
    let (fs, root) = seeded(&base_manifest(None));
    let sink = DirectorySecretSink::new(&fs, "/work");
    let base = root.join("environments/test-dev/apps/test-app/base/kustomization.yaml");
    fs.write(&base, b"bases:\n- ../services/test-svc\n- ../../shared/monitoring\n")
        .unwrap();

    add_service(
        &fs,
        &sink,
        &root,
        &AddServiceRequest::new("test-dev", "test-app", "test"),
        &CompileOptions::default(),
    )
    .unwrap();

    let content = String::from_utf8(fs.read(&base).unwrap()).unwrap();
    assert_eq!(
        content,
        "bases:\n- ../services/test-svc\n- ../../shared/monitoring\n- ../services/test\n"
    );
}

#[test]
fn overlay_patches_in_other_environment_survive() {
    let manifest = Manifest {
        git_ops_url: GITOPS_URL.into(),
        config: None,
        environments: vec![
            Environment {
                name: "dev".into(),
                pipelines: None,
                apps: vec![],
            },
            Environment {
                name: "prod".into(),
                pipelines: None,
                apps: vec![Application {
                    name: "web".into(),
                    services: vec![Service::new("api", None)],
                }],
            },
        ],
    };
    let (fs, root) = seeded(&manifest);
    let sink = DirectorySecretSink::new(&fs, "/work");
    let overlay = root.join("environments/prod/apps/web/overlays/kustomization.yaml");
    let hand_written = "apiVersion: kustomize.config.k8s.io/v1beta1\nkind: Kustomization\nbases:\n- ../base\npatchesStrategicMerge:\n- replicas.yaml\nnamespace: prod\n";
    fs.write(&overlay, hand_written.as_bytes()).unwrap();

    add_service(
        &fs,
        &sink,
        &root,
        &AddServiceRequest::new("dev", "other", "svc"),
        &CompileOptions::default(),
    )
    .unwrap();

    let content = String::from_utf8(fs.read(&overlay).unwrap()).unwrap();
    assert_eq!(
        content,
        "bases:\n- ../base\napiVersion: kustomize.config.k8s.io/v1beta1\nkind: Kustomization\nnamespace: prod\npatchesStrategicMerge:\n- replicas.yaml\n"
    );
}

#[test]
fn unchanged_files_are_not_rewritten() {
    let (fs, root) = seeded(&base_manifest(None));
    let sink = DirectorySecretSink::new(&fs, "/work");
    let options = CompileOptions::default();

    add_service(&fs, &sink, &root, &AddServiceRequest::new("test-dev", "test-app", "test"), &options).unwrap();
    let report = add_service(&fs, &sink, &root, &AddServiceRequest::new("test-dev", "test-app", "other"), &options)
        .unwrap();

    let untouched = root.join("environments/test-dev/apps/test-app/services/test-svc/kustomization.yaml");
    assert_eq!(report.action(&untouched), Some(WriteAction::Unchanged));
    assert_eq!(
        report.action(&root.join("environments/test-dev/apps/test-app/base/kustomization.yaml")),
        Some(WriteAction::Updated)
    );
}

#[test]
fn missing_manifest_reports_unknown_environment() {
    let fs = MemoryFilesystem::new();
    let sink = DirectorySecretSink::new(&fs, "/work");
    let err = add_service(
        &fs,
        &sink,
        &NormalizedPath::new("/work/gitops"),
        &request(),
        &CompileOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnknownEnvironment { .. }));
    assert!(fs.files().is_empty());
}

#[test]
fn add_service_on_disk() {
    let temp = tempfile::TempDir::new().unwrap();
    let fs = gitops_fs::OsFilesystem::new();
    let root = NormalizedPath::new(temp.path()).join("gitops");
    base_manifest(Some(cicd_config()))
        .save(&fs, &root.join("pipelines.yaml"))
        .unwrap();
    let sink = DirectorySecretSink::new(&fs, NormalizedPath::new(temp.path()));

    add_service(&fs, &sink, &root, &request(), &CompileOptions::default()).unwrap();

    let binding = std::fs::read_to_string(
        temp.path()
            .join("gitops/config/cicd/base/05-bindings/test-dev-test-app-test-binding.yaml"),
    )
    .unwrap();
    assert!(binding.contains("name: test-dev-test-app-test-binding"));
    assert!(temp.path().join("secrets/webhook-secret-test-dev-test.yaml").is_file());
    assert!(
        temp.path()
            .join("gitops/environments/test-dev/apps/test-app/services/test/base/config")
            .is_dir()
    );
}
