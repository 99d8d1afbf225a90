use odstack::compose::{ApplyRunner, CommandExecutor, ComposeCommand, ManifestRenderer};
use odstack::config::Settings;
use odstack::deploy::{DeployPhase, Deployment};
use odstack::report::OUTPUT_KEYS;
use odstack::stack::{open_data_stack, ServiceSpec, StackSpec};
use odstack::StackError;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

/// Pretends to be compose: resolves `-f` against its working directory,
/// reads the manifest, then exits with a fixed code
#[derive(Clone)]
struct FakeCompose {
    code: i32,
    seen: Arc<Mutex<Vec<String>>>,
}

impl FakeCompose {
    fn new(code: i32) -> Self {
        Self {
            code,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl CommandExecutor for FakeCompose {
    async fn run(&self, _program: &str, args: &[String], cwd: &Path) -> io::Result<Option<i32>> {
        let file = args
            .iter()
            .position(|a| a == "-f")
            .and_then(|i| args.get(i + 1))
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "missing -f"))?;
        let manifest = cwd.join(file);
        let content = std::fs::read_to_string(manifest)?;
        self.seen.lock().unwrap().push(content);
        Ok(Some(self.code))
    }
}

fn runner(fake: FakeCompose, compose: ComposeCommand, dir: &Path) -> ApplyRunner<FakeCompose> {
    ApplyRunner::with_executor(fake, compose, dir.to_path_buf())
}

#[tokio::test]
async fn test_up_writes_manifest_and_reports_endpoints() {
    let temp = tempdir().unwrap();
    let manifest = temp.path().join("docker-compose.yaml");
    let stack = open_data_stack();
    let fake = FakeCompose::new(0);
    let runner = runner(fake.clone(), ComposeCommand::Plugin, temp.path());

    let outputs = Deployment::new(&stack, &runner, &manifest).run().await.unwrap();

    let keys: Vec<&str> = outputs.entries().iter().map(|o| o.key).collect();
    assert_eq!(keys, OUTPUT_KEYS.to_vec());
    assert!(outputs.entries().iter().all(|o| !o.value.is_empty()));

    let seen = fake.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], ManifestRenderer::render(&stack).unwrap());
}

#[tokio::test]
async fn test_relative_project_dir_reaches_compose() {
    let temp = tempfile::Builder::new()
        .prefix("odstack-project")
        .tempdir_in(".")
        .unwrap();
    let relative = PathBuf::from(".").join(temp.path().file_name().unwrap());
    assert!(relative.is_relative());

    let settings = Settings::new(&relative);
    let project_dir = settings.project_dir().unwrap();
    let manifest = settings.manifest_path().unwrap();
    let stack = open_data_stack();
    let fake = FakeCompose::new(0);
    let runner = runner(fake.clone(), ComposeCommand::Standalone, &project_dir);

    Deployment::new(&stack, &runner, &manifest).run().await.unwrap();

    assert!(relative.join("docker-compose.yaml").exists());
    let seen = fake.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], ManifestRenderer::render(&stack).unwrap());
}

#[tokio::test]
async fn test_failed_apply_stops_after_render() {
    let temp = tempdir().unwrap();
    let manifest = temp.path().join("docker-compose.yaml");
    let stack = open_data_stack();
    let runner = runner(FakeCompose::new(3), ComposeCommand::Standalone, temp.path());

    let mut deployment = Deployment::new(&stack, &runner, &manifest);
    let err = deployment.run().await.unwrap_err();

    assert_eq!(err.exit_code(), 3);
    assert_eq!(deployment.phase(), DeployPhase::Rendered);
}

#[tokio::test]
async fn test_invalid_stack_never_reaches_compose() {
    let temp = tempdir().unwrap();
    let manifest = temp.path().join("docker-compose.yaml");
    let metabase = ServiceSpec::new("metabase", "metabase/metabase:latest").depends_on("postgres");
    let stack = StackSpec::new().service(metabase);
    let fake = FakeCompose::new(0);
    let runner = runner(fake.clone(), ComposeCommand::Standalone, temp.path());

    let result = Deployment::new(&stack, &runner, &manifest).run().await;

    assert!(matches!(result, Err(StackError::InvalidStack(_))));
    assert!(fake.seen.lock().unwrap().is_empty());
    assert!(!manifest.exists());
}

#[test]
fn test_rendered_manifest_matches_stack() {
    let stack = open_data_stack();
    let yaml = ManifestRenderer::render(&stack).unwrap();
    let config = ManifestRenderer::parse(&yaml).unwrap();

    let names: Vec<&str> = config.services.names().collect();
    assert_eq!(
        names,
        vec![
            "postgres", "minio", "metabase", "superset", "airflow", "meltano", "dbt", "duckdb",
            "spark"
        ]
    );

    let postgres = config.services.get("postgres").unwrap();
    assert_eq!(postgres.ports, vec!["5432:5432"]);
    assert_eq!(postgres.restart.as_deref(), Some("always"));
    assert_eq!(postgres.volumes, vec!["pgdata:/var/lib/postgresql/data"]);
    assert_eq!(postgres.environment["POSTGRES_DB"], "data_science");

    let spark = config.services.get("spark").unwrap();
    assert_eq!(spark.ports, vec!["7077:7077", "8081:8081"]);
}

#[test]
fn test_rendered_file_round_trips() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("stack").join("compose.yaml");
    let stack = open_data_stack();

    ManifestRenderer::write(&stack, &path).unwrap();
    let config = ManifestRenderer::parse_file(&path).unwrap();
    assert_eq!(config, ManifestRenderer::to_compose(&stack).unwrap());
}
