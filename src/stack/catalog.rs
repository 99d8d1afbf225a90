//! The open data stack topology

use super::spec::{CommandOverride, ServiceSpec, StackSpec};

/// Postgres superuser
pub const POSTGRES_USER: &str = "admin";
/// Postgres superuser password
pub const POSTGRES_PASSWORD: &str = "adminpassword";
/// Default Postgres database
pub const POSTGRES_DB: &str = "data_science";
/// MinIO root credentials (user and password are the same)
pub const MINIO_ROOT: &str = "minioadmin";

pub const POSTGRES_PORT: u16 = 5432;
pub const MINIO_API_PORT: u16 = 9000;
pub const MINIO_CONSOLE_PORT: u16 = 9001;
pub const METABASE_PORT: u16 = 3000;
pub const SUPERSET_PORT: u16 = 8088;
pub const AIRFLOW_PORT: u16 = 8080;
pub const MELTANO_PORT: u16 = 5000;
pub const SPARK_MASTER_PORT: u16 = 7077;
pub const SPARK_UI_PORT: u16 = 8081;

const AIRFLOW_COMMAND: &str = "bash -c \"airflow db upgrade && airflow users create \
--username admin --password admin --firstname admin --lastname admin --role Admin \
--email admin@example.com && airflow webserver\"";

fn idle_entrypoint() -> CommandOverride {
    CommandOverride::Exec(vec![
        "tail".to_string(),
        "-f".to_string(),
        "/dev/null".to_string(),
    ])
}

/// Build the open data stack: Postgres, MinIO, Metabase, Superset, Airflow,
/// Meltano, dbt, DuckDB and Spark.
///
/// dbt and DuckDB idle on `tail -f /dev/null` and are meant to be used
/// through `docker compose exec`.
pub fn open_data_stack() -> StackSpec {
    let sql_alchemy_conn = format!(
        "postgresql+psycopg2://{}:{}@postgres/{}",
        POSTGRES_USER, POSTGRES_PASSWORD, POSTGRES_DB
    );

    StackSpec::new()
        .service(
            ServiceSpec::new("postgres", "postgres:15")
                .restart("always")
                .env("POSTGRES_USER", POSTGRES_USER)
                .env("POSTGRES_PASSWORD", POSTGRES_PASSWORD)
                .env("POSTGRES_DB", POSTGRES_DB)
                .volume("pgdata:/var/lib/postgresql/data")
                .port(POSTGRES_PORT, 5432),
        )
        .service(
            ServiceSpec::new("minio", "minio/minio:latest")
                .command(CommandOverride::Shell("server /data".to_string()))
                .env("MINIO_ROOT_USER", MINIO_ROOT)
                .env("MINIO_ROOT_PASSWORD", MINIO_ROOT)
                .port(MINIO_API_PORT, 9000)
                .port(MINIO_CONSOLE_PORT, 9001)
                .volume("minio-data:/data"),
        )
        .service(
            ServiceSpec::new("metabase", "metabase/metabase:latest")
                .port(METABASE_PORT, 3000)
                .depends_on("postgres"),
        )
        .service(
            ServiceSpec::new("superset", "apache/superset:latest")
                .env("SUPERSET_SECRET_KEY", "supersetsecret")
                .port(SUPERSET_PORT, 8088)
                .depends_on("postgres"),
        )
        .service(
            ServiceSpec::new("airflow", "apache/airflow:2.8.1")
                .env("AIRFLOW__CORE__EXECUTOR", "LocalExecutor")
                .env("AIRFLOW__CORE__FERNET_KEY", "fernetkey")
                .env("AIRFLOW__CORE__SQL_ALCHEMY_CONN", &sql_alchemy_conn)
                .env("AIRFLOW__WEBSERVER__SECRET_KEY", "airflowsecret")
                .port(AIRFLOW_PORT, 8080)
                .depends_on("postgres")
                .command(CommandOverride::Shell(AIRFLOW_COMMAND.to_string())),
        )
        .service(
            ServiceSpec::new("meltano", "meltano/meltano:latest")
                .command(CommandOverride::Shell("ui".to_string()))
                .port(MELTANO_PORT, 5000),
        )
        .service(
            ServiceSpec::new("dbt", "ghcr.io/dbt-labs/dbt-postgres:1.7.8")
                .entrypoint(idle_entrypoint()),
        )
        .service(ServiceSpec::new("duckdb", "duckdb/duckdb:latest").entrypoint(idle_entrypoint()))
        .service(
            ServiceSpec::new("spark", "bitnami/spark:latest")
                .env("SPARK_MODE", "master")
                .port(SPARK_MASTER_PORT, 7077)
                .port(SPARK_UI_PORT, 8081),
        )
        .named_volume("pgdata")
        .named_volume("minio-data")
}
