//! odstack - render and launch an open data stack
//!
//! odstack describes a fixed set of data services (Postgres, MinIO,
//! Metabase, Superset, Airflow, Meltano, dbt, DuckDB and Spark), writes
//! them out as a Docker Compose manifest and hands that manifest to the
//! compose CLI:
//!
//! - Stack topology with validation before anything is written
//! - Deterministic compose manifest rendering
//! - `docker-compose` / `docker compose` invocation with exit code capture
//! - Connection string outputs for every exposed service

pub mod compose;
pub mod config;
pub mod deploy;
pub mod error;
pub mod report;
pub mod stack;

pub use error::{Result, StackError};
