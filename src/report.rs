//! Endpoint outputs
//!
//! After a successful apply the stack exports one connection string per
//! user-facing service. Values are built from the same constants the
//! topology uses; nothing checks that the endpoints actually answer.

use crate::error::{Result, StackError};
use crate::stack::catalog::{
    AIRFLOW_PORT, MELTANO_PORT, METABASE_PORT, MINIO_API_PORT, POSTGRES_DB, POSTGRES_PASSWORD,
    POSTGRES_PORT, POSTGRES_USER, SPARK_UI_PORT, SUPERSET_PORT,
};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt::Write as _;
use std::str::FromStr;

/// Host the endpoints are published on
pub const ENDPOINT_HOST: &str = "localhost";

/// Placeholder printed instead of a secret value
pub const MASKED: &str = "[secret]";

/// Exported output keys, in report order
pub const OUTPUT_KEYS: [&str; 7] = [
    "postgres_url",
    "minio_url",
    "metabase_url",
    "superset_url",
    "airflow_url",
    "meltano_url",
    "spark_master_url",
];

/// Report format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `key = value` lines
    #[default]
    Text,
    /// A single JSON object
    Json,
}

impl FromStr for OutputFormat {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(StackError::InvalidConfig(format!(
                "Unknown output format '{}' (expected 'text' or 'json')",
                s
            ))),
        }
    }
}

/// One exported value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub key: &'static str,
    pub value: String,
    /// Whether the value should be masked by default
    pub secret: bool,
}

/// The full set of exported values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outputs {
    entries: Vec<Output>,
}

impl Outputs {
    /// Endpoints of the open data stack
    pub fn for_stack() -> Self {
        let http = |port: u16| format!("http://{}:{}", ENDPOINT_HOST, port);
        let values = [
            format!(
                "postgresql://{}:{}@{}:{}/{}",
                POSTGRES_USER, POSTGRES_PASSWORD, ENDPOINT_HOST, POSTGRES_PORT, POSTGRES_DB
            ),
            http(MINIO_API_PORT),
            http(METABASE_PORT),
            http(SUPERSET_PORT),
            http(AIRFLOW_PORT),
            http(MELTANO_PORT),
            http(SPARK_UI_PORT),
        ];

        let entries = OUTPUT_KEYS
            .iter()
            .zip(values)
            .map(|(key, value)| Output {
                key: *key,
                value,
                secret: true,
            })
            .collect();

        Self { entries }
    }

    /// All entries, in report order
    pub fn entries(&self) -> &[Output] {
        &self.entries
    }

    /// Look up a value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|o| o.key == key)
            .map(|o| o.value.as_str())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the outputs, masking secrets unless `show_secrets` is set
    pub fn render(&self, format: OutputFormat, show_secrets: bool) -> Result<String> {
        let view = OutputsView {
            outputs: self,
            show_secrets,
        };

        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&view)?),
            OutputFormat::Text => {
                let width = self.entries.iter().map(|o| o.key.len()).max().unwrap_or(0);
                let mut out = String::new();
                for output in &self.entries {
                    let _ = writeln!(
                        out,
                        "{:<width$} = {}",
                        output.key,
                        view.value(output),
                        width = width
                    );
                }
                Ok(out)
            }
        }
    }
}

struct OutputsView<'a> {
    outputs: &'a Outputs,
    show_secrets: bool,
}

impl OutputsView<'_> {
    fn value<'o>(&self, output: &'o Output) -> &'o str {
        if output.secret && !self.show_secrets {
            MASKED
        } else {
            &output.value
        }
    }
}

impl Serialize for OutputsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.outputs.len()))?;
        for output in self.outputs.entries() {
            map.serialize_entry(output.key, self.value(output))?;
        }
        map.end()
    }
}
