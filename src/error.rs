//! Error types for odstack

use thiserror::Error;

/// Result type for odstack operations
pub type Result<T> = std::result::Result<T, StackError>;

/// odstack error types
#[derive(Error, Debug)]
pub enum StackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command `{command}` failed{}: {message}", exit_suffix(.code))]
    Execution {
        command: String,
        code: Option<i32>,
        message: String,
    },

    #[error("Invalid stack: {0}")]
    InvalidStack(String),

    #[error("YAML error: {0}")]
    Yaml(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StackError {
    /// Process exit code to surface for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            StackError::Execution { code: Some(code), .. } if *code != 0 => *code,
            _ => 1,
        }
    }
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {}", code),
        None => String::new(),
    }
}

impl From<serde_yaml::Error> for StackError {
    fn from(e: serde_yaml::Error) -> Self {
        StackError::Yaml(e.to_string())
    }
}
