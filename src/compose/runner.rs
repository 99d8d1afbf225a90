//! Apply runner
//!
//! Delegates `up` and `down` to an external compose binary. The runner
//! waits for the command itself to exit; it does not poll the services
//! for readiness.

use crate::error::{Result, StackError};
use std::fmt;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;
use tokio::process::Command;

/// Runs an external program to completion.
///
/// Returns the exit code, or `None` if the process was terminated by a
/// signal.
pub trait CommandExecutor {
    fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> impl Future<Output = io::Result<Option<i32>>> + Send;
}

/// Executor that spawns real processes with inherited stdio
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    async fn run(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<Option<i32>> {
        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;
        Ok(status.code())
    }
}

/// Which compose binary to invoke
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ComposeCommand {
    /// `docker-compose`
    #[default]
    Standalone,
    /// `docker compose`
    Plugin,
}

impl ComposeCommand {
    /// Program to execute
    pub fn program(&self) -> &'static str {
        match self {
            ComposeCommand::Standalone => "docker-compose",
            ComposeCommand::Plugin => "docker",
        }
    }

    /// Arguments that precede the compose arguments
    fn prefix_args(&self) -> &'static [&'static str] {
        match self {
            ComposeCommand::Standalone => &[],
            ComposeCommand::Plugin => &["compose"],
        }
    }
}

impl fmt::Display for ComposeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeCommand::Standalone => write!(f, "docker-compose"),
            ComposeCommand::Plugin => write!(f, "docker compose"),
        }
    }
}

impl FromStr for ComposeCommand {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        let words: Vec<&str> = s.split_whitespace().collect();
        match words.as_slice() {
            ["docker-compose"] => Ok(ComposeCommand::Standalone),
            ["docker", "compose"] => Ok(ComposeCommand::Plugin),
            _ => Err(StackError::InvalidConfig(format!(
                "Unknown compose command '{}' (expected 'docker-compose' or 'docker compose')",
                s
            ))),
        }
    }
}

/// Runs compose against a rendered manifest
pub struct ApplyRunner<E = SystemExecutor> {
    executor: E,
    compose: ComposeCommand,
    working_dir: PathBuf,
}

impl ApplyRunner<SystemExecutor> {
    /// Create a runner that spawns real processes
    pub fn new(compose: ComposeCommand, working_dir: PathBuf) -> Self {
        Self::with_executor(SystemExecutor, compose, working_dir)
    }
}

impl<E: CommandExecutor> ApplyRunner<E> {
    /// Create a runner with a custom executor
    pub fn with_executor(executor: E, compose: ComposeCommand, working_dir: PathBuf) -> Self {
        Self {
            executor,
            compose,
            working_dir,
        }
    }

    /// Start every service in the manifest in the background.
    ///
    /// Returns the exit code of the compose command.
    pub async fn up(&self, manifest: &Path) -> Result<i32> {
        tracing::info!("Starting stack from {}", manifest.display());
        self.compose(manifest, &["up", "-d"]).await
    }

    /// Stop and remove the stack's containers, and its named volumes when
    /// `remove_volumes` is set.
    pub async fn down(&self, manifest: &Path, remove_volumes: bool) -> Result<i32> {
        tracing::info!("Stopping stack from {}", manifest.display());
        let args: &[&str] = if remove_volumes {
            &["down", "-v"]
        } else {
            &["down"]
        };
        self.compose(manifest, args).await
    }

    async fn compose(&self, manifest: &Path, action: &[&str]) -> Result<i32> {
        let mut args: Vec<String> = self
            .compose
            .prefix_args()
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.push("-f".to_string());
        args.push(manifest.display().to_string());
        args.extend(action.iter().map(|s| s.to_string()));

        let program = self.compose.program();
        let command_line = format!("{} {}", program, args.join(" "));
        tracing::debug!("Running: {} (in {})", command_line, self.working_dir.display());

        if !self.working_dir.is_dir() {
            return Err(StackError::Execution {
                command: command_line,
                code: None,
                message: format!(
                    "working directory {} does not exist",
                    self.working_dir.display()
                ),
            });
        }

        let code = self
            .executor
            .run(program, &args, &self.working_dir)
            .await
            .map_err(|e| {
                let message = if e.kind() == io::ErrorKind::NotFound {
                    format!("{} is not installed or not on PATH", program)
                } else {
                    e.to_string()
                };
                StackError::Execution {
                    command: command_line.clone(),
                    code: None,
                    message,
                }
            })?;

        match code {
            Some(0) => Ok(0),
            Some(code) => Err(StackError::Execution {
                command: command_line,
                code: Some(code),
                message: "compose reported a failure".to_string(),
            }),
            None => Err(StackError::Execution {
                command: command_line,
                code: None,
                message: "terminated by signal".to_string(),
            }),
        }
    }
}
