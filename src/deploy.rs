//! Render, apply, report
//!
//! A deployment moves through `Idle -> Rendered -> Applied -> Reported`.
//! The first failure stops the sequence where it is; nothing is rolled
//! back.

use crate::compose::render::ManifestRenderer;
use crate::compose::runner::{ApplyRunner, CommandExecutor};
use crate::error::Result;
use crate::report::Outputs;
use crate::stack::StackSpec;
use std::path::{Path, PathBuf};

/// Deployment phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployPhase {
    /// Nothing done yet
    Idle,
    /// Manifest written
    Rendered,
    /// Compose exited successfully
    Applied,
    /// Outputs produced
    Reported,
}

/// One run of the stack
pub struct Deployment<'a, E: CommandExecutor> {
    stack: &'a StackSpec,
    runner: &'a ApplyRunner<E>,
    manifest: PathBuf,
    phase: DeployPhase,
}

impl<'a, E: CommandExecutor> Deployment<'a, E> {
    /// Prepare a deployment writing its manifest to `manifest`
    pub fn new(stack: &'a StackSpec, runner: &'a ApplyRunner<E>, manifest: &Path) -> Self {
        Self {
            stack,
            runner,
            manifest: manifest.to_path_buf(),
            phase: DeployPhase::Idle,
        }
    }

    /// Current phase
    pub fn phase(&self) -> DeployPhase {
        self.phase
    }

    /// Run every step. Outputs are only returned once the stack is applied.
    pub async fn run(&mut self) -> Result<Outputs> {
        ManifestRenderer::write(self.stack, &self.manifest)?;
        self.advance(DeployPhase::Rendered);

        self.runner.up(&self.manifest).await?;
        self.advance(DeployPhase::Applied);

        let outputs = Outputs::for_stack();
        self.advance(DeployPhase::Reported);

        Ok(outputs)
    }

    fn advance(&mut self, phase: DeployPhase) {
        tracing::debug!("Deployment {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::runner::ComposeCommand;
    use crate::error::StackError;
    use crate::stack::{open_data_stack, ServiceSpec};
    use std::io;
    use tempfile::tempdir;

    struct ExitWith(i32);

    fn runner(code: i32, dir: &Path) -> ApplyRunner<ExitWith> {
        ApplyRunner::with_executor(ExitWith(code), ComposeCommand::Standalone, dir.to_path_buf())
    }

    impl CommandExecutor for ExitWith {
        async fn run(
            &self,
            _program: &str,
            _args: &[String],
            _cwd: &Path,
        ) -> io::Result<Option<i32>> {
            Ok(Some(self.0))
        }
    }

    #[tokio::test]
    async fn test_full_run_reports() {
        let temp = tempdir().unwrap();
        let manifest = temp.path().join("docker-compose.yaml");
        let stack = open_data_stack();
        let runner = runner(0, temp.path());

        let mut deployment = Deployment::new(&stack, &runner, &manifest);
        assert_eq!(deployment.phase(), DeployPhase::Idle);

        let outputs = deployment.run().await.unwrap();
        assert_eq!(deployment.phase(), DeployPhase::Reported);
        assert_eq!(outputs.len(), 7);
        assert!(manifest.exists());
    }

    #[tokio::test]
    async fn test_failed_apply_stops_after_render() {
        let temp = tempdir().unwrap();
        let manifest = temp.path().join("docker-compose.yaml");
        let stack = open_data_stack();
        let runner = runner(1, temp.path());

        let mut deployment = Deployment::new(&stack, &runner, &manifest);
        let err = deployment.run().await.unwrap_err();

        assert_eq!(err.exit_code(), 1);
        assert!(matches!(err, StackError::Execution { .. }));
        assert_eq!(deployment.phase(), DeployPhase::Rendered);
    }

    #[tokio::test]
    async fn test_failed_render_stays_idle() {
        let temp = tempdir().unwrap();
        let manifest = temp.path().join("docker-compose.yaml");
        let superset = ServiceSpec::new("superset", "apache/superset").depends_on("postgres");
        let stack = StackSpec::new().service(superset);
        let runner = runner(0, temp.path());

        let mut deployment = Deployment::new(&stack, &runner, &manifest);
        assert!(deployment.run().await.is_err());
        assert_eq!(deployment.phase(), DeployPhase::Idle);
        assert!(!manifest.exists());
    }
}
