//! Runtime settings

use crate::compose::render::DEFAULT_MANIFEST_FILE;
use crate::compose::runner::ComposeCommand;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Where the manifest goes and how compose is invoked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory compose runs in; relative manifest paths resolve against it
    pub project_dir: PathBuf,
    /// Manifest path
    pub manifest: PathBuf,
    /// Compose binary
    pub compose: ComposeCommand,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            manifest: PathBuf::from(DEFAULT_MANIFEST_FILE),
            compose: ComposeCommand::default(),
        }
    }
}

impl Settings {
    /// Create settings rooted at `project_dir`
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            ..Self::default()
        }
    }

    /// Set the manifest path
    pub fn manifest(mut self, manifest: impl Into<PathBuf>) -> Self {
        self.manifest = manifest.into();
        self
    }

    /// Set the compose binary
    pub fn compose(mut self, compose: ComposeCommand) -> Self {
        self.compose = compose;
        self
    }

    /// Absolute project directory.
    ///
    /// Compose runs in this directory and resolves `-f` against it, so the
    /// runner must never see a relative path here.
    pub fn project_dir(&self) -> Result<PathBuf> {
        Ok(resolve(&std::env::current_dir()?, &self.project_dir))
    }

    /// Absolute manifest path, resolved against the project directory
    pub fn manifest_path(&self) -> Result<PathBuf> {
        Ok(resolve(&self.project_dir()?, &self.manifest))
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(settings.manifest_path().unwrap(), cwd.join("./docker-compose.yaml"));
        assert_eq!(settings.compose, ComposeCommand::Standalone);
    }

    #[test]
    fn test_manifest_resolution() {
        let settings = Settings::new("/srv/stack").manifest("deploy/compose.yaml");
        assert_eq!(
            settings.manifest_path().unwrap(),
            PathBuf::from("/srv/stack/deploy/compose.yaml")
        );

        let settings = Settings::new("/srv/stack").manifest("/tmp/compose.yaml");
        assert_eq!(settings.manifest_path().unwrap(), PathBuf::from("/tmp/compose.yaml"));
    }

    #[test]
    fn test_relative_project_dir_is_made_absolute() {
        let settings = Settings::new("target/stack");
        let cwd = std::env::current_dir().unwrap();

        let project_dir = settings.project_dir().unwrap();
        assert!(project_dir.is_absolute());
        assert_eq!(project_dir, cwd.join("target/stack"));
        assert_eq!(
            settings.manifest_path().unwrap(),
            cwd.join("target/stack/docker-compose.yaml")
        );
    }
}
