//! Manifest rendering
//!
//! Turns a [`StackSpec`] into a compose document and writes it to disk.

use super::config::{CommandConfig, ComposeConfig, ServiceConfig, Services};
use crate::error::{Result, StackError};
use crate::stack::{CommandOverride, ServiceSpec, StackSpec};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default manifest file name
pub const DEFAULT_MANIFEST_FILE: &str = "docker-compose.yaml";

/// Stack to compose manifest renderer
pub struct ManifestRenderer;

impl ManifestRenderer {
    /// Validate a stack and convert it to a compose document
    pub fn to_compose(stack: &StackSpec) -> Result<ComposeConfig> {
        stack.validate()?;

        let services = stack
            .services
            .iter()
            .map(|service| (service.name.clone(), Self::service_config(service)))
            .collect();

        let volumes = stack
            .volumes
            .iter()
            .map(|name| (name.clone(), None))
            .collect::<BTreeMap<_, _>>();

        Ok(ComposeConfig {
            version: Some(stack.version.clone()),
            services: Services(services),
            volumes,
        })
    }

    /// Render a stack to manifest text
    pub fn render(stack: &StackSpec) -> Result<String> {
        let config = Self::to_compose(stack)?;
        Ok(serde_yaml::to_string(&config)?)
    }

    /// Render a stack and write it to `path`, replacing any existing file
    pub fn write(stack: &StackSpec, path: &Path) -> Result<PathBuf> {
        let content = Self::render(stack)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        if path.exists() {
            tracing::warn!("Overwriting existing manifest {}", path.display());
        }

        std::fs::write(path, content)?;
        tracing::info!(
            "Wrote manifest with {} services to {}",
            stack.services.len(),
            path.display()
        );

        Ok(path.to_path_buf())
    }

    /// Parse manifest text
    pub fn parse(content: &str) -> Result<ComposeConfig> {
        serde_yaml::from_str(content)
            .map_err(|e| StackError::Yaml(format!("Failed to parse manifest: {}", e)))
    }

    /// Read and parse a manifest file
    pub fn parse_file(path: &Path) -> Result<ComposeConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    fn service_config(service: &ServiceSpec) -> ServiceConfig {
        ServiceConfig {
            image: service.image.clone(),
            restart: service.restart.clone(),
            command: service.command.as_ref().map(command_config),
            entrypoint: service.entrypoint.as_ref().map(command_config),
            environment: service.environment.clone(),
            volumes: service.volumes.clone(),
            ports: service.ports.iter().map(|p| p.to_string()).collect(),
            depends_on: service.depends_on.iter().cloned().collect(),
        }
    }
}

fn command_config(command: &CommandOverride) -> CommandConfig {
    match command {
        CommandOverride::Shell(s) => CommandConfig::Shell(s.clone()),
        CommandOverride::Exec(args) => CommandConfig::Exec(args.clone()),
    }
}
