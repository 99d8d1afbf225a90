//! Stack topology types
//!
//! A [`StackSpec`] is the full static description of the services that make
//! up a deployment. It is built once at startup, validated, and handed to
//! the renderer by reference.

use crate::error::{Result, StackError};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

/// Default compose file format version
pub const DEFAULT_COMPOSE_VERSION: &str = "3.8";

/// Host to container port mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMapping {
    /// Port published on the host
    pub host: u16,
    /// Port inside the container
    pub container: u16,
}

impl PortMapping {
    /// Publish a container port on the same host port
    pub fn same(port: u16) -> Self {
        Self {
            host: port,
            container: port,
        }
    }
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.container)
    }
}

/// Command or entrypoint override
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOverride {
    /// Shell form, passed as a single string
    Shell(String),
    /// Exec form, one element per argument
    Exec(Vec<String>),
}

/// One service in the stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    /// Service name, also the compose block key
    pub name: String,
    /// Image reference
    pub image: String,
    /// Published ports, in declaration order
    pub ports: Vec<PortMapping>,
    /// Environment variables
    pub environment: BTreeMap<String, String>,
    /// Volume mounts (`source:target[:mode]`), in declaration order
    pub volumes: Vec<String>,
    /// Services that must be started first
    pub depends_on: BTreeSet<String>,
    /// Command override
    pub command: Option<CommandOverride>,
    /// Entrypoint override
    pub entrypoint: Option<CommandOverride>,
    /// Restart policy
    pub restart: Option<String>,
}

impl ServiceSpec {
    /// Create a service with only an image
    pub fn new(name: &str, image: &str) -> Self {
        Self {
            name: name.to_string(),
            image: image.to_string(),
            ports: Vec::new(),
            environment: BTreeMap::new(),
            volumes: Vec::new(),
            depends_on: BTreeSet::new(),
            command: None,
            entrypoint: None,
            restart: None,
        }
    }

    /// Publish a port
    pub fn port(mut self, host: u16, container: u16) -> Self {
        self.ports.push(PortMapping { host, container });
        self
    }

    /// Set an environment variable
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.environment.insert(key.to_string(), value.to_string());
        self
    }

    /// Add a volume mount
    pub fn volume(mut self, mount: &str) -> Self {
        self.volumes.push(mount.to_string());
        self
    }

    /// Add a dependency
    pub fn depends_on(mut self, service: &str) -> Self {
        self.depends_on.insert(service.to_string());
        self
    }

    /// Override the command
    pub fn command(mut self, command: CommandOverride) -> Self {
        self.command = Some(command);
        self
    }

    /// Override the entrypoint
    pub fn entrypoint(mut self, entrypoint: CommandOverride) -> Self {
        self.entrypoint = Some(entrypoint);
        self
    }

    /// Set the restart policy
    pub fn restart(mut self, policy: &str) -> Self {
        self.restart = Some(policy.to_string());
        self
    }

    /// Named volumes referenced by this service's mounts.
    ///
    /// Bind mounts (absolute, relative or home paths) and anonymous
    /// volumes are skipped.
    pub fn named_volumes(&self) -> impl Iterator<Item = &str> {
        self.volumes.iter().filter_map(|mount| {
            let (source, _) = mount.split_once(':')?;
            let is_path = source.starts_with('/')
                || source.starts_with('.')
                || source.starts_with('~')
                || source.contains('/');
            (!is_path && !source.is_empty()).then_some(source)
        })
    }
}

/// The whole deployment topology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSpec {
    /// Compose file format version
    pub version: String,
    /// Services, in declaration order
    pub services: Vec<ServiceSpec>,
    /// Named volumes, in declaration order
    pub volumes: Vec<String>,
}

impl Default for StackSpec {
    fn default() -> Self {
        Self {
            version: DEFAULT_COMPOSE_VERSION.to_string(),
            services: Vec::new(),
            volumes: Vec::new(),
        }
    }
}

impl StackSpec {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a service
    pub fn service(mut self, service: ServiceSpec) -> Self {
        self.services.push(service);
        self
    }

    /// Declare a named volume
    pub fn named_volume(mut self, name: &str) -> Self {
        self.volumes.push(name.to_string());
        self
    }

    /// Look up a service by name
    pub fn get(&self, name: &str) -> Option<&ServiceSpec> {
        self.services.iter().find(|s| s.name == name)
    }

    /// Check the stack before rendering
    pub fn validate(&self) -> Result<()> {
        let name_re = Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.-]*$")
            .map_err(|e| StackError::Internal(e.to_string()))?;

        let mut names = HashSet::new();
        for service in &self.services {
            if !name_re.is_match(&service.name) {
                return Err(StackError::InvalidStack(format!(
                    "Invalid service name '{}'",
                    service.name
                )));
            }
            if !names.insert(service.name.as_str()) {
                return Err(StackError::InvalidStack(format!(
                    "Duplicate service '{}'",
                    service.name
                )));
            }
            if service.image.trim().is_empty() {
                return Err(StackError::InvalidStack(format!(
                    "Service '{}' must have an image",
                    service.name
                )));
            }
        }

        let mut declared = HashSet::new();
        for volume in &self.volumes {
            if !declared.insert(volume.as_str()) {
                return Err(StackError::InvalidStack(format!(
                    "Duplicate volume '{}'",
                    volume
                )));
            }
        }

        let mut published: HashMap<u16, &str> = HashMap::new();

        for service in &self.services {
            for dep in &service.depends_on {
                if dep == &service.name {
                    return Err(StackError::InvalidStack(format!(
                        "Service '{}' depends on itself",
                        service.name
                    )));
                }
                if !names.contains(dep.as_str()) {
                    return Err(StackError::InvalidStack(format!(
                        "Service '{}' depends on unknown service '{}'",
                        service.name, dep
                    )));
                }
            }

            for volume in service.named_volumes() {
                if !declared.contains(volume) {
                    return Err(StackError::InvalidStack(format!(
                        "Service '{}' mounts undeclared volume '{}'",
                        service.name, volume
                    )));
                }
            }

            for port in &service.ports {
                if let Some(owner) = published.insert(port.host, &service.name) {
                    return Err(StackError::InvalidStack(format!(
                        "Host port {} is published by both '{}' and '{}'",
                        port.host, owner, service.name
                    )));
                }
            }
        }

        Ok(())
    }
}
