//! Docker Compose manifest types
//!
//! Only the subset of the compose schema the stack renders is modelled.
//! Services keep their declaration order; everything keyed by name is a
//! sorted map so serialization is stable.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Docker Compose file configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeConfig {
    /// Compose file version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Services
    #[serde(default)]
    pub services: Services,
    /// Named volumes. Rendered as bare declarations; driver options in a
    /// parsed manifest are kept as-is.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub volumes: BTreeMap<String, Option<serde_yaml::Value>>,
}

/// Services in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Services(pub Vec<(String, ServiceConfig)>);

impl Services {
    /// Look up a service by name
    pub fn get(&self, name: &str) -> Option<&ServiceConfig> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Number of services
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no services
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Service names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }
}

impl Serialize for Services {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, service) in &self.0 {
            map.serialize_entry(name, service)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Services {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ServicesVisitor;

        impl<'de> Visitor<'de> for ServicesVisitor {
            type Value = Services;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of service names to service definitions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Services, A::Error> {
                let mut services = Vec::new();
                while let Some((name, service)) = access.next_entry::<String, ServiceConfig>()? {
                    services.push((name, service));
                }
                Ok(Services(services))
            }
        }

        deserializer.deserialize_map(ServicesVisitor)
    }
}

/// Service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Image name
    pub image: String,
    /// Restart policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart: Option<String>,
    /// Command to run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<CommandConfig>,
    /// Entrypoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<CommandConfig>,
    /// Environment variables
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    /// Volume mounts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    /// Port mappings, short syntax ("8080:80")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    /// Service dependencies
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

/// Command configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandConfig {
    /// Shell command string
    Shell(String),
    /// Exec form array
    Exec(Vec<String>),
}
