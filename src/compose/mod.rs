//! Docker Compose manifest rendering and invocation
//!
//! This module writes a stack out as a compose file and hands it to the
//! compose CLI.

pub mod config;
pub mod render;
pub mod runner;

pub use config::{ComposeConfig, ServiceConfig};
pub use render::ManifestRenderer;
pub use runner::{ApplyRunner, CommandExecutor, ComposeCommand, SystemExecutor};
