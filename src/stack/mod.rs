//! Stack topology
//!
//! This module describes which services a deployment is made of, and
//! provides the built-in open data stack.

pub mod catalog;
pub mod spec;

pub use catalog::open_data_stack;
pub use spec::{CommandOverride, PortMapping, ServiceSpec, StackSpec};
