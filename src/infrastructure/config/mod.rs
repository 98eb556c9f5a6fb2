//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment: defaults, YAML files, then
//! environment variable overrides, followed by a validation pass.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
