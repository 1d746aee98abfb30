//! Runtime wiring and lifecycle management.
//!
//! - [`RegistryConfig`] - channel capacity and paging limits, from TOML and environment
//! - [`RegistrySystem`] - starts the store actor, builds the service, shuts everything down
//! - [`setup_tracing`] - installs the tracing subscriber

pub mod config;
pub mod registry_system;
pub mod tracing;

pub use self::config::{ConfigError, RegistryConfig};
pub use self::registry_system::{RegistrySystem, RegistrySystemBuilder};
pub use self::tracing::{setup_tracing, try_setup_tracing};
