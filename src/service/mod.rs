//! # Service Layer
//!
//! [`ResourceService`] is the single entry point for callers. It owns no
//! state of its own beyond its collaborators: the store, the validator and
//! extractor registries, and the lifecycle notifier.

pub mod resource_service;

pub use resource_service::{Clock, IdGenerator, ResourceService, DEFAULT_MAX_PAGE_SIZE};
