//! # Resource Store
//!
//! Durable CRUD for [`Resource`] and [`ResourceType`] entities is a
//! collaborator of the registry, described by the [`ResourceStore`] trait.
//!
//! The crate ships one implementation: an in-memory store run as an actor
//! ([`StoreActor`]) that owns all state and processes requests one at a time,
//! reached through a cloneable [`StoreClient`]. Because the actor handles a
//! single request at a time, each store operation is atomic with respect to
//! readers.
//!
//! # Testing
//!
//! See [`mock`] for a store client driven by scripted expectations, used to
//! inject storage failures.

pub mod actor;
pub mod client;
pub mod message;
pub mod mock;

pub use actor::StoreActor;
pub use client::StoreClient;
pub use message::{Response, StoreRequest};

use crate::model::{Resource, ResourceType};
use async_trait::async_trait;
use std::ops::Range;

/// Errors raised by a [`ResourceStore`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Store closed")]
    StoreClosed,
    #[error("Store dropped response channel")]
    StoreDropped,
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} already exists")]
    Duplicate(String),
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Selects a slice of stored resources, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceQuery {
    /// Restrict to one resource type; `None` means every type.
    pub resource_type: Option<String>,
    /// Half-open index range over the matching resources; `None` means all.
    pub range: Option<Range<usize>>,
}

impl ResourceQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn of_type(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: Some(resource_type.into()),
            range: None,
        }
    }

    pub fn page(mut self, from: usize, to: usize) -> Self {
        self.range = Some(from..to);
        self
    }
}

/// Durable storage for resources and resource types.
///
/// Every call is one atomic unit: implementations apply a mutation entirely
/// or not at all.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch a resource by type and id.
    async fn get_resource(&self, resource_type: &str, id: &str) -> Result<Option<Resource>, StoreError>;

    /// Fetch a resource by id alone.
    async fn find_resource(&self, id: &str) -> Result<Option<Resource>, StoreError>;

    async fn list_resources(&self, query: ResourceQuery) -> Result<Vec<Resource>, StoreError>;

    /// Insert a new resource. Fails with [`StoreError::Duplicate`] if the id exists.
    async fn add_resource(&self, resource: Resource) -> Result<(), StoreError>;

    /// Replace an existing resource. Fails with [`StoreError::NotFound`] if absent.
    async fn update_resource(&self, resource: Resource) -> Result<(), StoreError>;

    async fn delete_resource(&self, id: &str) -> Result<(), StoreError>;

    async fn get_resource_type(&self, name: &str) -> Result<Option<ResourceType>, StoreError>;

    async fn list_resource_types(&self) -> Result<Vec<ResourceType>, StoreError>;

    async fn add_resource_type(&self, resource_type: ResourceType) -> Result<(), StoreError>;
}
