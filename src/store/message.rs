//! # Store Messages
//!
//! Requests sent from a [`StoreClient`](super::StoreClient) to the
//! [`StoreActor`](super::StoreActor). Each carries a one-shot channel the
//! actor answers on.

use super::{ResourceQuery, StoreError};
use crate::model::{Resource, ResourceType};
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the store actor.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// One operation on the store, with the channel to answer on.
///
/// Variants map one-to-one onto [`ResourceStore`](super::ResourceStore)
/// methods.
#[derive(Debug)]
pub enum StoreRequest {
    GetResource {
        resource_type: String,
        id: String,
        respond_to: Response<Option<Resource>>,
    },
    FindResource {
        id: String,
        respond_to: Response<Option<Resource>>,
    },
    ListResources {
        query: ResourceQuery,
        respond_to: Response<Vec<Resource>>,
    },
    AddResource {
        resource: Resource,
        respond_to: Response<()>,
    },
    UpdateResource {
        resource: Resource,
        respond_to: Response<()>,
    },
    DeleteResource {
        id: String,
        respond_to: Response<()>,
    },
    GetResourceType {
        name: String,
        respond_to: Response<Option<ResourceType>>,
    },
    ListResourceTypes {
        respond_to: Response<Vec<ResourceType>>,
    },
    AddResourceType {
        resource_type: ResourceType,
        respond_to: Response<()>,
    },
}

impl StoreRequest {
    /// Operation name used in log fields.
    pub fn operation(&self) -> &'static str {
        match self {
            StoreRequest::GetResource { .. } => "get_resource",
            StoreRequest::FindResource { .. } => "find_resource",
            StoreRequest::ListResources { .. } => "list_resources",
            StoreRequest::AddResource { .. } => "add_resource",
            StoreRequest::UpdateResource { .. } => "update_resource",
            StoreRequest::DeleteResource { .. } => "delete_resource",
            StoreRequest::GetResourceType { .. } => "get_resource_type",
            StoreRequest::ListResourceTypes { .. } => "list_resource_types",
            StoreRequest::AddResourceType { .. } => "add_resource_type",
        }
    }
}
