//! # Store Client
//!
//! The cloneable handle that implements [`ResourceStore`] by sending
//! [`StoreRequest`]s to a [`StoreActor`](super::StoreActor).

use super::message::StoreRequest;
use super::{ResourceQuery, ResourceStore, StoreError};
use crate::model::{Resource, ResourceType};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// A type-safe client for interacting with a store actor.
///
/// Holds only a sender, so cloning is cheap. Each call sends one request and
/// awaits its one-shot response.
#[derive(Clone, Debug)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, StoreError>>) -> StoreRequest,
    ) -> Result<T, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }
}

#[async_trait]
impl ResourceStore for StoreClient {
    async fn get_resource(&self, resource_type: &str, id: &str) -> Result<Option<Resource>, StoreError> {
        self.request(|respond_to| StoreRequest::GetResource {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
            respond_to,
        })
        .await
    }

    async fn find_resource(&self, id: &str) -> Result<Option<Resource>, StoreError> {
        self.request(|respond_to| StoreRequest::FindResource {
            id: id.to_string(),
            respond_to,
        })
        .await
    }

    async fn list_resources(&self, query: ResourceQuery) -> Result<Vec<Resource>, StoreError> {
        self.request(|respond_to| StoreRequest::ListResources { query, respond_to })
            .await
    }

    async fn add_resource(&self, resource: Resource) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::AddResource { resource, respond_to })
            .await
    }

    async fn update_resource(&self, resource: Resource) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::UpdateResource { resource, respond_to })
            .await
    }

    async fn delete_resource(&self, id: &str) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::DeleteResource {
            id: id.to_string(),
            respond_to,
        })
        .await
    }

    async fn get_resource_type(&self, name: &str) -> Result<Option<ResourceType>, StoreError> {
        self.request(|respond_to| StoreRequest::GetResourceType {
            name: name.to_string(),
            respond_to,
        })
        .await
    }

    async fn list_resource_types(&self) -> Result<Vec<ResourceType>, StoreError> {
        self.request(|respond_to| StoreRequest::ListResourceTypes { respond_to })
            .await
    }

    async fn add_resource_type(&self, resource_type: ResourceType) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::AddResourceType {
            resource_type,
            respond_to,
        })
        .await
    }
}
