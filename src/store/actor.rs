//! # Store Actor
//!
//! The in-memory [`ResourceStore`](super::ResourceStore) backend. The actor
//! owns both maps and the receiving end of the channel; it processes requests
//! sequentially, so no locks guard its state.

use super::client::StoreClient;
use super::message::StoreRequest;
use super::{ResourceQuery, StoreError};
use crate::model::{Resource, ResourceType};
use indexmap::IndexMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// In-memory store for resources and resource types.
///
/// Maps keep insertion order, which is the order pagination walks.
///
/// # Usage Pattern
///
/// 1. **Create**: `StoreActor::new()` returns the actor and its client.
/// 2. **Run**: spawn `actor.run()` on the runtime.
/// 3. **Use**: clone the client freely; dropping every clone stops the actor.
///
/// ```rust
/// use resource_registry::store::{ResourceStore, StoreActor};
/// use resource_registry::model::ResourceType;
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = StoreActor::new(8);
///     tokio::spawn(actor.run());
///
///     client.add_resource_type(ResourceType::new("doc", "json", "")).await.unwrap();
///     assert!(client.get_resource_type("doc").await.unwrap().is_some());
/// }
/// ```
pub struct StoreActor {
    receiver: mpsc::Receiver<StoreRequest>,
    resources: IndexMap<String, Resource>,
    resource_types: IndexMap<String, ResourceType>,
}

impl StoreActor {
    /// Creates the actor and a client connected to it.
    ///
    /// `buffer_size` is the channel capacity; callers wait when it is full.
    pub fn new(buffer_size: usize) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            resources: IndexMap::new(),
            resource_types: IndexMap::new(),
        };
        (actor, StoreClient::new(sender))
    }

    /// Runs the event loop until every client is dropped.
    pub async fn run(mut self) {
        info!("Store started");

        while let Some(msg) = self.receiver.recv().await {
            let operation = msg.operation();
            match msg {
                StoreRequest::GetResource { resource_type, id, respond_to } => {
                    let item = self
                        .resources
                        .get(&id)
                        .filter(|r| r.resource_type == resource_type)
                        .cloned();
                    debug!(operation, %resource_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                StoreRequest::FindResource { id, respond_to } => {
                    let item = self.resources.get(&id).cloned();
                    debug!(operation, %id, found = item.is_some(), "Find");
                    let _ = respond_to.send(Ok(item));
                }
                StoreRequest::ListResources { query, respond_to } => {
                    let page = self.list(&query);
                    debug!(operation, ?query, count = page.len(), "List");
                    let _ = respond_to.send(Ok(page));
                }
                StoreRequest::AddResource { resource, respond_to } => {
                    let result = self.add(resource);
                    self.log_result(operation, &result);
                    let _ = respond_to.send(result);
                }
                StoreRequest::UpdateResource { resource, respond_to } => {
                    let result = self.update(resource);
                    self.log_result(operation, &result);
                    let _ = respond_to.send(result);
                }
                StoreRequest::DeleteResource { id, respond_to } => {
                    let result = match self.resources.shift_remove(&id) {
                        Some(_) => Ok(()),
                        None => Err(StoreError::NotFound(format!("resource {id}"))),
                    };
                    self.log_result(operation, &result);
                    let _ = respond_to.send(result);
                }
                StoreRequest::GetResourceType { name, respond_to } => {
                    let item = self.resource_types.get(&name).cloned();
                    debug!(operation, %name, found = item.is_some(), "Get type");
                    let _ = respond_to.send(Ok(item));
                }
                StoreRequest::ListResourceTypes { respond_to } => {
                    let types = self.resource_types.values().cloned().collect();
                    let _ = respond_to.send(Ok(types));
                }
                StoreRequest::AddResourceType { resource_type, respond_to } => {
                    let result = if self.resource_types.contains_key(&resource_type.name) {
                        Err(StoreError::Duplicate(format!("resource type {}", resource_type.name)))
                    } else {
                        self.resource_types
                            .insert(resource_type.name.clone(), resource_type);
                        Ok(())
                    };
                    self.log_result(operation, &result);
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(
            resources = self.resources.len(),
            resource_types = self.resource_types.len(),
            "Store shutdown"
        );
    }

    fn list(&self, query: &ResourceQuery) -> Vec<Resource> {
        let matching = self.resources.values().filter(|r| {
            query
                .resource_type
                .as_deref()
                .map_or(true, |t| r.resource_type == t)
        });
        match &query.range {
            Some(range) => matching
                .skip(range.start)
                .take(range.end.saturating_sub(range.start))
                .cloned()
                .collect(),
            None => matching.cloned().collect(),
        }
    }

    fn add(&mut self, resource: Resource) -> Result<(), StoreError> {
        if self.resources.contains_key(&resource.id) {
            return Err(StoreError::Duplicate(format!("resource {}", resource.id)));
        }
        self.resources.insert(resource.id.clone(), resource);
        Ok(())
    }

    fn update(&mut self, resource: Resource) -> Result<(), StoreError> {
        match self.resources.get_mut(&resource.id) {
            Some(slot) => {
                *slot = resource;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("resource {}", resource.id))),
        }
    }

    fn log_result(&self, operation: &str, result: &Result<(), StoreError>) {
        match result {
            Ok(()) => info!(operation, size = self.resources.len(), "Store write ok"),
            Err(e) => warn!(operation, error = %e, "Store write failed"),
        }
    }
}
