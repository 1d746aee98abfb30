use crate::error::BoxError;
use crate::model::{Resource, ResourceType};
use async_trait::async_trait;

/// Error a listener may return; it aborts the operation that triggered it.
pub type ListenerError = BoxError;

/// Observer of resource lifecycle events.
///
/// Every hook has a no-op default, so an observer implements only the
/// events it cares about.
///
/// # Example
/// ```rust
/// use async_trait::async_trait;
/// use resource_registry::lifecycle::{ListenerError, ResourceListener};
/// use resource_registry::model::Resource;
///
/// struct AuditLog;
///
/// #[async_trait]
/// impl ResourceListener for AuditLog {
///     async fn on_resource_added(&self, resource: &Resource) -> Result<(), ListenerError> {
///         println!("added {}", resource.id);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait ResourceListener: Send + Sync {
    /// Called after a new resource is persisted.
    async fn on_resource_added(&self, _resource: &Resource) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Called after a resource is replaced. `previous` is the stored state
    /// read before the update was applied.
    async fn on_resource_updated(
        &self,
        _previous: &Resource,
        _current: &Resource,
    ) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Called after a resource is removed, with its last stored state.
    async fn on_resource_deleted(&self, _previous: &Resource) -> Result<(), ListenerError> {
        Ok(())
    }
}

/// Observer of resource type registrations.
#[async_trait]
pub trait ResourceTypeListener: Send + Sync {
    async fn on_resource_type_added(&self, resource_type: &ResourceType) -> Result<(), ListenerError>;
}
