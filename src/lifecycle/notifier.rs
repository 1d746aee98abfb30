use super::listener::{ListenerError, ResourceListener, ResourceTypeListener};
use crate::model::{Resource, ResourceType};
use std::sync::Arc;
use tracing::{debug, warn};

/// Delivers lifecycle events to registered observers.
///
/// Listeners are registered once while wiring the process and kept in
/// registration order. With no listeners every delivery is a no-op.
#[derive(Clone, Default)]
pub struct LifecycleNotifier {
    resource_listeners: Vec<Arc<dyn ResourceListener>>,
    type_listeners: Vec<Arc<dyn ResourceTypeListener>>,
}

impl LifecycleNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_resource_listener(&mut self, listener: Arc<dyn ResourceListener>) {
        self.resource_listeners.push(listener);
    }

    pub fn register_type_listener(&mut self, listener: Arc<dyn ResourceTypeListener>) {
        self.type_listeners.push(listener);
    }

    pub fn resource_listener_count(&self) -> usize {
        self.resource_listeners.len()
    }

    pub async fn resource_added(&self, resource: &Resource) -> Result<(), ListenerError> {
        for (position, listener) in self.resource_listeners.iter().enumerate() {
            listener
                .on_resource_added(resource)
                .await
                .inspect_err(|e| warn!(position, event = "added", error = %e, "Listener failed"))?;
        }
        debug!(id = %resource.id, listeners = self.resource_listeners.len(), "Delivered added");
        Ok(())
    }

    pub async fn resource_updated(&self, previous: &Resource, current: &Resource) -> Result<(), ListenerError> {
        for (position, listener) in self.resource_listeners.iter().enumerate() {
            listener
                .on_resource_updated(previous, current)
                .await
                .inspect_err(|e| warn!(position, event = "updated", error = %e, "Listener failed"))?;
        }
        debug!(id = %current.id, listeners = self.resource_listeners.len(), "Delivered updated");
        Ok(())
    }

    pub async fn resource_deleted(&self, previous: &Resource) -> Result<(), ListenerError> {
        for (position, listener) in self.resource_listeners.iter().enumerate() {
            listener
                .on_resource_deleted(previous)
                .await
                .inspect_err(|e| warn!(position, event = "deleted", error = %e, "Listener failed"))?;
        }
        debug!(id = %previous.id, listeners = self.resource_listeners.len(), "Delivered deleted");
        Ok(())
    }

    pub async fn resource_type_added(&self, resource_type: &ResourceType) -> Result<(), ListenerError> {
        for (position, listener) in self.type_listeners.iter().enumerate() {
            listener
                .on_resource_type_added(resource_type)
                .await
                .inspect_err(|e| warn!(position, event = "type_added", error = %e, "Listener failed"))?;
        }
        debug!(name = %resource_type.name, listeners = self.type_listeners.len(), "Delivered type added");
        Ok(())
    }
}

impl std::fmt::Debug for LifecycleNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleNotifier")
            .field("resource_listeners", &self.resource_listeners.len())
            .field("type_listeners", &self.type_listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl ResourceListener for Recorder {
        async fn on_resource_added(&self, resource: &Resource) -> Result<(), ListenerError> {
            self.log.lock().push(format!("{}:{}", self.name, resource.resource_type));
            if self.fail {
                return Err("listener refused".into());
            }
            Ok(())
        }
    }

    fn recorder(name: &'static str, log: &Arc<Mutex<Vec<String>>>, fail: bool) -> Arc<Recorder> {
        Arc::new(Recorder {
            name,
            log: log.clone(),
            fail,
        })
    }

    #[tokio::test]
    async fn test_delivers_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut notifier = LifecycleNotifier::new();
        notifier.register_resource_listener(recorder("o1", &log, false));
        notifier.register_resource_listener(recorder("o2", &log, false));
        assert_eq!(notifier.resource_listener_count(), 2);

        notifier.resource_added(&Resource::inline("doc", "{}")).await.unwrap();
        assert_eq!(*log.lock(), ["o1:doc", "o2:doc"]);
    }

    #[tokio::test]
    async fn test_failure_stops_delivery() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut notifier = LifecycleNotifier::new();
        notifier.register_resource_listener(recorder("o1", &log, true));
        notifier.register_resource_listener(recorder("o2", &log, false));

        let err = notifier.resource_added(&Resource::inline("doc", "{}")).await.unwrap_err();
        assert_eq!(err.to_string(), "listener refused");
        assert_eq!(*log.lock(), ["o1:doc"]);
    }

    #[tokio::test]
    async fn test_no_listeners_is_a_no_op() {
        let notifier = LifecycleNotifier::new();
        assert_eq!(notifier.resource_listener_count(), 0);
        let resource = Resource::inline("doc", "{}");
        notifier.resource_added(&resource).await.unwrap();
        notifier.resource_updated(&resource, &resource).await.unwrap();
        notifier.resource_deleted(&resource).await.unwrap();
        notifier
            .resource_type_added(&ResourceType::new("doc", "json", ""))
            .await
            .unwrap();
    }
}
