use async_trait::async_trait;
use parking_lot::Mutex;
use resource_registry::error::RegistryError;
use resource_registry::lifecycle::{LifecycleNotifier, ListenerError, ResourceListener, ResourceTypeListener};
use resource_registry::model::{Resource, ResourceType};
use resource_registry::runtime::{RegistryConfig, RegistrySystem};
use resource_registry::service::ResourceService;
use resource_registry::store::mock::MockStore;
use resource_registry::store::StoreError;
use std::sync::Arc;

type Journal = Arc<Mutex<Vec<String>>>;

/// Appends `<name>:<event>:<detail>` for every event it sees.
struct Recorder {
    name: &'static str,
    journal: Journal,
    fail_on_add: bool,
}

impl Recorder {
    fn new(name: &'static str, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            name,
            journal: journal.clone(),
            fail_on_add: false,
        })
    }

    fn failing(name: &'static str, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            name,
            journal: journal.clone(),
            fail_on_add: true,
        })
    }
}

#[async_trait]
impl ResourceListener for Recorder {
    async fn on_resource_added(&self, resource: &Resource) -> Result<(), ListenerError> {
        self.journal.lock().push(format!("{}:added:{}", self.name, resource.id));
        if self.fail_on_add {
            return Err("audit sink unavailable".into());
        }
        Ok(())
    }

    async fn on_resource_updated(&self, previous: &Resource, current: &Resource) -> Result<(), ListenerError> {
        self.journal.lock().push(format!(
            "{}:updated:{}->{}",
            self.name,
            previous.payload.as_deref().unwrap_or_default(),
            current.payload.as_deref().unwrap_or_default()
        ));
        Ok(())
    }

    async fn on_resource_deleted(&self, previous: &Resource) -> Result<(), ListenerError> {
        self.journal.lock().push(format!(
            "{}:deleted:{}",
            self.name,
            previous.payload.as_deref().unwrap_or_default()
        ));
        Ok(())
    }
}

#[async_trait]
impl ResourceTypeListener for Recorder {
    async fn on_resource_type_added(&self, resource_type: &ResourceType) -> Result<(), ListenerError> {
        self.journal.lock().push(format!("{}:type:{}", self.name, resource_type.name));
        Ok(())
    }
}

fn doc_type() -> ResourceType {
    ResourceType::new("doc", "json", r#"{"type":"object"}"#)
}

/// Observers run in registration order and see the pre-mutation snapshots.
#[tokio::test]
async fn test_observers_receive_ordered_events_with_snapshots() {
    let journal = Journal::default();
    let first = Recorder::new("o1", &journal);
    let second = Recorder::new("o2", &journal);

    let system = RegistrySystem::builder(RegistryConfig::default())
        .resource_listener(first.clone())
        .resource_listener(second)
        .type_listener(first)
        .id_generator(|| "r1".to_string())
        .start()
        .expect("Failed to start registry");
    let service = &system.service;

    service.add_resource_type(doc_type()).await.unwrap();
    let added = service
        .add_resource(Resource::inline("doc", r#"{"v":1}"#))
        .await
        .unwrap();
    service
        .update_resource(added.with_payload(r#"{"v":2}"#))
        .await
        .unwrap();
    service.delete_resource("r1").await.unwrap();

    assert_eq!(
        *journal.lock(),
        [
            "o1:type:doc",
            "o1:added:r1",
            "o2:added:r1",
            r#"o1:updated:{"v":1}->{"v":2}"#,
            r#"o2:updated:{"v":1}->{"v":2}"#,
            r#"o1:deleted:{"v":2}"#,
            r#"o2:deleted:{"v":2}"#,
        ]
    );
    system.shutdown().await.unwrap();
}

/// A failing observer turns a committed add into an internal error and stops
/// delivery to later observers. The write itself stays.
#[tokio::test]
async fn test_observer_failure_after_commit() {
    let journal = Journal::default();
    let system = RegistrySystem::builder(RegistryConfig::default())
        .resource_listener(Recorder::failing("o1", &journal))
        .resource_listener(Recorder::new("o2", &journal))
        .id_generator(|| "r1".to_string())
        .start()
        .unwrap();
    let service = &system.service;
    service.add_resource_type(doc_type()).await.unwrap();

    let err = service
        .add_resource(Resource::inline("doc", "{}"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::Internal { .. }), "got {err:?}");
    assert_eq!(err.to_string(), "internal error: failed to add resource");
    assert_eq!(*journal.lock(), ["o1:added:r1"]);

    assert!(service.get_resource_by_id("r1").await.unwrap().is_some());
    system.shutdown().await.unwrap();
}

/// A failed write is reported as internal and no observer hears about it.
#[tokio::test]
async fn test_store_failure_suppresses_notification() {
    let journal = Journal::default();
    let mut notifier = LifecycleNotifier::new();
    notifier.register_resource_listener(Recorder::new("o1", &journal));

    let mut mock = MockStore::new();
    mock.expect_get_resource_type().return_ok(Some(doc_type()));
    mock.expect_add_resource()
        .return_err(StoreError::Backend("connection reset".into()));

    let service = ResourceService::new(Arc::new(mock.client())).with_notifier(notifier);
    let err = service
        .add_resource(Resource::inline("doc", "{}"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "internal error: failed to add resource");
    assert!(journal.lock().is_empty());
    mock.verify();
}

/// Update fails with not-found when the resource vanished before the write.
#[tokio::test]
async fn test_update_races_with_delete() {
    let mut existing = Resource::inline("doc", "{}");
    existing.id = "r1".into();
    existing.payload_format = "json".into();
    existing.version = 1;

    let mut mock = MockStore::new();
    mock.expect_get_resource().return_ok(Some(existing.clone()));
    mock.expect_get_resource_type().return_ok(Some(doc_type()));
    mock.expect_update_resource()
        .return_err(StoreError::NotFound("resource r1".into()));

    let service = ResourceService::new(Arc::new(mock.client()));
    let err = service.update_resource(existing).await.unwrap_err();

    assert!(matches!(err, RegistryError::NotFound(_)), "got {err:?}");
    assert_eq!(
        mock.received(),
        ["get_resource", "get_resource_type", "update_resource"]
    );
    mock.verify();
}

/// Delete reports a store failure as internal and stays silent.
#[tokio::test]
async fn test_delete_store_failure() {
    let journal = Journal::default();
    let mut notifier = LifecycleNotifier::new();
    notifier.register_resource_listener(Recorder::new("o1", &journal));

    let mut existing = Resource::inline("doc", "{}");
    existing.id = "r1".into();

    let mut mock = MockStore::new();
    mock.expect_find_resource().return_ok(Some(existing));
    mock.expect_delete_resource()
        .return_err(StoreError::Backend("read only".into()));

    let service = ResourceService::new(Arc::new(mock.client())).with_notifier(notifier);
    let err = service.delete_resource("r1").await.unwrap_err();

    assert!(matches!(err, RegistryError::Internal { .. }), "got {err:?}");
    assert!(journal.lock().is_empty());
    mock.verify();
}
