use super::config::{ConfigError, RegistryConfig};
use crate::error::RegistryError;
use crate::index::{ExtractorFactory, ExtractorRegistry};
use crate::lifecycle::{LifecycleNotifier, ResourceListener, ResourceTypeListener};
use crate::model::PayloadFormat;
use crate::service::ResourceService;
use crate::store::{StoreActor, StoreClient};
use crate::validation::{PayloadValidator, ValidatorRegistry};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info};

/// A running registry: the store actor plus the service in front of it.
///
/// # Example
///
/// ```ignore
/// let system = RegistrySystem::new(RegistryConfig::default())?;
///
/// system.service.add_resource_type(doc_type).await?;
/// let stored = system.service.add_resource(resource).await?;
///
/// system.shutdown().await?;
/// ```
pub struct RegistrySystem {
    pub service: ResourceService,
    store: StoreClient,
    handle: tokio::task::JoinHandle<()>,
}

impl RegistrySystem {
    /// Starts a registry with the default validators and extractors and no
    /// listeners. Must be called inside a tokio runtime.
    pub fn new(config: RegistryConfig) -> Result<Self, ConfigError> {
        Self::builder(config).start()
    }

    pub fn builder(config: RegistryConfig) -> RegistrySystemBuilder {
        RegistrySystemBuilder {
            config,
            validators: ValidatorRegistry::with_defaults(),
            extractors: ExtractorRegistry::with_defaults(),
            notifier: LifecycleNotifier::new(),
            clock: None,
            id_generator: None,
        }
    }

    /// A handle to the underlying store, bypassing validation and notification.
    pub fn store(&self) -> StoreClient {
        self.store.clone()
    }

    /// Shuts the registry down.
    ///
    /// Dropping the service and the store client closes the actor's channel;
    /// the actor drains what is queued and exits. Any other [`StoreClient`]
    /// clone still alive keeps the actor running, so this waits for those too.
    pub async fn shutdown(self) -> crate::error::Result<()> {
        info!("Shutting down registry...");

        drop(self.service);
        drop(self.store);

        if let Err(e) = self.handle.await {
            error!(error = %e, "Store actor task failed");
            return Err(RegistryError::internal("store actor task failed", e));
        }

        info!("Registry shutdown complete.");
        Ok(())
    }
}

/// Collects collaborators before the registry starts.
pub struct RegistrySystemBuilder {
    config: RegistryConfig,
    validators: ValidatorRegistry,
    extractors: ExtractorRegistry,
    notifier: LifecycleNotifier,
    clock: Option<Box<dyn Fn() -> DateTime<Utc> + Send + Sync>>,
    id_generator: Option<Box<dyn Fn() -> String + Send + Sync>>,
}

impl RegistrySystemBuilder {
    /// Adds a resource observer. Observers are notified in the order added.
    pub fn resource_listener(mut self, listener: Arc<dyn ResourceListener>) -> Self {
        self.notifier.register_resource_listener(listener);
        self
    }

    pub fn type_listener(mut self, listener: Arc<dyn ResourceTypeListener>) -> Self {
        self.notifier.register_type_listener(listener);
        self
    }

    /// Replaces the validator for `format`.
    pub fn validator(mut self, format: PayloadFormat, validator: Arc<dyn PayloadValidator>) -> Self {
        self.validators.register(format, validator);
        self
    }

    /// Uses `factory` for resources of one type, ahead of the format default.
    pub fn extractor_for_type(mut self, type_name: impl Into<String>, factory: Arc<dyn ExtractorFactory>) -> Self {
        self.extractors.register_type(type_name, factory);
        self
    }

    pub fn extractor_for_format(mut self, format: PayloadFormat, factory: Arc<dyn ExtractorFactory>) -> Self {
        self.extractors.register_format(format, factory);
        self
    }

    pub fn clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn id_generator(mut self, next_id: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.id_generator = Some(Box::new(next_id));
        self
    }

    /// Spawns the store actor and builds the service.
    pub fn start(self) -> Result<RegistrySystem, ConfigError> {
        self.config.validate()?;

        let (actor, store) = StoreActor::new(self.config.store_buffer);
        let handle = tokio::spawn(actor.run());

        let mut service = ResourceService::new(Arc::new(store.clone()))
            .with_validators(self.validators)
            .with_extractors(self.extractors)
            .with_notifier(self.notifier)
            .with_max_page_size(self.config.max_page_size);
        if let Some(clock) = self.clock {
            service = service.with_clock(clock);
        }
        if let Some(next_id) = self.id_generator {
            service = service.with_id_generator(next_id);
        }

        info!(
            store_buffer = self.config.store_buffer,
            max_page_size = self.config.max_page_size,
            "Registry started"
        );
        Ok(RegistrySystem { service, store, handle })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Resource, ResourceType};
    use crate::store::ResourceStore;

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let system = RegistrySystem::new(RegistryConfig::default()).unwrap();
        system
            .service
            .add_resource_type(ResourceType::new("doc", "json", ""))
            .await
            .unwrap();
        assert!(system.store().get_resource_type("doc").await.unwrap().is_some());
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_builder_injects_clock_and_ids() {
        let fixed = DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let system = RegistrySystem::builder(RegistryConfig::default())
            .clock(move || fixed)
            .id_generator(|| "doc-1".to_string())
            .start()
            .unwrap();

        system
            .service
            .add_resource_type(ResourceType::new("doc", "json", ""))
            .await
            .unwrap();
        let added = system
            .service
            .add_resource(Resource::inline("doc", "{}"))
            .await
            .unwrap();
        assert_eq!(added.id, "doc-1");
        assert_eq!(added.creation_date, Some(fixed));
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_config_does_not_start() {
        let config = RegistryConfig {
            store_buffer: 0,
            ..RegistryConfig::default()
        };
        assert!(RegistrySystem::new(config).is_err());
    }
}
