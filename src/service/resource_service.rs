//! # Resource Service
//!
//! The orchestrator behind every registry operation. Reads go straight to
//! the store. Mutations run one fixed sequence on the caller's task:
//!
//! ```text
//! add:    payload location -> type lookup -> stamp -> validate -> id -> extract -> persist -> notify
//! update: snapshot -> type lookup -> extract -> stamp -> validate -> persist -> notify
//! delete: snapshot -> delete -> notify
//! ```
//!
//! Any failure stops the sequence; nothing after it runs and no listener
//! hears about the operation.

use crate::error::{RegistryError, Result};
use crate::index::ExtractorRegistry;
use crate::lifecycle::LifecycleNotifier;
use crate::model::{IndexedField, PayloadFormat, Resource, ResourceType};
use crate::store::{ResourceQuery, ResourceStore, StoreError};
use crate::validation::{SchemaRef, ValidatorRegistry};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Source of timestamps for creation and modification dates.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Source of fresh resource ids.
pub type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Default cap on the length of one page.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 1000;

/// Sequences validation, extraction, persistence and notification for
/// resources.
///
/// # Example
///
/// ```rust
/// use resource_registry::model::{Resource, ResourceType};
/// use resource_registry::service::ResourceService;
/// use resource_registry::store::StoreActor;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, store) = StoreActor::new(8);
///     tokio::spawn(actor.run());
///     let service = ResourceService::new(Arc::new(store));
///
///     service
///         .add_resource_type(ResourceType::new("doc", "json", r#"{"type":"object"}"#))
///         .await
///         .unwrap();
///     let added = service
///         .add_resource(Resource::inline("doc", r#"{"title":"x"}"#))
///         .await
///         .unwrap();
///     assert_eq!(added.field_values("title"), Some(&["x".to_string()][..]));
/// }
/// ```
pub struct ResourceService {
    store: Arc<dyn ResourceStore>,
    validators: ValidatorRegistry,
    extractors: ExtractorRegistry,
    notifier: LifecycleNotifier,
    clock: Clock,
    next_id: IdGenerator,
    max_page_size: usize,
}

impl ResourceService {
    /// Creates a service over `store` with the built-in JSON/XML validators
    /// and extractors, no listeners, the system clock and UUID v4 ids.
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self {
            store,
            validators: ValidatorRegistry::with_defaults(),
            extractors: ExtractorRegistry::with_defaults(),
            notifier: LifecycleNotifier::new(),
            clock: Arc::new(Utc::now),
            next_id: Arc::new(|| Uuid::new_v4().to_string()),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    pub fn with_validators(mut self, validators: ValidatorRegistry) -> Self {
        self.validators = validators;
        self
    }

    pub fn with_extractors(mut self, extractors: ExtractorRegistry) -> Self {
        self.extractors = extractors;
        self
    }

    pub fn with_notifier(mut self, notifier: LifecycleNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_id_generator(mut self, next_id: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.next_id = Arc::new(next_id);
        self
    }

    /// Caps every page at `max_page_size` resources. Zero is ignored.
    pub fn with_max_page_size(mut self, max_page_size: usize) -> Self {
        if max_page_size > 0 {
            self.max_page_size = max_page_size;
        }
        self
    }

    // --- Reads ---

    pub async fn get_resource(&self, resource_type: &str, id: &str) -> Result<Option<Resource>> {
        Ok(self.store.get_resource(resource_type, id).await?)
    }

    /// Looks a resource up by id, whatever its type.
    pub async fn get_resource_by_id(&self, id: &str) -> Result<Option<Resource>> {
        Ok(self.store.find_resource(id).await?)
    }

    pub async fn get_resources_by_type(&self, resource_type: &str) -> Result<Vec<Resource>> {
        Ok(self
            .store
            .list_resources(ResourceQuery::of_type(resource_type))
            .await?)
    }

    /// Resources of one type with index in `from..to`, in insertion order.
    pub async fn get_resources_by_type_page(
        &self,
        resource_type: &str,
        from: usize,
        to: usize,
    ) -> Result<Vec<Resource>> {
        let query = ResourceQuery::of_type(resource_type).page(from, self.clamp(from, to));
        Ok(self.store.list_resources(query).await?)
    }

    /// Resources of every type with index in `from..to`, in insertion order.
    pub async fn get_resources_page(&self, from: usize, to: usize) -> Result<Vec<Resource>> {
        let query = ResourceQuery::all().page(from, self.clamp(from, to));
        Ok(self.store.list_resources(query).await?)
    }

    pub async fn get_resources(&self) -> Result<Vec<Resource>> {
        Ok(self.store.list_resources(ResourceQuery::all()).await?)
    }

    pub async fn get_resource_type(&self, name: &str) -> Result<Option<ResourceType>> {
        Ok(self.store.get_resource_type(name).await?)
    }

    pub async fn list_resource_types(&self) -> Result<Vec<ResourceType>> {
        Ok(self.store.list_resource_types().await?)
    }

    fn clamp(&self, from: usize, to: usize) -> usize {
        to.min(from.saturating_add(self.max_page_size))
    }

    // --- Mutations ---

    /// Validates, indexes and persists a new resource.
    ///
    /// Returns the stored resource with its generated id, dates, payload
    /// format and indexed fields.
    ///
    /// # Errors
    /// - [`RegistryError::InvalidInput`] unless exactly one of payload / payload URL is set
    /// - [`RegistryError::NotFound`] if the resource type is unknown
    /// - [`RegistryError::FormatMismatch`], [`RegistryError::Validation`],
    ///   [`RegistryError::UnsupportedFormat`] from validation
    /// - [`RegistryError::Internal`] if extraction, the store or a listener fails
    #[instrument(skip(self, resource), fields(resource_type = %resource.resource_type))]
    pub async fn add_resource(&self, mut resource: Resource) -> Result<Resource> {
        if !resource.has_single_payload_location() {
            warn!("Payload location conflict");
            return Err(RegistryError::InvalidInput(
                "payload and payload_url conflict: neither set or both set".into(),
            ));
        }

        let resource_type = self.require_type(&resource.resource_type).await?;
        let now = (self.clock)();
        resource.creation_date = Some(now);
        resource.modification_date = Some(now);
        resource.payload_format = resource_type.payload_type.clone();

        let started = Instant::now();
        self.check_valid(&resource_type, &resource)?;
        info!(elapsed_ms = elapsed_ms(started), "Payload validated");

        resource.id = (self.next_id)();
        resource.version = 1;

        let started = Instant::now();
        resource.indexed_fields = self.indexed_fields(&resource_type, &resource)?;
        info!(
            id = %resource.id,
            fields = resource.indexed_fields.len(),
            elapsed_ms = elapsed_ms(started),
            "Indexed fields extracted"
        );

        self.store.add_resource(resource.clone()).await.map_err(|e| {
            error!(id = %resource.id, error = %e, "Error saving resource");
            RegistryError::internal("failed to add resource", e)
        })?;
        info!(id = %resource.id, "Resource added");

        self.notifier
            .resource_added(&resource)
            .await
            .map_err(|e| RegistryError::internal("failed to add resource", e))?;
        Ok(resource)
    }

    /// Re-indexes, re-validates and replaces a stored resource.
    ///
    /// `id`, `creation_date` and `version` come from the stored copy; the
    /// version is bumped. The payload location is not re-checked here.
    ///
    /// # Errors
    /// - [`RegistryError::NotFound`] if no resource with this type and id exists,
    ///   or the resource type is unknown
    /// - [`RegistryError::FormatMismatch`], [`RegistryError::Validation`],
    ///   [`RegistryError::UnsupportedFormat`] from validation
    /// - [`RegistryError::Internal`] if extraction, the store or a listener fails
    #[instrument(skip(self, resource), fields(resource_type = %resource.resource_type, id = %resource.id))]
    pub async fn update_resource(&self, mut resource: Resource) -> Result<Resource> {
        let previous = self
            .store
            .get_resource(&resource.resource_type, &resource.id)
            .await?
            .ok_or_else(|| {
                RegistryError::NotFound(format!(
                    "resource {} of type {}",
                    resource.id, resource.resource_type
                ))
            })?;
        let resource_type = self.require_type(&resource.resource_type).await?;

        let started = Instant::now();
        resource.indexed_fields = self.indexed_fields(&resource_type, &resource)?;
        debug!(
            fields = resource.indexed_fields.len(),
            elapsed_ms = elapsed_ms(started),
            "Indexed fields extracted"
        );

        resource.modification_date = Some((self.clock)());
        resource.creation_date = previous.creation_date;
        resource.version = previous.version + 1;
        self.check_valid(&resource_type, &resource)?;

        self.store.update_resource(resource.clone()).await.map_err(|e| {
            error!(error = %e, "Error updating resource");
            write_failure("failed to update resource", e)
        })?;
        info!(version = resource.version, "Resource updated");

        self.notifier
            .resource_updated(&previous, &resource)
            .await
            .map_err(|e| RegistryError::internal("failed to update resource", e))?;
        Ok(resource)
    }

    /// Removes a resource by id.
    #[instrument(skip(self))]
    pub async fn delete_resource(&self, id: &str) -> Result<()> {
        let previous = self
            .store
            .find_resource(id)
            .await?
            .ok_or_else(|| RegistryError::NotFound(format!("resource {id}")))?;

        let started = Instant::now();
        self.store.delete_resource(id).await.map_err(|e| {
            error!(error = %e, "Error deleting resource");
            write_failure("failed to delete resource", e)
        })?;
        info!(elapsed_ms = elapsed_ms(started), "Resource deleted");

        self.notifier
            .resource_deleted(&previous)
            .await
            .map_err(|e| RegistryError::internal("failed to delete resource", e))
    }

    /// Registers a new resource type.
    ///
    /// The declared format needs a validator that accepts the schema, and the
    /// index field declarations must build an extractor. The schema reaches
    /// the validator only after the store has accepted the type.
    #[instrument(skip(self, resource_type), fields(name = %resource_type.name))]
    pub async fn add_resource_type(&self, mut resource_type: ResourceType) -> Result<ResourceType> {
        if resource_type.name.trim().is_empty() {
            return Err(RegistryError::InvalidInput("resource type name is empty".into()));
        }
        let format = resource_type
            .format()
            .map_err(|e| RegistryError::UnsupportedFormat(e.0))?;
        let validator = self
            .validators
            .get(format)
            .ok_or_else(|| RegistryError::UnsupportedFormat(format.to_string()))?;

        if self.store.get_resource_type(&resource_type.name).await?.is_some() {
            return Err(RegistryError::InvalidInput(format!(
                "resource type {} already exists",
                resource_type.name
            )));
        }

        validator
            .check_schema(&resource_type)
            .map_err(|e| RegistryError::InvalidInput(format!("unusable schema: {e}")))?;
        self.extractors
            .extractor_for(&resource_type)
            .map_err(|e| RegistryError::InvalidInput(e.to_string()))?;

        resource_type.creation_date = Some((self.clock)());
        self.store
            .add_resource_type(resource_type.clone())
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(what) => {
                    RegistryError::InvalidInput(format!("{what} already exists"))
                }
                other => RegistryError::internal("failed to add resource type", other),
            })?;
        // Only the stored type's schema may reach the validator
        validator
            .register_schema(&resource_type)
            .map_err(|e| RegistryError::internal("failed to add resource type", e))?;
        info!(format = %format, index_fields = resource_type.index_fields.len(), "Resource type added");

        self.notifier
            .resource_type_added(&resource_type)
            .await
            .map_err(|e| RegistryError::internal("failed to add resource type", e))?;
        Ok(resource_type)
    }

    /// Registers the schema of every stored resource type with its validator.
    ///
    /// Needed when the store already holds types that were not added through
    /// this service. Types whose format or schema is unusable are skipped.
    pub async fn load_schemas(&self) -> Result<usize> {
        let mut loaded = 0;
        for resource_type in self.store.list_resource_types().await? {
            let Some(validator) = resource_type.format().ok().and_then(|f| self.validators.get(f)) else {
                warn!(name = %resource_type.name, format = %resource_type.payload_type, "Skipping type without validator");
                continue;
            };
            let registered = validator
                .check_schema(&resource_type)
                .and_then(|()| validator.register_schema(&resource_type));
            match registered {
                Ok(()) => loaded += 1,
                Err(e) => warn!(name = %resource_type.name, error = %e, "Skipping unusable schema"),
            }
        }
        Ok(loaded)
    }

    // --- Pipeline steps ---

    async fn require_type(&self, name: &str) -> Result<ResourceType> {
        self.store
            .get_resource_type(name)
            .await?
            .ok_or_else(|| RegistryError::NotFound(format!("resource type {name}")))
    }

    fn check_valid(&self, resource_type: &ResourceType, resource: &Resource) -> Result<()> {
        if resource_type.payload_type != resource.payload_format {
            return Err(RegistryError::FormatMismatch {
                expected: resource_type.payload_type.clone(),
                actual: resource.payload_format.clone(),
            });
        }

        let format = resource_type
            .format()
            .map_err(|e| RegistryError::UnsupportedFormat(e.0))?;
        let validator = self
            .validators
            .get(format)
            .ok_or_else(|| RegistryError::UnsupportedFormat(format.to_string()))?;

        let schema = match format {
            PayloadFormat::Xml => SchemaRef::Registered(&resource_type.name),
            PayloadFormat::Json => SchemaRef::Inline(&resource_type.schema),
        };
        let payload = resource.payload.as_deref().unwrap_or_default();

        match validator.validate(schema, payload) {
            Ok(true) => Ok(()),
            Ok(false) => Err(RegistryError::Validation(format!("{format} and schema mismatch"))),
            Err(e) => Err(RegistryError::Validation(e.to_string())),
        }
    }

    fn indexed_fields(&self, resource_type: &ResourceType, resource: &Resource) -> Result<Vec<IndexedField>> {
        let extractor = self.extractors.extractor_for(resource_type).map_err(|e| {
            error!(error = %e, "Error creating field extractor");
            RegistryError::internal("error extracting fields", e)
        })?;
        let payload = resource.payload.as_deref().unwrap_or_default();
        let fields = extractor.extract(payload, resource_type)?;
        Ok(fields.into_iter().map(|f| f.attach(&resource.id)).collect())
    }
}

impl std::fmt::Debug for ResourceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceService")
            .field("validators", &self.validators)
            .field("extractors", &self.extractors)
            .field("notifier", &self.notifier)
            .field("max_page_size", &self.max_page_size)
            .finish()
    }
}

/// A write that lost a race with a delete stays `NotFound`; anything else is
/// reported under the operation's message, the same one listener failures use.
fn write_failure(message: &str, e: StoreError) -> RegistryError {
    match e {
        StoreError::NotFound(what) => RegistryError::NotFound(what),
        other => RegistryError::internal(message, other),
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1e3
}
