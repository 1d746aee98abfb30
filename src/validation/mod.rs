//! Schema validation capability, dispatched by payload format.
//!
//! A [`ValidatorRegistry`] maps each [`PayloadFormat`] to one
//! [`PayloadValidator`]. A format with no registered validator is a hard
//! error for the caller, never a silent pass.

pub mod json;
pub mod xml;

pub use json::JsonSchemaValidator;
pub use xml::XmlSchemaValidator;

use crate::model::{PayloadFormat, ResourceType};
use std::collections::HashMap;
use std::sync::Arc;

/// Where a validator finds the schema to check a payload against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaRef<'a> {
    /// A schema registered with the validator under a resource type name.
    Registered(&'a str),
    /// Schema content carried inline by the resource type.
    Inline(&'a str),
}

/// The schema itself could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("malformed schema: {0}")]
    Malformed(String),
    #[error("schema reference {0:?} is not supported by this validator")]
    UnsupportedRef(String),
}

/// Validates payloads of one format against a schema.
pub trait PayloadValidator: Send + Sync {
    /// Returns `Ok(false)` when the payload does not conform.
    fn validate(&self, schema: SchemaRef<'_>, payload: &str) -> Result<bool, SchemaError>;

    /// Checks that the type's schema is usable, without registering it.
    fn check_schema(&self, _resource_type: &ResourceType) -> Result<(), SchemaError> {
        Ok(())
    }

    /// Called once a resource type of this format is stored.
    fn register_schema(&self, _resource_type: &ResourceType) -> Result<(), SchemaError> {
        Ok(())
    }
}

/// Maps payload formats to their validators.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<PayloadFormat, Arc<dyn PayloadValidator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in JSON and XML validators.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PayloadFormat::Json, Arc::new(JsonSchemaValidator::new()));
        registry.register(PayloadFormat::Xml, Arc::new(XmlSchemaValidator::new()));
        registry
    }

    /// Registers (or replaces) the validator for `format`.
    pub fn register(&mut self, format: PayloadFormat, validator: Arc<dyn PayloadValidator>) {
        self.validators.insert(format, validator);
    }

    pub fn get(&self, format: PayloadFormat) -> Option<&Arc<dyn PayloadValidator>> {
        self.validators.get(&format)
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("formats", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}
