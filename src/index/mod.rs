//! Field extraction: projects a payload into the fields a search backend
//! indexes.
//!
//! Extractors are built per [`ResourceType`] by an [`ExtractorFactory`].
//! The [`ExtractorRegistry`] picks the factory registered for the exact type
//! name first, then the one registered for the type's payload format.
//! Anything else is an error.

pub mod json;
pub mod xml;

pub use json::JsonFieldExtractor;
pub use xml::XmlFieldExtractor;

use crate::model::{ExtractedField, FieldType, PayloadFormat, ResourceType};
use chrono::{DateTime, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;

/// Errors raised while building an extractor or running it.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("no field extractor registered for resource type {0:?}")]
    NoExtractor(String),
    #[error("invalid index field {field:?}: {reason}")]
    InvalidSpec { field: String, reason: String },
    #[error("payload could not be parsed: {0}")]
    Parse(String),
    #[error("value {value:?} of field {field:?} is not a valid {expected}")]
    TypeMismatch {
        field: String,
        value: String,
        expected: FieldType,
    },
}

/// Projects one payload into an ordered list of fields.
pub trait FieldExtractor: Send + Sync {
    fn extract(
        &self,
        payload: &str,
        resource_type: &ResourceType,
    ) -> Result<Vec<ExtractedField>, ExtractError>;
}

/// Builds a [`FieldExtractor`] for a resource type.
pub trait ExtractorFactory: Send + Sync {
    fn create(&self, resource_type: &ResourceType) -> Result<Box<dyn FieldExtractor>, ExtractError>;
}

/// Built-in factory producing the JSON or XML extractor for a format.
#[derive(Debug, Clone, Copy)]
pub struct FormatExtractorFactory(pub PayloadFormat);

impl ExtractorFactory for FormatExtractorFactory {
    fn create(&self, resource_type: &ResourceType) -> Result<Box<dyn FieldExtractor>, ExtractError> {
        check_specs(resource_type)?;
        Ok(match self.0 {
            PayloadFormat::Json => Box::new(JsonFieldExtractor),
            PayloadFormat::Xml => Box::new(XmlFieldExtractor),
        })
    }
}

fn check_specs(resource_type: &ResourceType) -> Result<(), ExtractError> {
    for spec in &resource_type.index_fields {
        let invalid = |reason: &str| ExtractError::InvalidSpec {
            field: spec.name.clone(),
            reason: reason.to_string(),
        };
        if spec.name.trim().is_empty() {
            return Err(invalid("empty field name"));
        }
        if spec.path.trim_matches('/').is_empty() {
            return Err(invalid("empty path"));
        }
    }
    Ok(())
}

/// Maps resource type names and payload formats to extractor factories.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    by_type: HashMap<String, Arc<dyn ExtractorFactory>>,
    by_format: HashMap<PayloadFormat, Arc<dyn ExtractorFactory>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in JSON and XML extractors as format defaults.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for format in [PayloadFormat::Json, PayloadFormat::Xml] {
            registry.register_format(format, Arc::new(FormatExtractorFactory(format)));
        }
        registry
    }

    /// Registers a factory used only for the resource type named `type_name`.
    pub fn register_type(&mut self, type_name: impl Into<String>, factory: Arc<dyn ExtractorFactory>) {
        self.by_type.insert(type_name.into(), factory);
    }

    /// Registers the fallback factory for every type of `format`.
    pub fn register_format(&mut self, format: PayloadFormat, factory: Arc<dyn ExtractorFactory>) {
        self.by_format.insert(format, factory);
    }

    /// Builds the extractor for `resource_type`.
    pub fn extractor_for(&self, resource_type: &ResourceType) -> Result<Box<dyn FieldExtractor>, ExtractError> {
        if let Some(factory) = self.by_type.get(&resource_type.name) {
            return factory.create(resource_type);
        }
        let factory = resource_type
            .format()
            .ok()
            .and_then(|format| self.by_format.get(&format))
            .ok_or_else(|| ExtractError::NoExtractor(resource_type.name.clone()))?;
        factory.create(resource_type)
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("types", &self.by_type.keys().collect::<Vec<_>>())
            .field("formats", &self.by_format.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Normalises and checks a raw value against the declared field type.
pub(crate) fn typed_value(field: &str, raw: String, expected: FieldType) -> Result<String, ExtractError> {
    let ok = match expected {
        FieldType::String => true,
        FieldType::Integer => raw.parse::<i64>().is_ok(),
        FieldType::Float => raw.parse::<f64>().is_ok(),
        FieldType::Boolean => raw.parse::<bool>().is_ok(),
        FieldType::Date => {
            DateTime::parse_from_rfc3339(&raw).is_ok()
                || NaiveDate::parse_from_str(&raw, "%Y-%m-%d").is_ok()
        }
    };
    if ok {
        Ok(raw)
    } else {
        Err(ExtractError::TypeMismatch {
            field: field.to_string(),
            value: raw,
            expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IndexFieldSpec;

    struct Fixed;

    impl FieldExtractor for Fixed {
        fn extract(&self, _: &str, _: &ResourceType) -> Result<Vec<ExtractedField>, ExtractError> {
            Ok(vec![ExtractedField::new("fixed", FieldType::String, vec!["1".into()])])
        }
    }

    impl ExtractorFactory for Fixed {
        fn create(&self, _: &ResourceType) -> Result<Box<dyn FieldExtractor>, ExtractError> {
            Ok(Box::new(Fixed))
        }
    }

    #[test]
    fn type_registration_wins_over_format() {
        let mut registry = ExtractorRegistry::with_defaults();
        registry.register_type("special", Arc::new(Fixed));

        let special = ResourceType::new("special", "json", "");
        let fields = registry.extractor_for(&special).unwrap().extract("{}", &special).unwrap();
        assert_eq!(fields[0].name, "fixed");

        let plain = ResourceType::new("plain", "json", "");
        let fields = registry
            .extractor_for(&plain)
            .unwrap()
            .extract(r#"{"a":1}"#, &plain)
            .unwrap();
        assert_eq!(fields[0].name, "a");
    }

    #[test]
    fn unknown_format_has_no_extractor() {
        let registry = ExtractorRegistry::with_defaults();
        let rt = ResourceType::new("odd", "yaml", "");
        assert!(matches!(registry.extractor_for(&rt), Err(ExtractError::NoExtractor(_))));
    }

    #[test]
    fn factory_rejects_empty_paths() {
        let registry = ExtractorRegistry::with_defaults();
        let rt = ResourceType::new("doc", "json", "")
            .with_index_field(IndexFieldSpec::new("title", "/", FieldType::String));
        assert!(matches!(
            registry.extractor_for(&rt),
            Err(ExtractError::InvalidSpec { .. })
        ));
    }

    #[test]
    fn typed_values_are_checked() {
        assert!(typed_value("n", "42".into(), FieldType::Integer).is_ok());
        assert!(typed_value("n", "4.2".into(), FieldType::Integer).is_err());
        assert!(typed_value("d", "2024-01-31".into(), FieldType::Date).is_ok());
        assert!(typed_value("d", "2024-01-31T10:00:00Z".into(), FieldType::Date).is_ok());
        assert!(typed_value("b", "yes".into(), FieldType::Boolean).is_err());
    }
}
