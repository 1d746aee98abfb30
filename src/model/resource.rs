use crate::model::IndexedField;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored, typed, schema-validated unit of content.
///
/// # Payload location
/// Exactly one of [`payload`](Self::payload) (inline content) or
/// [`payload_url`](Self::payload_url) (external reference) is set on a
/// persisted resource. The check happens when the resource is added.
///
/// The `id` is empty until the registry assigns one, and `indexed_fields`
/// is regenerated wholesale on every add and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub resource_type: String,
    pub version: u32,
    pub payload: Option<String>,
    pub payload_url: Option<String>,
    pub payload_format: String,
    pub creation_date: Option<DateTime<Utc>>,
    pub modification_date: Option<DateTime<Utc>>,
    pub indexed_fields: Vec<IndexedField>,
}

impl Resource {
    /// Creates an unsaved resource carrying an inline payload.
    ///
    /// # Arguments
    /// * `resource_type` - Name of the [`ResourceType`](crate::model::ResourceType) governing it
    /// * `payload` - Inline content in the type's payload format
    pub fn inline(resource_type: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            payload: Some(payload.into()),
            ..Self::empty(resource_type)
        }
    }

    /// Creates an unsaved resource whose content lives at an external URL.
    pub fn remote(resource_type: impl Into<String>, payload_url: impl Into<String>) -> Self {
        Self {
            payload_url: Some(payload_url.into()),
            ..Self::empty(resource_type)
        }
    }

    /// Creates an unsaved resource with neither payload nor payload URL.
    pub fn empty(resource_type: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            resource_type: resource_type.into(),
            version: 0,
            payload: None,
            payload_url: None,
            payload_format: String::new(),
            creation_date: None,
            modification_date: None,
            indexed_fields: Vec::new(),
        }
    }

    /// Replaces the inline payload, keeping everything else.
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// True when exactly one of `payload` / `payload_url` is set.
    pub fn has_single_payload_location(&self) -> bool {
        self.payload.is_some() != self.payload_url.is_some()
    }

    /// Values of the first indexed field named `name`, if any.
    pub fn field_values(&self, name: &str) -> Option<&[String]> {
        self.indexed_fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.values.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_location_is_exclusive() {
        assert!(Resource::inline("doc", "{}").has_single_payload_location());
        assert!(Resource::remote("doc", "http://example.org/a").has_single_payload_location());
        assert!(!Resource::empty("doc").has_single_payload_location());

        let mut both = Resource::inline("doc", "{}");
        both.payload_url = Some("http://example.org/a".into());
        assert!(!both.has_single_payload_location());
    }
}
