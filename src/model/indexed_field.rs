use serde::{Deserialize, Serialize};
use std::fmt;

/// Value type of an indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Integer,
    Float,
    Boolean,
    Date,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
        };
        f.write_str(name)
    }
}

/// A field produced by an extractor, not yet bound to a resource.
///
/// Extractors can only build this type; turning it into an [`IndexedField`]
/// requires the owning resource id, which only the service supplies.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedField {
    pub name: String,
    pub field_type: FieldType,
    pub values: Vec<String>,
}

impl ExtractedField {
    pub fn new(name: impl Into<String>, field_type: FieldType, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            field_type,
            values,
        }
    }

    /// Binds the field to its owning resource.
    pub fn attach(self, resource_id: &str) -> IndexedField {
        IndexedField {
            name: self.name,
            field_type: self.field_type,
            values: self.values,
            resource_id: resource_id.to_string(),
        }
    }
}

/// A derived key/value(s) projection of a resource payload, used for indexing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedField {
    pub name: String,
    pub field_type: FieldType,
    pub values: Vec<String>,
    /// Id of the owning resource.
    pub resource_id: String,
}
