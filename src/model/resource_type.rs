use crate::model::FieldType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payload formats the registry knows how to validate and index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    Xml,
    Json,
}

impl PayloadFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadFormat::Xml => "xml",
            PayloadFormat::Json => "json",
        }
    }
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a format tag names no known [`PayloadFormat`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported payload format: {0:?}")]
pub struct UnknownFormat(pub String);

impl FromStr for PayloadFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xml" => Ok(PayloadFormat::Xml),
            "json" => Ok(PayloadFormat::Json),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Declares one field an extractor should project out of a payload.
///
/// `path` is a `/`-separated object path for JSON payloads and a
/// `/`-separated element path for XML payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexFieldSpec {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub multivalued: bool,
}

impl IndexFieldSpec {
    pub fn new(name: impl Into<String>, path: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            field_type,
            multivalued: false,
        }
    }

    pub fn multivalued(mut self) -> Self {
        self.multivalued = true;
        self
    }
}

/// The schema and format descriptor governing a class of resources.
///
/// `payload_type` stays a raw tag so that types declaring an unknown format
/// can still be represented; they are rejected when validation dispatches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceType {
    pub name: String,
    pub payload_type: String,
    pub schema: String,
    #[serde(default)]
    pub index_fields: Vec<IndexFieldSpec>,
    #[serde(default)]
    pub creation_date: Option<DateTime<Utc>>,
}

impl ResourceType {
    pub fn new(
        name: impl Into<String>,
        payload_type: impl Into<String>,
        schema: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            payload_type: payload_type.into(),
            schema: schema.into(),
            index_fields: Vec::new(),
            creation_date: None,
        }
    }

    pub fn with_index_field(mut self, field: IndexFieldSpec) -> Self {
        self.index_fields.push(field);
        self
    }

    /// Parses the declared payload type.
    pub fn format(&self) -> Result<PayloadFormat, UnknownFormat> {
        self.payload_type.parse()
    }
}
