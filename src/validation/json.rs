//! JSON payload validation against a practical subset of JSON Schema.
//!
//! Supported keywords: `type`, `required`, `properties`,
//! `additionalProperties: false`, `items`, `enum`, `minLength`, `maxLength`,
//! `minimum`, `maximum`. Unknown keywords are ignored.

use super::{PayloadValidator, SchemaError, SchemaRef};
use crate::model::ResourceType;
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaValidator;

impl JsonSchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Parses schema text. An empty schema accepts any well-formed JSON.
    pub fn parse_schema(schema: &str) -> Result<Value, SchemaError> {
        if schema.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        let value: Value =
            serde_json::from_str(schema).map_err(|e| SchemaError::Malformed(e.to_string()))?;
        match value {
            Value::Object(_) | Value::Bool(_) => Ok(value),
            other => Err(SchemaError::Malformed(format!(
                "schema must be an object or boolean, got {other}"
            ))),
        }
    }
}

impl PayloadValidator for JsonSchemaValidator {
    fn validate(&self, schema: SchemaRef<'_>, payload: &str) -> Result<bool, SchemaError> {
        let schema = match schema {
            SchemaRef::Inline(text) => Self::parse_schema(text)?,
            SchemaRef::Registered(name) => return Err(SchemaError::UnsupportedRef(name.into())),
        };
        let document: Value = match serde_json::from_str(payload) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "payload is not well-formed json");
                return Ok(false);
            }
        };
        Ok(conforms(&schema, &document))
    }

    fn check_schema(&self, resource_type: &ResourceType) -> Result<(), SchemaError> {
        Self::parse_schema(&resource_type.schema).map(|_| ())
    }
}

fn conforms(schema: &Value, value: &Value) -> bool {
    let rules = match schema {
        Value::Bool(accept) => return *accept,
        Value::Object(rules) => rules,
        _ => return false,
    };

    if let Some(expected) = rules.get("type") {
        let ok = match expected {
            Value::String(t) => has_type(t, value),
            Value::Array(ts) => ts.iter().filter_map(Value::as_str).any(|t| has_type(t, value)),
            _ => false,
        };
        if !ok {
            return false;
        }
    }

    if let Some(Value::Array(allowed)) = rules.get("enum") {
        if !allowed.contains(value) {
            return false;
        }
    }

    match value {
        Value::Object(object) => object_conforms(rules, object),
        Value::Array(items) => match rules.get("items") {
            Some(item_schema) => items.iter().all(|item| conforms(item_schema, item)),
            None => true,
        },
        Value::String(s) => {
            let len = s.chars().count() as u64;
            let min_ok = rules.get("minLength").and_then(Value::as_u64).map_or(true, |m| len >= m);
            let max_ok = rules.get("maxLength").and_then(Value::as_u64).map_or(true, |m| len <= m);
            min_ok && max_ok
        }
        Value::Number(n) => {
            let Some(x) = n.as_f64() else { return true };
            let min_ok = rules.get("minimum").and_then(Value::as_f64).map_or(true, |m| x >= m);
            let max_ok = rules.get("maximum").and_then(Value::as_f64).map_or(true, |m| x <= m);
            min_ok && max_ok
        }
        _ => true,
    }
}

fn object_conforms(rules: &Map<String, Value>, object: &Map<String, Value>) -> bool {
    if let Some(Value::Array(required)) = rules.get("required") {
        if !required
            .iter()
            .filter_map(Value::as_str)
            .all(|key| object.contains_key(key))
        {
            return false;
        }
    }

    let properties = rules.get("properties").and_then(Value::as_object);
    if let Some(properties) = properties {
        for (key, sub_schema) in properties {
            if let Some(child) = object.get(key) {
                if !conforms(sub_schema, child) {
                    return false;
                }
            }
        }
    }

    if rules.get("additionalProperties") == Some(&Value::Bool(false)) {
        let declared = |key: &String| properties.is_some_and(|p| p.contains_key(key));
        if !object.keys().all(declared) {
            return false;
        }
    }
    true
}

fn has_type(name: &str, value: &Value) -> bool {
    match name {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        "number" => value.is_number(),
        "integer" => match value {
            Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(schema: &str, payload: &str) -> bool {
        JsonSchemaValidator::new()
            .validate(SchemaRef::Inline(schema), payload)
            .unwrap()
    }

    #[test]
    fn object_type_accepts_objects_only() {
        assert!(check(r#"{"type":"object"}"#, r#"{"title":"x"}"#));
        assert!(!check(r#"{"type":"object"}"#, r#""not json""#));
        assert!(!check(r#"{"type":"object"}"#, "not json"));
    }

    #[test]
    fn required_and_nested_properties() {
        let schema = r#"{
            "type": "object",
            "required": ["title"],
            "properties": {
                "title": {"type": "string", "minLength": 1},
                "pages": {"type": "integer", "minimum": 1},
                "tags": {"type": "array", "items": {"type": "string"}}
            }
        }"#;
        assert!(check(schema, r#"{"title":"x","pages":3,"tags":["a","b"]}"#));
        assert!(!check(schema, r#"{"pages":3}"#));
        assert!(!check(schema, r#"{"title":""}"#));
        assert!(!check(schema, r#"{"title":"x","pages":0}"#));
        assert!(!check(schema, r#"{"title":"x","tags":["a",1]}"#));
    }

    #[test]
    fn closed_objects_and_enums() {
        let schema = r#"{"properties":{"kind":{"enum":["a","b"]}},"additionalProperties":false}"#;
        assert!(check(schema, r#"{"kind":"a"}"#));
        assert!(!check(schema, r#"{"kind":"c"}"#));
        assert!(!check(schema, r#"{"kind":"a","extra":1}"#));
    }

    #[test]
    fn empty_schema_accepts_any_json() {
        assert!(check("", "[1,2,3]"));
        assert!(!check("", "<xml/>"));
    }

    #[test]
    fn malformed_schema_is_an_error() {
        let err = JsonSchemaValidator::new()
            .validate(SchemaRef::Inline("{not a schema"), "{}")
            .unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(_)));
    }
}
