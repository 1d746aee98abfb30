use super::{typed_value, ExtractError, FieldExtractor};
use crate::model::{ExtractedField, FieldType, IndexFieldSpec, ResourceType};
use indexmap::IndexMap;
use serde_json::Value;

/// Extracts fields from JSON payloads.
///
/// Declared index fields are looked up by `/`-separated path. Without any
/// declaration every scalar in the document becomes a string field named by
/// its `/`-joined path; scalars inside arrays collect under the array's path.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFieldExtractor;

impl FieldExtractor for JsonFieldExtractor {
    fn extract(
        &self,
        payload: &str,
        resource_type: &ResourceType,
    ) -> Result<Vec<ExtractedField>, ExtractError> {
        let document: Value =
            serde_json::from_str(payload).map_err(|e| ExtractError::Parse(e.to_string()))?;

        if resource_type.index_fields.is_empty() {
            return Ok(all_scalars(&document));
        }

        let mut fields = Vec::with_capacity(resource_type.index_fields.len());
        for spec in &resource_type.index_fields {
            if let Some(field) = declared_field(&document, spec)? {
                fields.push(field);
            }
        }
        Ok(fields)
    }
}

fn declared_field(document: &Value, spec: &IndexFieldSpec) -> Result<Option<ExtractedField>, ExtractError> {
    let pointer = format!("/{}", spec.path.trim_start_matches('/'));
    let Some(found) = document.pointer(&pointer) else {
        return Ok(None);
    };

    let mut raw: Vec<String> = match found {
        Value::Array(items) => items.iter().filter_map(scalar).collect(),
        other => scalar(other).into_iter().collect(),
    };
    if !spec.multivalued {
        raw.truncate(1);
    }
    if raw.is_empty() {
        return Ok(None);
    }

    let values = raw
        .into_iter()
        .map(|v| typed_value(&spec.name, v, spec.field_type))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(ExtractedField::new(spec.name.clone(), spec.field_type, values)))
}

/// Field name for scalars that are the whole document.
const ROOT_FIELD: &str = "value";

fn all_scalars(document: &Value) -> Vec<ExtractedField> {
    let mut found: IndexMap<String, Vec<String>> = IndexMap::new();
    collect_scalars(document, String::new(), &mut found);
    found
        .into_iter()
        .map(|(path, values)| ExtractedField::new(path, FieldType::String, values))
        .collect()
}

fn collect_scalars(value: &Value, path: String, found: &mut IndexMap<String, Vec<String>>) {
    match value {
        Value::Object(object) => {
            for (key, child) in object {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}/{key}")
                };
                collect_scalars(child, child_path, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_scalars(item, path.clone(), found);
            }
        }
        other => {
            if let Some(v) = scalar(other) {
                let name = if path.is_empty() { ROOT_FIELD.to_string() } else { path };
                found.entry(name).or_default().push(v);
            }
        }
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_type() -> ResourceType {
        ResourceType::new("doc", "json", "")
            .with_index_field(IndexFieldSpec::new("title", "title", FieldType::String))
            .with_index_field(IndexFieldSpec::new("author", "meta/author", FieldType::String))
            .with_index_field(IndexFieldSpec::new("tag", "tags", FieldType::String).multivalued())
            .with_index_field(IndexFieldSpec::new("pages", "pages", FieldType::Integer))
    }

    #[test]
    fn extracts_declared_fields_in_order() {
        let payload = r#"{"title":"x","meta":{"author":"ann"},"tags":["a","b"],"pages":12}"#;
        let fields = JsonFieldExtractor.extract(payload, &doc_type()).unwrap();
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["title", "author", "tag", "pages"]);
        assert_eq!(fields[1].values, ["ann"]);
        assert_eq!(fields[2].values, ["a", "b"]);
        assert_eq!(fields[3].field_type, FieldType::Integer);
    }

    #[test]
    fn missing_paths_are_skipped() {
        let fields = JsonFieldExtractor.extract(r#"{"title":"x"}"#, &doc_type()).unwrap();
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn wrong_value_type_is_an_error() {
        let err = JsonFieldExtractor
            .extract(r#"{"pages":"many"}"#, &doc_type())
            .unwrap_err();
        assert!(matches!(err, ExtractError::TypeMismatch { .. }));
    }

    #[test]
    fn undeclared_type_indexes_every_scalar_by_path() {
        let rt = ResourceType::new("doc", "json", r#"{"type":"object"}"#);
        let fields = JsonFieldExtractor
            .extract(
                r#"{"title":"x","meta":{"author":"ann","year":2020},"tags":["a","b"],"refs":[{"id":1},{"id":2}],"none":null}"#,
                &rt,
            )
            .unwrap();
        let found: Vec<(&str, Vec<&str>)> = fields
            .iter()
            .map(|f| (f.name.as_str(), f.values.iter().map(String::as_str).collect()))
            .collect();
        assert_eq!(
            found,
            [
                ("meta/author", vec!["ann"]),
                ("meta/year", vec!["2020"]),
                ("refs/id", vec!["1", "2"]),
                ("tags", vec!["a", "b"]),
                ("title", vec!["x"]),
            ]
        );
    }

    #[test]
    fn scalar_documents_are_indexed() {
        let rt = ResourceType::new("doc", "json", "");
        let fields = JsonFieldExtractor.extract("[1,2]", &rt).unwrap();
        assert_eq!(fields, vec![ExtractedField::new("value", FieldType::String, vec!["1".into(), "2".into()])]);
        assert!(JsonFieldExtractor.extract("{}", &rt).unwrap().is_empty());
    }
}
