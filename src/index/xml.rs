use super::{typed_value, ExtractError, FieldExtractor};
use crate::model::{ExtractedField, FieldType, ResourceType};
use crate::xml_tree;

/// Extracts element text from XML payloads.
///
/// Declared paths match relative to any ancestor (or absolutely, with a
/// leading `/`). Without declarations every leaf element with text is
/// indexed under its local name.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlFieldExtractor;

impl FieldExtractor for XmlFieldExtractor {
    fn extract(
        &self,
        payload: &str,
        resource_type: &ResourceType,
    ) -> Result<Vec<ExtractedField>, ExtractError> {
        let document = xml_tree::parse(payload).map_err(|e| ExtractError::Parse(e.to_string()))?;

        if resource_type.index_fields.is_empty() {
            return Ok(document
                .elements
                .into_iter()
                .filter(|e| e.leaf && !e.text.is_empty())
                .map(|e| ExtractedField::new(e.name, FieldType::String, vec![e.text]))
                .collect());
        }

        let mut fields = Vec::new();
        for spec in &resource_type.index_fields {
            let mut raw: Vec<String> = document
                .elements
                .iter()
                .filter(|e| e.matches(&spec.path) && !e.text.is_empty())
                .map(|e| e.text.clone())
                .collect();
            if !spec.multivalued {
                raw.truncate(1);
            }
            if raw.is_empty() {
                continue;
            }
            let values = raw
                .into_iter()
                .map(|v| typed_value(&spec.name, v, spec.field_type))
                .collect::<Result<Vec<_>, _>>()?;
            fields.push(ExtractedField::new(spec.name.clone(), spec.field_type, values));
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IndexFieldSpec;

    #[test]
    fn extracts_declared_paths() {
        let rt = ResourceType::new("doc", "xml", "")
            .with_index_field(IndexFieldSpec::new("title", "title", FieldType::String))
            .with_index_field(IndexFieldSpec::new("keyword", "keywords/k", FieldType::String).multivalued())
            .with_index_field(IndexFieldSpec::new("year", "/doc/year", FieldType::Integer));
        let payload = "<doc><title>x</title><keywords><k>a</k><k>b</k></keywords><year>2020</year></doc>";

        let fields = XmlFieldExtractor.extract(payload, &rt).unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].values, ["x"]);
        assert_eq!(fields[1].values, ["a", "b"]);
        assert_eq!(fields[2].values, ["2020"]);
    }

    #[test]
    fn undeclared_type_indexes_leaf_elements() {
        let rt = ResourceType::new("doc", "xml", "");
        let fields = XmlFieldExtractor
            .extract("<doc><title>x</title><empty/></doc>", &rt)
            .unwrap();
        assert_eq!(fields, vec![ExtractedField::new("title", FieldType::String, vec!["x".into()])]);
    }

    #[test]
    fn malformed_payload_is_a_parse_error() {
        let rt = ResourceType::new("doc", "xml", "");
        assert!(matches!(
            XmlFieldExtractor.extract("<doc>", &rt),
            Err(ExtractError::Parse(_))
        ));
    }
}
