//! XML payload validation against schemas registered per resource type.
//!
//! Schemas are a minimal XSD: the first `element` declared directly under
//! `schema` names the required root, and `element` declarations nested in it
//! are required descendants unless they (or an ancestor) carry
//! `minOccurs="0"`. A root whose `type` names a top-level `complexType` or
//! `group` also requires that type's elements.

use super::{PayloadValidator, SchemaError, SchemaRef};
use crate::model::ResourceType;
use crate::xml_tree;
use parking_lot::RwLock;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Structural requirements extracted from an XSD document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlSchema {
    pub root: String,
    pub required: Vec<String>,
}

/// Which top-level declaration the element currently being read belongs to.
enum Owner {
    Root,
    NamedType(String),
}

impl XmlSchema {
    pub fn parse(xsd: &str) -> Result<Self, SchemaError> {
        let mut reader = Reader::from_str(xsd);
        reader.config_mut().trim_text(true);

        // one entry per open tag: is it inside an optional `element` declaration
        let mut open: Vec<bool> = Vec::new();
        let mut owner: Option<Owner> = None;
        let mut root = None;
        let mut root_type = None;
        let mut required = Vec::new();
        let mut named_types: HashMap<String, Vec<String>> = HashMap::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| SchemaError::Malformed(e.to_string()))?;
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let tag = xml_tree::local_name(e);
                    let mut optional = open.last().copied().unwrap_or(false);

                    if open.len() == 1 {
                        // direct child of `schema`
                        owner = match tag.as_str() {
                            "element" if root.is_none() => {
                                root = attribute(e, "name")?;
                                root_type = attribute(e, "type")?.map(|t| unqualified(&t));
                                Some(Owner::Root)
                            }
                            "complexType" | "group" => attribute(e, "name")?.map(Owner::NamedType),
                            _ => None,
                        };
                    } else if open.len() > 1 && tag == "element" {
                        optional |= attribute(e, "minOccurs")?.as_deref() == Some("0");
                        let name = attribute(e, "name")?.or(attribute(e, "ref")?);
                        if let (Some(owner), Some(name), false) = (&owner, name, optional) {
                            let name = unqualified(&name);
                            match owner {
                                Owner::Root => required.push(name),
                                Owner::NamedType(t) => named_types.entry(t.clone()).or_default().push(name),
                            }
                        }
                    }

                    if matches!(event, Event::Start(_)) {
                        open.push(optional);
                    } else if open.len() == 1 {
                        owner = None;
                    }
                }
                Event::End(_) => {
                    open.pop();
                    if open.len() == 1 {
                        owner = None;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let root = root.ok_or_else(|| SchemaError::Malformed("no root element declared".into()))?;
        if let Some(elements) = root_type.and_then(|t| named_types.remove(&t)) {
            required.extend(elements);
        }
        Ok(Self { root, required })
    }

    pub fn accepts(&self, payload: &str) -> bool {
        let document = match xml_tree::parse(payload) {
            Ok(d) => d,
            Err(e) => {
                debug!(error = %e, "payload is not well-formed xml");
                return false;
            }
        };
        if document.root != self.root {
            debug!(expected = %self.root, actual = %document.root, "unexpected root element");
            return false;
        }
        match self.required.iter().find(|name| !document.contains(name)) {
            Some(missing) => {
                debug!(%missing, "required element missing");
                false
            }
            None => true,
        }
    }
}

fn unqualified(name: &str) -> String {
    name.rsplit(':').next().unwrap_or(name).to_string()
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, SchemaError> {
    let malformed = |e: &dyn std::fmt::Display| SchemaError::Malformed(e.to_string());
    match e.try_get_attribute(name).map_err(|e| malformed(&e))? {
        Some(attr) => Ok(Some(
            attr.unescape_value().map_err(|e| malformed(&e))?.into_owned(),
        )),
        None => Ok(None),
    }
}

/// Validates XML payloads against the schema registered for their type name.
#[derive(Debug, Default)]
pub struct XmlSchemaValidator {
    schemas: RwLock<HashMap<String, XmlSchema>>,
}

impl XmlSchemaValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `xsd` under `type_name`, replacing any previous schema.
    pub fn register(&self, type_name: &str, xsd: &str) -> Result<(), SchemaError> {
        let schema = XmlSchema::parse(xsd)?;
        debug!(type_name, root = %schema.root, required = schema.required.len(), "xml schema registered");
        self.schemas.write().insert(type_name.to_string(), schema);
        Ok(())
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.schemas.read().contains_key(type_name)
    }
}

impl PayloadValidator for XmlSchemaValidator {
    fn validate(&self, schema: SchemaRef<'_>, payload: &str) -> Result<bool, SchemaError> {
        match schema {
            SchemaRef::Registered(type_name) => match self.schemas.read().get(type_name) {
                Some(schema) => Ok(schema.accepts(payload)),
                None => {
                    warn!(type_name, "no xml schema registered");
                    Ok(false)
                }
            },
            SchemaRef::Inline(xsd) => Ok(XmlSchema::parse(xsd)?.accepts(payload)),
        }
    }

    fn check_schema(&self, resource_type: &ResourceType) -> Result<(), SchemaError> {
        XmlSchema::parse(&resource_type.schema).map(|_| ())
    }

    fn register_schema(&self, resource_type: &ResourceType) -> Result<(), SchemaError> {
        self.register(&resource_type.name, &resource_type.schema)
    }
}
