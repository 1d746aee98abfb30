//! Minimal element walk over an XML document, shared by the XML validator
//! and the XML field extractor.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error(transparent)]
    Syntax(#[from] quick_xml::Error),
    #[error("document has no root element")]
    Empty,
    #[error("document has more than one root element")]
    MultipleRoots,
    #[error("unbalanced element tags")]
    Unbalanced,
    #[error("text content outside the root element")]
    StrayText,
}

/// One closed element, in closing order.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    /// Local names from the root down to this element, joined by `/`.
    pub path: String,
    pub name: String,
    /// Direct text content, trimmed.
    pub text: String,
    pub leaf: bool,
}

impl XmlElement {
    /// Absolute paths (leading `/`) match exactly; relative paths match
    /// any element whose path ends with them.
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix('/') {
            Some(absolute) => self.path == absolute,
            None => self.path == path || self.path.ends_with(&format!("/{path}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct XmlDocument {
    pub root: String,
    pub elements: Vec<XmlElement>,
}

impl XmlDocument {
    pub fn contains(&self, name: &str) -> bool {
        self.elements.iter().any(|e| e.name == name)
    }
}

struct Open {
    name: String,
    text: String,
    has_children: bool,
}

pub fn parse(content: &str) -> Result<XmlDocument, XmlError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Open> = Vec::new();
    let mut elements = Vec::new();
    let mut root: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => open(&mut stack, &mut root, &e)?,
            Event::Empty(e) => {
                open(&mut stack, &mut root, &e)?;
                close(&mut stack, &mut elements)?;
            }
            Event::End(_) => close(&mut stack, &mut elements)?,
            Event::Text(t) => {
                let text = t.unescape()?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(c) => {
                let bytes = c.into_inner();
                push_text(&mut stack, &String::from_utf8_lossy(&bytes))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(XmlError::Unbalanced);
    }
    let root = root.ok_or(XmlError::Empty)?;
    Ok(XmlDocument { root, elements })
}

pub fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn open(stack: &mut Vec<Open>, root: &mut Option<String>, e: &BytesStart<'_>) -> Result<(), XmlError> {
    let name = local_name(e);
    match stack.last_mut() {
        Some(parent) => parent.has_children = true,
        None if root.is_some() => return Err(XmlError::MultipleRoots),
        None => *root = Some(name.clone()),
    }
    stack.push(Open {
        name,
        text: String::new(),
        has_children: false,
    });
    Ok(())
}

fn close(stack: &mut Vec<Open>, elements: &mut Vec<XmlElement>) -> Result<(), XmlError> {
    let done = stack.pop().ok_or(XmlError::Unbalanced)?;
    let mut path: Vec<&str> = stack.iter().map(|o| o.name.as_str()).collect();
    path.push(&done.name);
    elements.push(XmlElement {
        path: path.join("/"),
        text: done.text.trim().to_string(),
        leaf: !done.has_children,
        name: done.name,
    });
    Ok(())
}

fn push_text(stack: &mut [Open], text: &str) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(current) => {
            current.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(XmlError::StrayText),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_elements_with_paths() {
        let doc = parse("<doc><title>x</title><meta><author>a</author></meta></doc>").unwrap();
        assert_eq!(doc.root, "doc");
        let paths: Vec<_> = doc.elements.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["doc/title", "doc/meta/author", "doc/meta", "doc"]);
        assert!(doc.elements[0].leaf);
        assert!(!doc.elements[2].leaf);
        assert!(doc.elements[1].matches("author"));
        assert!(doc.elements[1].matches("meta/author"));
        assert!(doc.elements[1].matches("/doc/meta/author"));
        assert!(!doc.elements[1].matches("/meta/author"));
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(parse("<doc><title>x</doc>").is_err());
        assert!(matches!(parse("<doc>"), Err(XmlError::Unbalanced)));
        assert!(matches!(parse("<a/><b/>"), Err(XmlError::MultipleRoots)));
        assert!(matches!(parse(""), Err(XmlError::Empty)));
        assert!(parse("not xml").is_err());
    }
}
