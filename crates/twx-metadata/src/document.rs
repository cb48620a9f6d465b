//! Tree-of-maps model for the metadata document
//!
//! An `Element` is a named node carrying insertion-ordered attributes, an
//! ordered child list and optional character data. The model mirrors what the
//! markup codec round-trips; it enforces no schema.

use indexmap::IndexMap;

use crate::errors::XmlError;
use crate::{parser, writer};

/// A complete metadata document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    /// Decode a document from markup text.
    pub fn parse(text: &str) -> Result<Document, XmlError> {
        parser::parse_document(text)
    }

    /// Encode the document back to markup text.
    ///
    /// Serialization of a tree produced by this module does not fail; the
    /// writer escapes whatever the tree contains.
    pub fn to_xml(&self) -> String {
        writer::write_document(self)
    }
}

/// One element of the metadata document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Element>,
    /// Character data, trimmed. Mixed content is collapsed into one body.
    pub text: Option<String>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Attribute value, if set.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Set an attribute. An existing key keeps its position; a new key is
    /// appended after the others.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Mutable access to the first child with the given name.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|child| child.name == name)
    }

    /// All children with the given name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Find the first child with the given name, creating and appending an
    /// empty one when absent.
    pub fn get_or_create_child(&mut self, name: &str) -> &mut Element {
        if let Some(index) = self.children.iter().position(|child| child.name == name) {
            return &mut self.children[index];
        }

        self.children.push(Element::new(name));
        let index = self.children.len() - 1;
        &mut self.children[index]
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }
}
