//! Parsed configuration source element.
//!
//! An `Element` is the already-parsed form of one structured configuration
//! element: a name, its attributes, optional text content and ordered child
//! elements. It is the input of the node mapper and the output of its inverse,
//! and derives Serde traits so whole trees can be read from and written to
//! configuration files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One structured configuration element.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Element {
    /// Element name (e.g. "server", "virtualHost").
    pub name: String,

    /// Text content, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Attribute name to value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    /// Child elements in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    /// Create an empty element with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: None,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All child elements with the given name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follow a `/`-separated path of child names, taking the first match at
    /// every step. An empty path resolves to `self`.
    pub fn descendant(&self, path: &str) -> Option<&Element> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |current, segment| current.child(segment))
    }

    /// Like [`Element::descendant`], creating missing elements on the way.
    pub fn descendant_mut(&mut self, path: &str) -> &mut Element {
        let mut current = self;
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            let index = match current.children.iter().position(|c| c.name == segment) {
                Some(index) => index,
                None => {
                    current.children.push(Element::new(segment));
                    current.children.len() - 1
                }
            };
            current = &mut current.children[index];
        }
        current
    }
}
