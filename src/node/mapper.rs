//! Structural mapping between source elements and configuration nodes.
//!
//! `map` turns an [`Element`] into a typed node by walking the node type's
//! declared mapping table; `unmap` is its inverse and produces the element
//! written back to durable storage. Neither has side effects beyond building
//! the returned value.

use thiserror::Error;
use uuid::Uuid;

use crate::node::element::Element;
use crate::node::ConfigNode;

/// Attribute carrying a node's primary key in the source.
pub const PRIMARY_KEY_ATTRIBUTE: &str = "uuid";

/// Error raised when a source element cannot populate a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("{path}: expected element <{expected}>, found <{found}>")]
    UnexpectedElement {
        path: String,
        expected: &'static str,
        found: String,
    },

    #[error("{path}: required value '{field}' is missing")]
    MissingValue { path: String, field: &'static str },

    #[error("{path}: cannot read '{actual}' as {expected}")]
    InvalidValue {
        path: String,
        expected: &'static str,
        actual: String,
    },

    #[error("{path}: duplicate primary key {key}")]
    DuplicatePrimaryKey { path: String, key: Uuid },
}

/// Map a source element to a node of type `N`.
pub fn map<N: ConfigNode>(element: &Element) -> Result<N, MappingError> {
    map_at(element, &element.name)
}

/// Map `element`, reporting errors relative to `path`.
pub(crate) fn map_at<N: ConfigNode>(element: &Element, path: &str) -> Result<N, MappingError> {
    if element.name != N::NODE_NAME {
        return Err(MappingError::UnexpectedElement {
            path: path.to_string(),
            expected: N::NODE_NAME,
            found: element.name.clone(),
        });
    }

    let primary_key = match element.attribute(PRIMARY_KEY_ATTRIBUTE) {
        Some(raw) => Uuid::parse_str(raw).map_err(|_| MappingError::InvalidValue {
            path: format!("{}/@{}", path, PRIMARY_KEY_ATTRIBUTE),
            expected: "uuid",
            actual: raw.to_string(),
        })?,
        None => Uuid::new_v4(),
    };

    let mut node = N::with_primary_key(primary_key);
    for field in N::mapping() {
        field.apply(&mut node, element, path)?;
    }
    node.finish(path)?;

    Ok(node)
}

/// Produce the source element for `node`.
///
/// Mapping the result again yields a node equal to `node`, primary key
/// included.
pub fn unmap<N: ConfigNode>(node: &N) -> Element {
    let mut element = Element::new(N::NODE_NAME)
        .with_attribute(PRIMARY_KEY_ATTRIBUTE, node.primary_key().to_string());
    for field in N::mapping() {
        field.write_back(node, &mut element);
    }
    element
}
