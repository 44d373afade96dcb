//! Declared field mappings.
//!
//! Every node type lists its fields as a table of [`FieldMapping`] entries:
//! where the value lives in the source element, whether it must be present,
//! and how it is stored on the node. The mapper walks this table in both
//! directions, so there is exactly one place describing a node's layout.

use std::fmt;

use crate::node::element::Element;
use crate::node::mapper::{self, MappingError};
use crate::node::ConfigNode;

/// Where a scalar value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// An attribute of the element itself.
    Attribute(&'static str),
    /// Text of a descendant element reached by a `/`-separated path.
    Text(&'static str),
    /// The element's own text content.
    Value,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Attribute(name) => write!(f, "@{}", name),
            Source::Text(path) => write!(f, "{}", path),
            Source::Value => write!(f, "text()"),
        }
    }
}

impl Source {
    fn read<'a>(&self, element: &'a Element) -> Option<&'a str> {
        match self {
            Source::Attribute(name) => element.attribute(name),
            Source::Text(path) => element.descendant(path).and_then(|e| e.text.as_deref()),
            Source::Value => element.text.as_deref(),
        }
    }

    fn write(&self, element: &mut Element, value: String) {
        match self {
            Source::Attribute(name) => {
                element.attributes.insert((*name).to_string(), value);
            }
            Source::Text(path) => element.descendant_mut(path).text = Some(value),
            Source::Value => element.text = Some(value),
        }
    }
}

/// Typed storage for a scalar field.
pub enum Scalar<N> {
    Text {
        get: fn(&N) -> &str,
        set: fn(&mut N, String),
    },
    Integer {
        get: fn(&N) -> Option<i64>,
        set: fn(&mut N, i64),
    },
}

/// How a declared field is bound to the source.
pub enum Binding<N> {
    Scalar { source: Source, target: Scalar<N> },
    Collection(Box<dyn CollectionSlot<N>>),
}

/// One row of a node type's mapping table.
pub struct FieldMapping<N> {
    /// Field name, used in error messages.
    pub field: &'static str,
    /// Whether mapping fails when the source value is absent.
    pub required: bool,
    pub binding: Binding<N>,
}

impl<N: 'static> FieldMapping<N> {
    /// A text field with an empty-string default.
    pub fn text(
        field: &'static str,
        source: Source,
        get: fn(&N) -> &str,
        set: fn(&mut N, String),
    ) -> Self {
        Self {
            field,
            required: false,
            binding: Binding::Scalar {
                source,
                target: Scalar::Text { get, set },
            },
        }
    }

    /// An integer field, `None` when absent.
    pub fn integer(
        field: &'static str,
        source: Source,
        get: fn(&N) -> Option<i64>,
        set: fn(&mut N, i64),
    ) -> Self {
        Self {
            field,
            required: false,
            binding: Binding::Scalar {
                source,
                target: Scalar::Integer { get, set },
            },
        }
    }

    /// An ordered collection of `C` children found at `path`
    /// (`container/element`, or just `element` for direct children).
    pub fn collection<C: ConfigNode>(
        field: &'static str,
        path: &'static str,
        get: fn(&N) -> &[C],
        push: fn(&mut N, C),
    ) -> Self {
        Self {
            field,
            required: false,
            binding: Binding::Collection(Box::new(Children { path, get, push })),
        }
    }

    /// Mark the field as mandatory.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Populate `node` from `element`.
    pub(crate) fn apply(
        &self,
        node: &mut N,
        element: &Element,
        path: &str,
    ) -> Result<(), MappingError> {
        match &self.binding {
            Binding::Scalar { source, target } => {
                let Some(raw) = source.read(element) else {
                    if self.required {
                        return Err(MappingError::MissingValue {
                            path: format!("{}/{}", path, source),
                            field: self.field,
                        });
                    }
                    return Ok(());
                };

                match target {
                    Scalar::Text { set, .. } => set(node, raw.to_string()),
                    Scalar::Integer { set, .. } => {
                        let value =
                            raw.trim().parse::<i64>().map_err(|_| MappingError::InvalidValue {
                                path: format!("{}/{}", path, source),
                                expected: "integer",
                                actual: raw.to_string(),
                            })?;
                        set(node, value);
                    }
                }
                Ok(())
            }
            Binding::Collection(slot) => slot.map_into(node, element, path),
        }
    }

    /// Write the field of `node` back into `element`.
    ///
    /// Empty optional values are omitted; required ones are always written.
    pub(crate) fn write_back(&self, node: &N, element: &mut Element) {
        match &self.binding {
            Binding::Scalar { source, target } => {
                let value = match target {
                    Scalar::Text { get, .. } => {
                        let text = get(node);
                        (self.required || !text.is_empty()).then(|| text.to_string())
                    }
                    Scalar::Integer { get, .. } => get(node).map(|v| v.to_string()),
                };
                if let Some(value) = value {
                    source.write(element, value);
                }
            }
            Binding::Collection(slot) => slot.unmap_from(node, element),
        }
    }
}

/// A typed child collection of a node.
pub trait CollectionSlot<N> {
    /// Map every matching child of `element` and append it to `node`.
    fn map_into(&self, node: &mut N, element: &Element, path: &str) -> Result<(), MappingError>;

    /// Append the unmapped children of `node` to `element`.
    fn unmap_from(&self, node: &N, element: &mut Element);
}

struct Children<N, C> {
    path: &'static str,
    get: fn(&N) -> &[C],
    push: fn(&mut N, C),
}

impl<N, C> Children<N, C> {
    fn split(&self) -> (&'static str, &'static str) {
        self.path.rsplit_once('/').unwrap_or(("", self.path))
    }
}

impl<N, C: ConfigNode> CollectionSlot<N> for Children<N, C> {
    fn map_into(&self, node: &mut N, element: &Element, path: &str) -> Result<(), MappingError> {
        let (container, name) = self.split();
        let Some(parent) = element.descendant(container) else {
            return Ok(());
        };

        let base = if container.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", path, container)
        };
        for (index, child) in parent.children_named(name).enumerate() {
            let child_path = format!("{}/{}[{}]", base, name, index);
            (self.push)(node, mapper::map_at::<C>(child, &child_path)?);
        }
        Ok(())
    }

    fn unmap_from(&self, node: &N, element: &mut Element) {
        let items = (self.get)(node);
        if items.is_empty() {
            return;
        }
        let (container, _) = self.split();
        let parent = element.descendant_mut(container);
        parent.children.extend(items.iter().map(mapper::unmap));
    }
}
