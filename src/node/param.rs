//! Typed parameter nodes.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::node::mapper::MappingError;
use crate::node::mapping::{FieldMapping, Source};
use crate::node::ConfigNode;

/// A parameter value coerced to its declared type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Float(f64),
}

impl ParamValue {
    /// Coerce `raw` according to the declared type name.
    ///
    /// An empty type name means `string`.
    pub fn parse(param_type: &str, raw: &str) -> Result<Self, &'static str> {
        match param_type {
            "" | "string" => Ok(ParamValue::String(raw.to_string())),
            "integer" => raw.trim().parse().map(ParamValue::Integer).map_err(|_| "integer"),
            "float" => raw.trim().parse().map(ParamValue::Float).map_err(|_| "float"),
            "boolean" => match raw.trim() {
                "true" | "1" => Ok(ParamValue::Boolean(true)),
                "false" | "0" => Ok(ParamValue::Boolean(false)),
                _ => Err("boolean"),
            },
            _ => Err("one of string, integer, boolean, float"),
        }
    }

    /// The type name this value is declared with.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::String(_) => "string",
            ParamValue::Integer(_) => "integer",
            ParamValue::Boolean(_) => "boolean",
            ParamValue::Float(_) => "float",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::String(v) => write!(f, "{}", v),
            ParamValue::Integer(v) => write!(f, "{}", v),
            ParamValue::Boolean(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// A named, typed parameter (`<param name=".." type="..">value</param>`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamNode {
    primary_key: Uuid,
    name: String,
    param_type: String,
    raw: String,
    value: ParamValue,
}

impl ParamNode {
    pub fn new(name: impl Into<String>, value: ParamValue) -> Self {
        Self {
            primary_key: Uuid::new_v4(),
            name: name.into(),
            param_type: value.type_name().to_string(),
            raw: value.to_string(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_type(&self) -> &str {
        &self.param_type
    }

    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    fn raw(&self) -> &str {
        &self.raw
    }
}

impl ConfigNode for ParamNode {
    const NODE_NAME: &'static str = "param";

    fn with_primary_key(primary_key: Uuid) -> Self {
        Self {
            primary_key,
            name: String::new(),
            param_type: String::new(),
            raw: String::new(),
            value: ParamValue::String(String::new()),
        }
    }

    fn primary_key(&self) -> Uuid {
        self.primary_key
    }

    fn mapping() -> Vec<FieldMapping<Self>> {
        vec![
            FieldMapping::text("name", Source::Attribute("name"), Self::name, |n: &mut Self, v| {
                n.name = v
            })
            .required(),
            FieldMapping::text(
                "type",
                Source::Attribute("type"),
                ParamNode::param_type,
                |n: &mut Self, v| n.param_type = v,
            ),
            FieldMapping::text("value", Source::Value, ParamNode::raw, |n: &mut Self, v| n.raw = v),
        ]
    }

    fn finish(&mut self, path: &str) -> Result<(), MappingError> {
        self.value = ParamValue::parse(&self.param_type, &self.raw).map_err(|expected| {
            MappingError::InvalidValue {
                path: format!("{}/{}", path, Source::Value),
                expected,
                actual: self.raw.clone(),
            }
        })?;
        Ok(())
    }
}

/// Nodes that own an ordered parameter list.
pub trait HasParams {
    fn params(&self) -> &[ParamNode];

    /// Value of the first parameter named `name`.
    fn get_param(&self, name: &str) -> Option<&ParamValue> {
        self.params().iter().find(|p| p.name() == name).map(ParamNode::value)
    }
}
