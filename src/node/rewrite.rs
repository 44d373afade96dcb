//! Rewrite rules.

use serde::Serialize;
use uuid::Uuid;

use crate::node::mapping::{FieldMapping, Source};
use crate::node::ConfigNode;

/// An immutable rewrite rule: requests matching `condition` are rewritten
/// to `target`, `flag` carries rule modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteNode {
    primary_key: Uuid,
    condition: String,
    target: String,
    flag: String,
}

impl RewriteNode {
    pub fn new(
        condition: impl Into<String>,
        target: impl Into<String>,
        flag: impl Into<String>,
    ) -> Self {
        Self {
            primary_key: Uuid::new_v4(),
            condition: condition.into(),
            target: target.into(),
            flag: flag.into(),
        }
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn flag(&self) -> &str {
        &self.flag
    }
}

impl ConfigNode for RewriteNode {
    const NODE_NAME: &'static str = "rewrite";

    fn with_primary_key(primary_key: Uuid) -> Self {
        Self {
            primary_key,
            condition: String::new(),
            target: String::new(),
            flag: String::new(),
        }
    }

    fn primary_key(&self) -> Uuid {
        self.primary_key
    }

    fn mapping() -> Vec<FieldMapping<Self>> {
        vec![
            FieldMapping::text(
                "condition",
                Source::Attribute("condition"),
                RewriteNode::condition,
                |n: &mut Self, v| n.condition = v,
            )
            .required(),
            FieldMapping::text(
                "target",
                Source::Attribute("target"),
                RewriteNode::target,
                |n: &mut Self, v| n.target = v,
            ),
            FieldMapping::text("flag", Source::Attribute("flag"), Self::flag, |n: &mut Self, v| {
                n.flag = v
            }),
        ]
    }
}

/// Nodes that own an ordered list of rewrite rules.
///
/// Rule order is significant. `get_rewrite` returns the first rule declared
/// for a condition, while the condition-keyed view lets later duplicates
/// overwrite earlier ones.
pub trait HasRewrites {
    fn rewrites(&self) -> &[RewriteNode];

    /// First rewrite whose condition equals `condition` exactly.
    fn get_rewrite(&self, condition: &str) -> Option<&RewriteNode> {
        self.rewrites().iter().find(|r| r.condition() == condition)
    }

    /// One rule per condition, keyed like an ordered map: a condition keeps
    /// the position of its first declaration and the rule of its last.
    fn effective_rewrites(&self) -> Vec<&RewriteNode> {
        let mut effective: Vec<&RewriteNode> = Vec::new();
        for rule in self.rewrites() {
            match effective.iter_mut().find(|r| r.condition() == rule.condition()) {
                Some(slot) => *slot = rule,
                None => effective.push(rule),
            }
        }
        effective
    }
}
