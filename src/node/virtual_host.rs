//! Virtual host nodes.

use serde::Serialize;
use uuid::Uuid;

use crate::node::mapping::{FieldMapping, Source};
use crate::node::param::{HasParams, ParamNode};
use crate::node::rewrite::{HasRewrites, RewriteNode};
use crate::node::ConfigNode;

/// One virtual host with its own params and rewrite rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VirtualHostNode {
    primary_key: Uuid,
    name: String,
    params: Vec<ParamNode>,
    rewrites: Vec<RewriteNode>,
}

impl VirtualHostNode {
    pub fn new(name: impl Into<String>) -> Self {
        let mut node = Self::with_primary_key(Uuid::new_v4());
        node.name = name.into();
        node
    }

    pub fn with_rewrite(mut self, rewrite: RewriteNode) -> Self {
        self.rewrites.push(rewrite);
        self
    }

    pub fn with_param(mut self, param: ParamNode) -> Self {
        self.params.push(param);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl HasRewrites for VirtualHostNode {
    fn rewrites(&self) -> &[RewriteNode] {
        &self.rewrites
    }
}

impl HasParams for VirtualHostNode {
    fn params(&self) -> &[ParamNode] {
        &self.params
    }
}

impl ConfigNode for VirtualHostNode {
    const NODE_NAME: &'static str = "virtualHost";

    fn with_primary_key(primary_key: Uuid) -> Self {
        Self {
            primary_key,
            name: String::new(),
            params: Vec::new(),
            rewrites: Vec::new(),
        }
    }

    fn primary_key(&self) -> Uuid {
        self.primary_key
    }

    fn mapping() -> Vec<FieldMapping<Self>> {
        vec![
            FieldMapping::text("name", Source::Attribute("name"), Self::name, |n: &mut Self, v| {
                n.name = v
            }),
            FieldMapping::collection("params", "params/param", Self::params, |n: &mut Self, c| {
                n.params.push(c)
            }),
            FieldMapping::collection(
                "rewrites",
                "rewrites/rewrite",
                Self::rewrites,
                |n: &mut Self, c| n.rewrites.push(c),
            ),
        ]
    }
}
