//! Typed configuration node tree.
//!
//! # Data Flow
//! ```text
//! configuration file
//!     → Element tree (element.rs, serde)
//!     → mapper.rs walks each type's mapping table (mapping.rs)
//!     → SystemConfiguration { apps, servers → virtual hosts → rewrites, ... }
//!
//! Write-back:
//!     SystemConfiguration → mapper::unmap → Element tree → file
//! ```
//!
//! # Design Decisions
//! - Field layout is declared as data (`ConfigNode::mapping`), no reflection
//! - Every collection keeps document order; lookups are first-match
//! - Primary keys are fixed at construction, there is no setter
//! - Missing optional values default to empty, never to an error

pub mod app;
pub mod element;
pub mod mapper;
pub mod mapping;
pub mod param;
pub mod rewrite;
pub mod server;
pub mod system;
pub mod virtual_host;

use uuid::Uuid;

pub use app::{AppNode, DatabaseSettings, DatasourceNode};
pub use element::Element;
pub use mapper::{map, unmap, MappingError};
pub use mapping::FieldMapping;
pub use param::{HasParams, ParamNode, ParamValue};
pub use rewrite::{HasRewrites, RewriteNode};
pub use server::{
    AuthenticationNode, ConnectionHandlerNode, FileHandlerNode, ModuleNode, ServerNode,
};
pub use system::SystemConfiguration;
pub use virtual_host::VirtualHostNode;

/// A typed configuration element.
pub trait ConfigNode: Clone + Sized + 'static {
    /// Element name this node type is mapped from.
    const NODE_NAME: &'static str;

    /// An empty node carrying `primary_key`.
    fn with_primary_key(primary_key: Uuid) -> Self;

    /// Unique identifier assigned at creation.
    fn primary_key(&self) -> Uuid;

    fn node_name(&self) -> &'static str {
        Self::NODE_NAME
    }

    /// The declared field mapping table.
    fn mapping() -> Vec<FieldMapping<Self>>;

    /// Validate the node once all fields are mapped.
    fn finish(&mut self, _path: &str) -> Result<(), MappingError> {
        Ok(())
    }
}
