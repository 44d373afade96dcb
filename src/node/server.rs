//! Server definitions and their handler nodes.
//!
//! Every collection on a server keeps declaration order: virtual host
//! routing and handler precedence depend on it.

use serde::Serialize;
use uuid::Uuid;

use crate::node::mapping::{FieldMapping, Source};
use crate::node::param::{HasParams, ParamNode};
use crate::node::rewrite::{HasRewrites, RewriteNode};
use crate::node::virtual_host::VirtualHostNode;
use crate::node::ConfigNode;

/// One network-facing server definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerNode {
    primary_key: Uuid,
    name: String,
    #[serde(rename = "type")]
    server_type: String,
    worker: String,
    socket: String,
    server_context: String,
    params: Vec<ParamNode>,
    rewrites: Vec<RewriteNode>,
    virtual_hosts: Vec<VirtualHostNode>,
    connection_handlers: Vec<ConnectionHandlerNode>,
    modules: Vec<ModuleNode>,
    file_handlers: Vec<FileHandlerNode>,
    authentications: Vec<AuthenticationNode>,
}

impl ServerNode {
    pub fn new(name: impl Into<String>, server_type: impl Into<String>) -> Self {
        let mut node = Self::with_primary_key(Uuid::new_v4());
        node.name = name.into();
        node.server_type = server_type.into();
        node
    }

    pub fn with_virtual_host(mut self, host: VirtualHostNode) -> Self {
        self.virtual_hosts.push(host);
        self
    }

    pub fn with_connection_handler(mut self, handler: ConnectionHandlerNode) -> Self {
        self.connection_handlers.push(handler);
        self
    }

    pub fn with_module(mut self, module: ModuleNode) -> Self {
        self.modules.push(module);
        self
    }

    pub fn with_file_handler(mut self, handler: FileHandlerNode) -> Self {
        self.file_handlers.push(handler);
        self
    }

    pub fn with_authentication(mut self, authentication: AuthenticationNode) -> Self {
        self.authentications.push(authentication);
        self
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

    pub fn server_type(&self) -> &str {
        &self.server_type
    }

    pub fn worker(&self) -> &str {
        &self.worker
    }

    pub fn socket(&self) -> &str {
        &self.socket
    }

    pub fn server_context(&self) -> &str {
        &self.server_context
    }

    pub fn virtual_hosts(&self) -> &[VirtualHostNode] {
        &self.virtual_hosts
    }

    /// Virtual host by exact name, first declared wins.
    pub fn virtual_host(&self, name: &str) -> Option<&VirtualHostNode> {
        self.virtual_hosts.iter().find(|h| h.name() == name)
    }

    pub fn connection_handlers(&self) -> &[ConnectionHandlerNode] {
        &self.connection_handlers
    }

    pub fn modules(&self) -> &[ModuleNode] {
        &self.modules
    }

    pub fn file_handlers(&self) -> &[FileHandlerNode] {
        &self.file_handlers
    }

    /// File handler registered for `extension`, first declared wins.
    pub fn file_handler_for(&self, extension: &str) -> Option<&FileHandlerNode> {
        self.file_handlers.iter().find(|h| h.extension() == extension)
    }

    pub fn authentications(&self) -> &[AuthenticationNode] {
        &self.authentications
    }
}

impl HasRewrites for ServerNode {
    fn rewrites(&self) -> &[RewriteNode] {
        &self.rewrites
    }
}

impl HasParams for ServerNode {
    fn params(&self) -> &[ParamNode] {
        &self.params
    }
}

impl ConfigNode for ServerNode {
    const NODE_NAME: &'static str = "server";

    fn with_primary_key(primary_key: Uuid) -> Self {
        Self {
            primary_key,
            name: String::new(),
            server_type: String::new(),
            worker: String::new(),
            socket: String::new(),
            server_context: String::new(),
            params: Vec::new(),
            rewrites: Vec::new(),
            virtual_hosts: Vec::new(),
            connection_handlers: Vec::new(),
            modules: Vec::new(),
            file_handlers: Vec::new(),
            authentications: Vec::new(),
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
            FieldMapping::text(
                "type",
                Source::Attribute("type"),
                Self::server_type,
                |n: &mut Self, v| n.server_type = v,
            )
            .required(),
            FieldMapping::text(
                "worker",
                Source::Attribute("worker"),
                Self::worker,
                |n: &mut Self, v| n.worker = v,
            ),
            FieldMapping::text(
                "socket",
                Source::Attribute("socket"),
                Self::socket,
                |n: &mut Self, v| n.socket = v,
            ),
            FieldMapping::text(
                "serverContext",
                Source::Attribute("serverContext"),
                Self::server_context,
                |n: &mut Self, v| n.server_context = v,
            ),
            FieldMapping::collection(
                "params",
                "params/param",
                Self::params,
                |n: &mut Self, c| n.params.push(c),
            ),
            FieldMapping::collection(
                "rewrites",
                "rewrites/rewrite",
                Self::rewrites,
                |n: &mut Self, c| n.rewrites.push(c),
            ),
            FieldMapping::collection(
                "virtualHosts",
                "virtualHosts/virtualHost",
                Self::virtual_hosts,
                |n: &mut Self, c| n.virtual_hosts.push(c),
            ),
            FieldMapping::collection(
                "connectionHandlers",
                "connectionHandlers/connectionHandler",
                Self::connection_handlers,
                |n: &mut Self, c| n.connection_handlers.push(c),
            ),
            FieldMapping::collection("modules", "modules/module", Self::modules, |n: &mut Self, c| {
                n.modules.push(c)
            }),
            FieldMapping::collection(
                "fileHandlers",
                "fileHandlers/fileHandler",
                Self::file_handlers,
                |n: &mut Self, c| n.file_handlers.push(c),
            ),
            FieldMapping::collection(
                "authentications",
                "authentications/authentication",
                Self::authentications,
                |n: &mut Self, c| n.authentications.push(c),
            ),
        ]
    }
}

/// Handler invoked for every accepted connection, by type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionHandlerNode {
    primary_key: Uuid,
    #[serde(rename = "type")]
    handler_type: String,
}

impl ConnectionHandlerNode {
    pub fn new(handler_type: impl Into<String>) -> Self {
        Self {
            primary_key: Uuid::new_v4(),
            handler_type: handler_type.into(),
        }
    }

    pub fn handler_type(&self) -> &str {
        &self.handler_type
    }
}

impl ConfigNode for ConnectionHandlerNode {
    const NODE_NAME: &'static str = "connectionHandler";

    fn with_primary_key(primary_key: Uuid) -> Self {
        Self {
            primary_key,
            handler_type: String::new(),
        }
    }

    fn primary_key(&self) -> Uuid {
        self.primary_key
    }

    fn mapping() -> Vec<FieldMapping<Self>> {
        vec![FieldMapping::text(
            "type",
            Source::Attribute("type"),
            Self::handler_type,
            |n: &mut Self, v| n.handler_type = v,
        )
        .required()]
    }
}

/// Server module, by type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleNode {
    primary_key: Uuid,
    #[serde(rename = "type")]
    module_type: String,
}

impl ModuleNode {
    pub fn new(module_type: impl Into<String>) -> Self {
        Self {
            primary_key: Uuid::new_v4(),
            module_type: module_type.into(),
        }
    }

    pub fn module_type(&self) -> &str {
        &self.module_type
    }
}

impl ConfigNode for ModuleNode {
    const NODE_NAME: &'static str = "module";

    fn with_primary_key(primary_key: Uuid) -> Self {
        Self {
            primary_key,
            module_type: String::new(),
        }
    }

    fn primary_key(&self) -> Uuid {
        self.primary_key
    }

    fn mapping() -> Vec<FieldMapping<Self>> {
        vec![FieldMapping::text(
            "type",
            Source::Attribute("type"),
            Self::module_type,
            |n: &mut Self, v| n.module_type = v,
        )
        .required()]
    }
}

/// Maps a file extension to the named handler serving it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileHandlerNode {
    primary_key: Uuid,
    name: String,
    extension: String,
}

impl FileHandlerNode {
    pub fn new(name: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            primary_key: Uuid::new_v4(),
            name: name.into(),
            extension: extension.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl ConfigNode for FileHandlerNode {
    const NODE_NAME: &'static str = "fileHandler";

    fn with_primary_key(primary_key: Uuid) -> Self {
        Self {
            primary_key,
            name: String::new(),
            extension: String::new(),
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
                "extension",
                Source::Attribute("extension"),
                Self::extension,
                |n: &mut Self, v| n.extension = v,
            )
            .required(),
        ]
    }
}

/// Authentication requirement for URIs matching `uri`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthenticationNode {
    primary_key: Uuid,
    uri: String,
    #[serde(rename = "type")]
    auth_type: String,
    params: Vec<ParamNode>,
}

impl AuthenticationNode {
    pub fn new(uri: impl Into<String>, auth_type: impl Into<String>) -> Self {
        let mut node = Self::with_primary_key(Uuid::new_v4());
        node.uri = uri.into();
        node.auth_type = auth_type.into();
        node
    }

    pub fn with_param(mut self, param: ParamNode) -> Self {
        self.params.push(param);
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn auth_type(&self) -> &str {
        &self.auth_type
    }
}

impl HasParams for AuthenticationNode {
    fn params(&self) -> &[ParamNode] {
        &self.params
    }
}

impl ConfigNode for AuthenticationNode {
    const NODE_NAME: &'static str = "authentication";

    fn with_primary_key(primary_key: Uuid) -> Self {
        Self {
            primary_key,
            uri: String::new(),
            auth_type: String::new(),
            params: Vec::new(),
        }
    }

    fn primary_key(&self) -> Uuid {
        self.primary_key
    }

    fn mapping() -> Vec<FieldMapping<Self>> {
        vec![
            FieldMapping::text("uri", Source::Attribute("uri"), Self::uri, |n: &mut Self, v| {
                n.uri = v
            })
            .required(),
            FieldMapping::text(
                "type",
                Source::Attribute("type"),
                Self::auth_type,
                |n: &mut Self, v| n.auth_type = v,
            ),
            FieldMapping::collection(
                "params",
                "params/param",
                Self::params,
                |n: &mut Self, c| n.params.push(c),
            ),
        ]
    }
}
