//! Root of the configuration tree.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::node::app::AppNode;
use crate::node::mapper::MappingError;
use crate::node::mapping::FieldMapping;
use crate::node::server::ServerNode;
use crate::node::ConfigNode;

/// The whole system configuration: applications and servers.
///
/// Application primary keys are unique across the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemConfiguration {
    primary_key: Uuid,
    apps: Vec<AppNode>,
    servers: Vec<ServerNode>,
}

impl SystemConfiguration {
    pub fn new() -> Self {
        Self::with_primary_key(Uuid::new_v4())
    }

    pub fn with_server(mut self, server: ServerNode) -> Self {
        self.servers.push(server);
        self
    }

    pub fn apps(&self) -> &[AppNode] {
        &self.apps
    }

    pub fn servers(&self) -> &[ServerNode] {
        &self.servers
    }

    /// Server by exact name.
    pub fn server(&self, name: &str) -> Option<&ServerNode> {
        self.servers.iter().find(|s| s.name() == name)
    }

    /// Attach an application: replaces the one with the same primary key in
    /// place, appends otherwise.
    pub fn attach_app(&mut self, app: AppNode) {
        match self.apps.iter_mut().find(|a| a.primary_key() == app.primary_key()) {
            Some(existing) => *existing = app,
            None => self.apps.push(app),
        }
    }

    /// Remove an application by primary key, returning it.
    pub fn detach_app(&mut self, primary_key: Uuid) -> Option<AppNode> {
        let index = self.apps.iter().position(|a| a.primary_key() == primary_key)?;
        Some(self.apps.remove(index))
    }
}

impl Default for SystemConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for SystemConfiguration {
    const NODE_NAME: &'static str = "appserver";

    fn with_primary_key(primary_key: Uuid) -> Self {
        Self {
            primary_key,
            apps: Vec::new(),
            servers: Vec::new(),
        }
    }

    fn primary_key(&self) -> Uuid {
        self.primary_key
    }

    fn mapping() -> Vec<FieldMapping<Self>> {
        vec![
            FieldMapping::collection("apps", "apps/application", Self::apps, |n: &mut Self, c| {
                n.apps.push(c)
            }),
            FieldMapping::collection("servers", "servers/server", Self::servers, |n: &mut Self, c| {
                n.servers.push(c)
            }),
        ]
    }

    fn finish(&mut self, path: &str) -> Result<(), MappingError> {
        let mut seen = HashSet::new();
        for (index, app) in self.apps.iter().enumerate() {
            if !seen.insert(app.primary_key()) {
                return Err(MappingError::DuplicatePrimaryKey {
                    path: format!("{}/apps/application[{}]", path, index),
                    key: app.primary_key(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::element::Element;
    use crate::node::mapper::map;

    #[test]
    fn test_attach_replaces_by_primary_key() {
        let mut config = SystemConfiguration::new();
        let shop = AppNode::new("shop", "/webapps/shop", Vec::new());
        config.attach_app(shop.clone());
        config.attach_app(AppNode::new("blog", "/webapps/blog", Vec::new()));
        assert_eq!(config.apps().len(), 2);

        let mut renamed = map::<AppNode>(
            &Element::new("application")
                .with_attribute("uuid", shop.primary_key().to_string())
                .with_attribute("name", "shop-v2"),
        )
        .unwrap();
        config.attach_app(renamed.clone());
        assert_eq!(config.apps().len(), 2);
        assert_eq!(config.apps()[0], renamed);

        renamed = config.detach_app(shop.primary_key()).unwrap();
        assert_eq!(renamed.name(), "shop-v2");
        assert_eq!(config.apps().len(), 1);
        assert!(config.detach_app(shop.primary_key()).is_none());
    }

    #[test]
    fn test_duplicate_app_keys_rejected() {
        let key = Uuid::new_v4().to_string();
        let app = |name: &str| {
            Element::new("application")
                .with_attribute("uuid", key.clone())
                .with_attribute("name", name)
        };
        let element = Element::new("appserver")
            .with_child(Element::new("apps").with_child(app("shop")).with_child(app("blog")));

        let err = map::<SystemConfiguration>(&element).unwrap_err();
        match err {
            MappingError::DuplicatePrimaryKey { path, .. } => {
                assert_eq!(path, "appserver/apps/application[1]")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
