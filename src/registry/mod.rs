//! Application registry.
//!
//! # Responsibilities
//! - Answer "what is deployed" from the active configuration tree
//! - Build application nodes for freshly deployed applications
//! - Attach application nodes to the tree
//!
//! # Design Decisions
//! - Every lookup scans the application list (application counts are small)
//! - Lookups return `Option`, absence is not an error
//! - `persist` goes through the store's compare-and-swap update

use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::node::{AppNode, ConfigNode, DatasourceNode};
use crate::store::{ConfigurationStore, StoreError};

/// A live application as seen by the runtime.
pub trait ApplicationDescriptor {
    fn name(&self) -> &str;
    fn webapp_path(&self) -> &str;
    fn datasources(&self) -> &[DatasourceNode];
}

/// Plain application descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationInfo {
    pub name: String,
    pub webapp_path: String,
    pub datasources: Vec<DatasourceNode>,
}

impl ApplicationInfo {
    pub fn new(name: impl Into<String>, webapp_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            webapp_path: webapp_path.into(),
            datasources: Vec::new(),
        }
    }
}

impl ApplicationDescriptor for ApplicationInfo {
    fn name(&self) -> &str {
        &self.name
    }

    fn webapp_path(&self) -> &str {
        &self.webapp_path
    }

    fn datasources(&self) -> &[DatasourceNode] {
        &self.datasources
    }
}

/// Query and mutation facade over the application nodes of a store.
#[derive(Clone)]
pub struct AppRegistry {
    store: Arc<ConfigurationStore>,
}

impl AppRegistry {
    pub fn new(store: Arc<ConfigurationStore>) -> Self {
        Self { store }
    }

    /// Every application, keyed by primary key.
    pub fn find_all(&self) -> BTreeMap<Uuid, AppNode> {
        self.store
            .get_configuration()
            .apps()
            .iter()
            .map(|app| (app.primary_key(), app.clone()))
            .collect()
    }

    /// Applications whose name equals `name` exactly.
    pub fn find_all_by_name(&self, name: &str) -> BTreeMap<Uuid, AppNode> {
        self.store
            .get_configuration()
            .apps()
            .iter()
            .filter(|app| app.name() == name)
            .map(|app| (app.primary_key(), app.clone()))
            .collect()
    }

    /// Application with the given primary key.
    pub fn load(&self, uuid: Uuid) -> Option<AppNode> {
        self.store
            .get_configuration()
            .apps()
            .iter()
            .find(|app| app.primary_key() == uuid)
            .cloned()
    }

    /// First application, in tree order, deployed at `webapp_path`.
    ///
    /// Paths are expected to be unique; if they are not, later applications
    /// sharing the path are not reachable through this lookup.
    pub fn load_by_webapp_path(&self, webapp_path: &str) -> Option<AppNode> {
        self.store
            .get_configuration()
            .apps()
            .iter()
            .find(|app| app.webapp_path() == webapp_path)
            .cloned()
    }

    /// Attach `app` to the active tree, replacing the node with the same
    /// primary key if there is one.
    pub fn persist(&self, app: &AppNode) -> Result<(), StoreError> {
        self.store.update(|tree| tree.attach_app(app.clone()))?;
        tracing::info!(uuid = %app.primary_key(), name = %app.name(), "Application persisted");
        Ok(())
    }

    /// Build a new, unpersisted application node for `application`.
    pub fn create(&self, application: &dyn ApplicationDescriptor) -> AppNode {
        AppNode::new(
            application.name(),
            application.webapp_path(),
            application.datasources().to_vec(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SystemConfiguration;
    use std::collections::HashSet;

    fn registry() -> AppRegistry {
        AppRegistry::new(Arc::new(ConfigurationStore::new(SystemConfiguration::new())))
    }

    #[test]
    fn test_find_all_by_name_is_exact() {
        let registry = registry();
        let shop = registry.create(&ApplicationInfo::new("shop", "/webapps/shop"));
        let other_shop = registry.create(&ApplicationInfo::new("shop", "/webapps/shop-2"));
        let upper = registry.create(&ApplicationInfo::new("Shop", "/webapps/Shop"));
        for app in [&shop, &other_shop, &upper] {
            registry.persist(app).unwrap();
        }

        let found = registry.find_all_by_name("shop");
        assert_eq!(found.len(), 2);
        assert!(found.contains_key(&shop.primary_key()));
        assert!(found.contains_key(&other_shop.primary_key()));
        assert!(registry.find_all_by_name("blog").is_empty());
        assert_eq!(registry.find_all().len(), 3);
    }

    #[test]
    fn test_load_unknown_is_absent() {
        let registry = registry();
        assert!(registry.load(Uuid::new_v4()).is_none());
        assert!(registry.load_by_webapp_path("/webapps/none").is_none());
    }

    #[test]
    fn test_load_by_webapp_path_returns_first() {
        let registry = registry();
        let first = registry.create(&ApplicationInfo::new("a", "/webapps/shared"));
        let second = registry.create(&ApplicationInfo::new("b", "/webapps/shared"));
        registry.persist(&first).unwrap();
        registry.persist(&second).unwrap();

        assert_eq!(registry.load_by_webapp_path("/webapps/shared"), Some(first));
    }

    #[test]
    fn test_persist_twice_replaces() {
        let registry = registry();
        let app = registry.create(&ApplicationInfo::new("shop", "/webapps/shop"));
        registry.persist(&app).unwrap();
        registry.persist(&app).unwrap();

        assert_eq!(registry.find_all().len(), 1);
        assert_eq!(registry.load(app.primary_key()), Some(app));
    }

    #[test]
    fn test_create_never_repeats_keys() {
        let registry = registry();
        let info = ApplicationInfo::new("shop", "/webapps/shop");
        let keys: HashSet<_> = (0..10_000).map(|_| registry.create(&info).primary_key()).collect();
        assert_eq!(keys.len(), 10_000);
    }
}
