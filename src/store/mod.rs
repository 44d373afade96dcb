//! Active configuration ownership.
//!
//! # Data Flow
//! ```text
//! startup:  load_configuration(file) → ConfigurationStore::new
//! readers:  get_configuration() → Arc<SystemConfiguration> snapshot
//! writers:  update(|tree| ...)      (compare-and-swap, retried on conflict)
//!           set_configuration(tree) (whole-tree replace, last write wins)
//!           → ConfigurationSink::write (durable write-back)
//! reload:   install(tree)           (swap only, file is already current)
//! ```
//!
//! # Design Decisions
//! - The store is an explicit handle shared via Arc, not a global
//! - Readers see either the whole old tree or the whole new tree
//! - A failed write-back does not roll back the in-memory swap

pub mod sink;

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::node::{self, Element, MappingError, SystemConfiguration};

pub use sink::{ConfigurationSink, TomlFileSink};

/// Error type for loading and persisting the configuration tree.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),
}

/// Holds the active configuration tree.
pub struct ConfigurationStore {
    current: ArcSwap<SystemConfiguration>,
    sink: Option<Mutex<Box<dyn ConfigurationSink>>>,
}

impl ConfigurationStore {
    /// Create a store without durable write-back.
    pub fn new(config: SystemConfiguration) -> Self {
        Self {
            current: ArcSwap::from_pointee(config),
            sink: None,
        }
    }

    /// Create a store that writes every replaced tree to `sink`.
    pub fn with_sink(config: SystemConfiguration, sink: impl ConfigurationSink + 'static) -> Self {
        Self {
            current: ArcSwap::from_pointee(config),
            sink: Some(Mutex::new(Box::new(sink))),
        }
    }

    /// Snapshot of the active tree.
    ///
    /// The snapshot is not updated by later writes; re-fetch after mutating.
    pub fn get_configuration(&self) -> Arc<SystemConfiguration> {
        self.current.load_full()
    }

    /// Replace the whole tree and write it back.
    pub fn set_configuration(&self, config: SystemConfiguration) -> Result<(), StoreError> {
        let config = Arc::new(config);
        self.current.store(Arc::clone(&config));
        tracing::info!(
            apps = config.apps().len(),
            servers = config.servers().len(),
            "Configuration replaced"
        );
        self.write_back()
    }

    /// Read-modify-write the tree.
    ///
    /// `f` runs on a private copy of the current tree; if another writer
    /// swapped in a new tree meanwhile, `f` runs again on that one. Returns
    /// the installed tree.
    pub fn update<F>(&self, mut f: F) -> Result<Arc<SystemConfiguration>, StoreError>
    where
        F: FnMut(&mut SystemConfiguration),
    {
        let mut installed = None;
        self.current.rcu(|current| {
            let mut next = SystemConfiguration::clone(current);
            f(&mut next);
            let next = Arc::new(next);
            installed = Some(Arc::clone(&next));
            next
        });

        let installed = installed.unwrap_or_else(|| self.get_configuration());
        tracing::debug!(apps = installed.apps().len(), "Configuration updated");
        self.write_back()?;
        Ok(installed)
    }

    /// Swap in a tree that is already durable (e.g. reloaded from disk).
    pub fn install(&self, config: SystemConfiguration) {
        self.current.store(Arc::new(config));
        tracing::info!("Configuration reloaded");
    }

    /// Write the active tree through the sink. Writers are serialized and
    /// each writes the newest tree, so the file never ends on a stale one.
    fn write_back(&self) -> Result<(), StoreError> {
        let Some(sink) = &self.sink else {
            return Ok(());
        };
        let sink = sink.lock().unwrap_or_else(PoisonError::into_inner);
        sink.write(&self.get_configuration()).map_err(|e| {
            tracing::error!(error = %e, "Configuration write-back failed, in-memory tree kept");
            e
        })
    }
}

/// Decode and map a configuration tree from its file content.
pub fn parse_configuration(content: &str) -> Result<SystemConfiguration, StoreError> {
    let element: Element = toml::from_str(content)?;
    Ok(node::map(&element)?)
}

/// Load and map the configuration tree stored at `path`.
pub fn load_configuration(path: &Path) -> Result<SystemConfiguration, StoreError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_configuration(&content)?;
    tracing::info!(
        path = %path.display(),
        apps = config.apps().len(),
        servers = config.servers().len(),
        "Configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{AppNode, ConfigNode, ServerNode};

    #[derive(Default)]
    struct RecordingSink {
        writes: Arc<Mutex<Vec<usize>>>,
    }

    impl ConfigurationSink for RecordingSink {
        fn write(&self, config: &SystemConfiguration) -> Result<(), StoreError> {
            self.writes.lock().unwrap().push(config.apps().len());
            Ok(())
        }
    }

    struct FailingSink;

    impl ConfigurationSink for FailingSink {
        fn write(&self, _config: &SystemConfiguration) -> Result<(), StoreError> {
            let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
            Err(StoreError::Io(denied))
        }
    }

    #[test]
    fn test_snapshots_are_not_mutated() {
        let store = ConfigurationStore::new(SystemConfiguration::new());
        let before = store.get_configuration();

        store
            .update(|tree| tree.attach_app(AppNode::new("shop", "/webapps/shop", Vec::new())))
            .unwrap();

        assert!(before.apps().is_empty());
        assert_eq!(store.get_configuration().apps().len(), 1);
    }

    #[test]
    fn test_set_configuration_writes_back() {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let store = ConfigurationStore::with_sink(
            SystemConfiguration::new(),
            RecordingSink { writes: Arc::clone(&writes) },
        );

        let mut tree = SystemConfiguration::new()
            .with_server(ServerNode::new("http", "MultiThreadedServer"));
        tree.attach_app(AppNode::new("shop", "/webapps/shop", Vec::new()));
        let key = tree.primary_key();
        store.set_configuration(tree).unwrap();
        store.install(SystemConfiguration::new());

        assert_eq!(*writes.lock().unwrap(), vec![1]);
        assert_ne!(store.get_configuration().primary_key(), key);
    }

    #[test]
    fn test_failed_write_back_keeps_swap() {
        let store = ConfigurationStore::with_sink(SystemConfiguration::new(), FailingSink);
        let result = store.update(|tree| tree.attach_app(AppNode::new("shop", "", Vec::new())));

        assert!(matches!(result, Err(StoreError::Io(_))));
        assert_eq!(store.get_configuration().apps().len(), 1);
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let store = Arc::new(ConfigurationStore::new(SystemConfiguration::new()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for j in 0..25 {
                        let app = AppNode::new(format!("app-{}-{}", i, j), "", Vec::new());
                        store.update(|tree| tree.attach_app(app.clone())).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.get_configuration().apps().len(), 200);
    }

    #[test]
    fn test_last_write_back_holds_newest_tree() {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let store = Arc::new(ConfigurationStore::with_sink(
            SystemConfiguration::new(),
            RecordingSink { writes: Arc::clone(&writes) },
        ));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for j in 0..10 {
                        let app = AppNode::new(format!("app-{}-{}", i, j), "", Vec::new());
                        store.update(|tree| tree.attach_app(app.clone())).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let writes = writes.lock().unwrap();
        assert_eq!(writes.len(), 40);
        assert_eq!(writes.last(), Some(&40));
    }

    #[test]
    fn test_mapping_error_installs_nothing() {
        let store = ConfigurationStore::new(SystemConfiguration::new());
        let content = r#"
name = "appserver"

[[children]]
name = "servers"

[[children.children]]
name = "server"
"#;
        let result = parse_configuration(content).map(|tree| store.set_configuration(tree));

        assert!(matches!(result, Err(StoreError::Mapping(MappingError::MissingValue { .. }))));
        assert!(store.get_configuration().servers().is_empty());
    }
}
