//! Durable write-back of the configuration tree.

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use crate::node::{self, SystemConfiguration};
use crate::store::StoreError;

/// Receives every tree replaced through the store.
pub trait ConfigurationSink: Send + Sync {
    fn write(&self, config: &SystemConfiguration) -> Result<(), StoreError>;
}

/// Writes the tree as a TOML element document.
///
/// The file is written next to its destination first and renamed over it,
/// so a crash leaves either the old or the new document.
#[derive(Debug, Clone)]
pub struct TomlFileSink {
    path: PathBuf,
}

impl TomlFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = OsString::from(self.path.as_os_str());
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

impl ConfigurationSink for TomlFileSink {
    fn write(&self, config: &SystemConfiguration) -> Result<(), StoreError> {
        let content = toml::to_string_pretty(&node::unmap(config))?;
        let staging = self.staging_path();

        fs::write(&staging, content)?;
        fs::rename(&staging, &self.path)?;

        tracing::debug!(path = %self.path.display(), "Configuration written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{AppNode, ServerNode, VirtualHostNode, RewriteNode};
    use crate::store::load_configuration;

    #[test]
    fn test_written_tree_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appserver.toml");
        let sink = TomlFileSink::new(&path);

        let mut tree = SystemConfiguration::new().with_server(
            ServerNode::new("http", "MultiThreadedServer").with_virtual_host(
                VirtualHostNode::new("shop.local")
                    .with_rewrite(RewriteNode::new("^/(.*)$", "/index.php/$1", "L")),
            ),
        );
        tree.attach_app(AppNode::new("shop", "/webapps/shop", Vec::new()));

        sink.write(&tree).unwrap();
        assert!(!sink.staging_path().exists());

        let loaded = load_configuration(&path).unwrap();
        assert_eq!(loaded, tree);
    }
}
