//! Configuration tree watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::node::SystemConfiguration;
use crate::store::load_configuration;

/// A watcher that monitors the configuration tree file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    poll_interval: Duration,
    update_tx: mpsc::UnboundedSender<SystemConfiguration>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for reloaded trees.
    pub fn new(
        path: &Path,
        poll_interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SystemConfiguration>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                poll_interval,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The parent directory is watched so replacing the file by rename is
    /// seen too. A tree that fails to load or map is not forwarded; the
    /// current one stays active.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let touches_file =
                        event.paths.iter().any(|p| p.file_name() == path.file_name());
                    if touches_file && (event.kind.is_modify() || event.kind.is_create()) {
                        tracing::info!("Configuration file change detected, reloading...");
                        match load_configuration(&path) {
                            Ok(tree) => {
                                let _ = tx.send(tree);
                            }
                            Err(e) => {
                                tracing::error!(
                                    "Failed to reload configuration: {}. Keeping current tree.",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Configuration watcher started");
        Ok(watcher)
    }
}
