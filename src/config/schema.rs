//! Runtime settings schema.
//!
//! Settings tell the runtime where its configuration tree and deploy
//! directory live. All types derive Serde traits for deserialization from
//! the settings file, and every section has defaults so a minimal file works.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::deployment::ARCHIVE_SUFFIX;

/// Root settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Configuration tree file (element document, read and written back).
    pub configuration_file: PathBuf,

    /// Deploy directory and archive naming.
    pub deployment: DeploymentSettings,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Configuration file watching.
    pub watcher: WatcherSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            configuration_file: PathBuf::from("etc/appserver.toml"),
            deployment: DeploymentSettings::default(),
            observability: ObservabilityConfig::default(),
            watcher: WatcherSettings::default(),
        }
    }
}

/// Deploy directory settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeploymentSettings {
    /// Directory holding archives and flag files.
    pub deploy_dir: PathBuf,

    /// Suffix every managed archive ends with.
    pub archive_suffix: String,
}

impl Default for DeploymentSettings {
    fn default() -> Self {
        Self {
            deploy_dir: PathBuf::from("deploy"),
            archive_suffix: ARCHIVE_SUFFIX.to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Watcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatcherSettings {
    /// Reload the configuration tree when its file changes.
    pub enabled: bool,

    /// Poll interval for platforms without native notifications.
    pub poll_interval_secs: u64,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_secs: 2,
        }
    }
}
