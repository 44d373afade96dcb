//! Runtime settings subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!
//! On configuration tree change:
//!     watcher.rs detects change
//!     → store::load_configuration maps the new tree
//!     → ConfigurationStore::install swaps it in
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once loaded
//! - All fields have defaults to allow minimal settings files
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_settings, ConfigError};
pub use schema::Settings;
pub use schema::{DeploymentSettings, ObservabilityConfig, WatcherSettings};
pub use watcher::ConfigWatcher;
