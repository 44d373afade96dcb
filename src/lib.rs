//! Application server configuration and deployment core.

pub mod config;
pub mod deployment;
pub mod node;
pub mod observability;
pub mod registry;
pub mod store;

pub use config::Settings;
pub use deployment::{DeploymentController, DirectoryExtractor};
pub use node::{AppNode, ServerNode, SystemConfiguration, VirtualHostNode};
pub use registry::AppRegistry;
pub use store::ConfigurationStore;
