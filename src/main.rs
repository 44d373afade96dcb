//! Application server administration.
//!
//! # Architecture Overview
//!
//! ```text
//!   settings.toml ──▶ Settings
//!                        │
//!   appserver.toml ──▶ NodeMapper ──▶ ConfigurationStore ◀── ConfigWatcher (watch)
//!         ▲                               │
//!         └──────── TomlFileSink ◀────────┤
//!                                         ▼
//!                                    AppRegistry ──▶ DeploymentController
//!                                                          │
//!                                         deploy dir: <app>.tar.gz[.dodeploy|.deployed]
//!                                                          │
//!                                                  deployment scanner (external)
//! ```

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use uuid::Uuid;

use appserver::config::{load_settings, ConfigWatcher, Settings};
use appserver::deployment::{DeploymentController, DirectoryExtractor};
use appserver::node::{HasRewrites, SystemConfiguration};
use appserver::observability::init_logging;
use appserver::registry::{AppRegistry, ApplicationInfo};
use appserver::store::{load_configuration, ConfigurationStore, TomlFileSink};

#[derive(Parser)]
#[command(name = "appserver")]
#[command(
    about = "Configuration and deployment administration for the application server",
    long_about = None
)]
struct Cli {
    /// Settings file; defaults apply when it does not exist.
    #[arg(short, long, default_value = "etc/settings.toml")]
    settings: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List applications, optionally only those with the given name
    Apps {
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Show one application
    Show { uuid: Uuid },
    /// Show the application deployed at a webapp path
    Path { webapp_path: String },
    /// Register a new application in the configuration
    Register { name: String, webapp_path: String },
    /// Copy an archive into the deploy directory
    Soak { archive: PathBuf },
    /// Flag an application for deployment
    Deploy { uuid: Uuid },
    /// Remove the deployed flag of an application
    Undeploy { uuid: Uuid },
    /// Deployment state of an application archive
    Status { name: String },
    /// Look up a virtual host rewrite rule
    Rewrite {
        server: String,
        host: String,
        condition: String,
    },
    /// Keep the configuration tree in sync with its file until Ctrl-C
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let settings = if cli.settings.exists() {
        load_settings(&cli.settings)?
    } else {
        Settings::default()
    };
    init_logging(&settings.observability.log_level)?;

    let store = Arc::new(ConfigurationStore::with_sink(
        initial_configuration(&settings.configuration_file)?,
        TomlFileSink::new(&settings.configuration_file),
    ));
    let registry = AppRegistry::new(Arc::clone(&store));
    let controller = DeploymentController::new(
        registry.clone(),
        DirectoryExtractor::with_suffix(
            &settings.deployment.deploy_dir,
            settings.deployment.archive_suffix.as_str(),
        ),
    );

    match cli.command {
        Commands::Apps { name } => {
            let apps = match name {
                Some(name) => registry.find_all_by_name(&name),
                None => registry.find_all(),
            };
            print_json(&apps)?;
        }
        Commands::Show { uuid } => print_json(&registry.load(uuid))?,
        Commands::Path { webapp_path } => print_json(&registry.load_by_webapp_path(&webapp_path))?,
        Commands::Register { name, webapp_path } => {
            let app = registry.create(&ApplicationInfo::new(name, webapp_path));
            registry.persist(&app)?;
            print_json(&app)?;
        }
        Commands::Soak { archive } => {
            let target = controller.soak(&archive)?;
            println!("{}", target.display());
        }
        Commands::Deploy { uuid } => match registry.load(uuid) {
            Some(app) => {
                let flag = controller.deploy(&app)?;
                println!("{}", flag.display());
            }
            None => return Err(format!("no application with id {}", uuid).into()),
        },
        Commands::Undeploy { uuid } => print_json(&controller.undeploy(uuid)?)?,
        Commands::Status { name } => print_json(&controller.state(&name)?)?,
        Commands::Rewrite { server, host, condition } => {
            let tree = store.get_configuration();
            let rewrite = tree
                .server(&server)
                .and_then(|s| s.virtual_host(&host))
                .and_then(|h| h.get_rewrite(&condition));
            print_json(&rewrite)?;
        }
        Commands::Watch => watch(&settings, &store).await?,
    }

    Ok(())
}

fn initial_configuration(path: &Path) -> Result<SystemConfiguration, Box<dyn Error>> {
    if path.exists() {
        Ok(load_configuration(path)?)
    } else {
        tracing::warn!(path = %path.display(), "Configuration file not found, starting empty");
        Ok(SystemConfiguration::new())
    }
}

async fn watch(settings: &Settings, store: &ConfigurationStore) -> Result<(), Box<dyn Error>> {
    if !settings.watcher.enabled {
        tracing::info!("Configuration watcher disabled");
        return Ok(());
    }

    let (watcher, mut updates) = ConfigWatcher::new(
        &settings.configuration_file,
        Duration::from_secs(settings.watcher.poll_interval_secs),
    );
    let _watcher = watcher.run()?;

    loop {
        tokio::select! {
            Some(tree) = updates.recv() => store.install(tree),
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
