//! Deployment requests.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use uuid::Uuid;

use crate::deployment::extractor::{ExtractionError, Extractor};
use crate::deployment::flags::{DeploymentFlag, DeploymentState};
use crate::node::AppNode;
use crate::registry::AppRegistry;

/// Result of an undeploy request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UndeployOutcome {
    /// The deployed flag was removed.
    Unflagged,
    /// The application is known but its archive carried no deployed flag.
    NotDeployed,
    /// No application has the given id. Nothing was touched.
    UnknownApplication,
}

/// Requests deployment state changes by setting and clearing flag files.
///
/// Changes take effect when the deployment scanner next observes the deploy
/// directory; every call here returns as soon as the flag is written.
pub struct DeploymentController {
    registry: AppRegistry,
    extractor: Box<dyn Extractor>,
    flags: Mutex<()>,
}

impl DeploymentController {
    pub fn new(registry: AppRegistry, extractor: impl Extractor + 'static) -> Self {
        Self {
            registry,
            extractor: Box::new(extractor),
            flags: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &AppRegistry {
        &self.registry
    }

    /// Managed archive path for an application name.
    pub fn archive_path(&self, app_name: &str) -> Result<PathBuf, ExtractionError> {
        let file_name = format!("{}{}", app_name, self.extractor.extension_suffix());
        let plain = Path::new(&file_name).file_name() == Some(OsStr::new(&file_name));
        if app_name.is_empty() || !plain {
            return Err(ExtractionError::InvalidArchive {
                path: PathBuf::from(file_name),
                reason: "application name must be a plain file name".to_string(),
            });
        }
        Ok(self.extractor.deploy_dir().join(file_name))
    }

    /// Bring an external archive into the deploy directory.
    pub fn soak(&self, location: &Path) -> Result<PathBuf, ExtractionError> {
        self.extractor.soak_archive(location)
    }

    /// Flag the application's archive for deployment.
    ///
    /// Only the dodeploy flag is created; an existing deployed flag stays.
    pub fn deploy(&self, app: &AppNode) -> Result<PathBuf, ExtractionError> {
        let archive = self.archive_path(app.name())?;
        let _guard = self.flags.lock().unwrap_or_else(PoisonError::into_inner);

        if !archive.is_file() {
            tracing::warn!(archive = %archive.display(), "Flagging archive that is not soaked yet");
        }
        self.extractor.flag_archive(&archive, DeploymentFlag::DoDeploy)
    }

    /// Remove the deployed flag of the application with primary key `uuid`.
    ///
    /// An unknown id is not an error: the call is an idempotent no-op that
    /// reports [`UndeployOutcome::UnknownApplication`]. The dodeploy flag is
    /// never touched.
    pub fn undeploy(&self, uuid: Uuid) -> Result<UndeployOutcome, ExtractionError> {
        let Some(app) = self.registry.load(uuid) else {
            tracing::debug!(%uuid, "Undeploy requested for unknown application");
            return Ok(UndeployOutcome::UnknownApplication);
        };

        let archive = self.archive_path(app.name())?;
        let _guard = self.flags.lock().unwrap_or_else(PoisonError::into_inner);

        if self.extractor.unflag_archive(&archive)? {
            Ok(UndeployOutcome::Unflagged)
        } else {
            Ok(UndeployOutcome::NotDeployed)
        }
    }

    /// Current state of the application's archive as encoded by its flags.
    pub fn state(&self, app_name: &str) -> Result<DeploymentState, ExtractionError> {
        let archive = self.archive_path(app_name)?;
        Ok(DeploymentState::from_flags(
            archive.is_file(),
            self.extractor.is_flagged(&archive, DeploymentFlag::DoDeploy),
            self.extractor.is_flagged(&archive, DeploymentFlag::Deployed),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployment::extractor::DirectoryExtractor;
    use crate::registry::ApplicationInfo;
    use crate::store::ConfigurationStore;
    use crate::node::{ConfigNode, SystemConfiguration};
    use std::sync::Arc;

    fn controller(deploy_dir: &Path) -> DeploymentController {
        let store = Arc::new(ConfigurationStore::new(SystemConfiguration::new()));
        DeploymentController::new(AppRegistry::new(store), DirectoryExtractor::new(deploy_dir))
    }

    #[test]
    fn test_archive_path_rejects_nested_names() {
        let deploy = tempfile::tempdir().unwrap();
        let controller = controller(deploy.path());

        assert_eq!(
            controller.archive_path("shop").unwrap(),
            deploy.path().join("shop.tar.gz")
        );
        assert!(controller.archive_path("../shop").is_err());
        assert!(controller.archive_path("").is_err());
    }

    #[test]
    fn test_state_follows_flags() {
        let deploy = tempfile::tempdir().unwrap();
        let controller = controller(deploy.path());
        let app = controller.registry().create(&ApplicationInfo::new("shop", "/webapps/shop"));

        assert_eq!(controller.state("shop").unwrap(), DeploymentState::Absent);

        std::fs::write(deploy.path().join("shop.tar.gz"), b"archive").unwrap();
        assert_eq!(controller.state("shop").unwrap(), DeploymentState::Absent);

        controller.deploy(&app).unwrap();
        assert_eq!(controller.state("shop").unwrap(), DeploymentState::PendingDeploy);

        std::fs::write(deploy.path().join("shop.tar.gz.deployed"), b"").unwrap();
        assert_eq!(controller.state("shop").unwrap(), DeploymentState::Deployed);
    }

    #[test]
    fn test_concurrent_deploy_and_undeploy() {
        let deploy = tempfile::tempdir().unwrap();
        let controller = controller(deploy.path());
        let app = controller.registry().create(&ApplicationInfo::new("shop", "/webapps/shop"));
        controller.registry().persist(&app).unwrap();
        let deployed = deploy.path().join("shop.tar.gz.deployed");

        let unflagged: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let (controller, app, deployed) = (&controller, &app, &deployed);
                    scope.spawn(move || {
                        let mut unflagged = 0;
                        for _ in 0..25 {
                            controller.deploy(app).unwrap();
                            std::fs::write(deployed, b"").unwrap();
                            let outcome = controller.undeploy(app.primary_key()).unwrap();
                            if outcome == UndeployOutcome::Unflagged {
                                unflagged += 1;
                            }
                        }
                        unflagged
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });

        assert!(unflagged >= 1 && unflagged <= 200);
        assert!(deploy.path().join("shop.tar.gz.dodeploy").exists());
        assert!(!deployed.exists());
        assert_eq!(controller.undeploy(app.primary_key()).unwrap(), UndeployOutcome::NotDeployed);
    }

    #[test]
    fn test_undeploy_unknown_touches_nothing() {
        let deploy = tempfile::tempdir().unwrap();
        let controller = controller(deploy.path());
        std::fs::write(deploy.path().join("shop.tar.gz.deployed"), b"").unwrap();

        let outcome = controller.undeploy(Uuid::new_v4()).unwrap();

        assert_eq!(outcome, UndeployOutcome::UnknownApplication);
        assert!(deploy.path().join("shop.tar.gz.deployed").exists());
    }
}
