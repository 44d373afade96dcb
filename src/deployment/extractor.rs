//! Archive intake and flagging.
//!
//! # Responsibilities
//! - Move external archives into the deploy directory (soak)
//! - Create and remove flag files next to archives
//!
//! # Design Decisions
//! - Archives are not unpacked here; the deployment scanner does that
//! - Soaked archives appear under their final name in one link, which fails
//!   instead of replacing an archive that is already there

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::deployment::flags::DeploymentFlag;

/// Default archive file name suffix.
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Error raised while soaking or flagging an archive.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("archive not found: {}", .0.display())]
    ArchiveNotFound(PathBuf),

    #[error("invalid archive {}: {reason}", .path.display())]
    InvalidArchive { path: PathBuf, reason: String },

    #[error("archive already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Archive handling used by the deployment controller.
pub trait Extractor: Send + Sync {
    /// Directory holding managed archives and their flags.
    fn deploy_dir(&self) -> &Path;

    /// Suffix every managed archive file name ends with.
    fn extension_suffix(&self) -> &str;

    /// Copy the archive at `location` into the deploy directory, returning
    /// its managed path.
    fn soak_archive(&self, location: &Path) -> Result<PathBuf, ExtractionError>;

    /// Create `flag` for `archive`, returning the flag path.
    fn flag_archive(
        &self,
        archive: &Path,
        flag: DeploymentFlag,
    ) -> Result<PathBuf, ExtractionError>;

    /// Remove the deployed flag of `archive`. Returns whether it was present.
    fn unflag_archive(&self, archive: &Path) -> Result<bool, ExtractionError>;

    fn is_flagged(&self, archive: &Path, flag: DeploymentFlag) -> bool {
        flag.path_for(archive).is_file()
    }
}

/// Filesystem extractor over one deploy directory.
#[derive(Debug, Clone)]
pub struct DirectoryExtractor {
    deploy_dir: PathBuf,
    suffix: String,
}

impl DirectoryExtractor {
    pub fn new(deploy_dir: impl Into<PathBuf>) -> Self {
        Self::with_suffix(deploy_dir, ARCHIVE_SUFFIX)
    }

    pub fn with_suffix(deploy_dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            deploy_dir: deploy_dir.into(),
            suffix: suffix.into(),
        }
    }
}

impl Extractor for DirectoryExtractor {
    fn deploy_dir(&self) -> &Path {
        &self.deploy_dir
    }

    fn extension_suffix(&self) -> &str {
        &self.suffix
    }

    fn soak_archive(&self, location: &Path) -> Result<PathBuf, ExtractionError> {
        if !location.is_file() {
            return Err(ExtractionError::ArchiveNotFound(location.to_path_buf()));
        }

        let file_name = location
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ExtractionError::InvalidArchive {
                path: location.to_path_buf(),
                reason: "file name is not valid UTF-8".to_string(),
            })?;
        match file_name.strip_suffix(self.suffix.as_str()) {
            Some(stem) if !stem.is_empty() => {}
            _ => {
                return Err(ExtractionError::InvalidArchive {
                    path: location.to_path_buf(),
                    reason: format!("expected a '*{}' archive", self.suffix),
                })
            }
        }

        let target = self.deploy_dir.join(file_name);
        if target.exists() {
            return Err(ExtractionError::AlreadyExists(target));
        }

        fs::create_dir_all(&self.deploy_dir)?;
        let staging = self
            .deploy_dir
            .join(format!(".{}.{}.soaking", file_name, Uuid::new_v4()));
        // hard_link never replaces an existing target, unlike rename
        let linked = fs::copy(location, &staging).and_then(|_| fs::hard_link(&staging, &target));
        if let Err(e) = fs::remove_file(&staging) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(
                    staging = %staging.display(),
                    error = %e,
                    "Failed to remove staging file"
                );
            }
        }
        match linked {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(ExtractionError::AlreadyExists(target));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(from = %location.display(), to = %target.display(), "Archive soaked");
        Ok(target)
    }

    fn flag_archive(
        &self,
        archive: &Path,
        flag: DeploymentFlag,
    ) -> Result<PathBuf, ExtractionError> {
        let flag_path = flag.path_for(archive);
        File::create(&flag_path)?;
        tracing::info!(archive = %archive.display(), %flag, "Archive flagged");
        Ok(flag_path)
    }

    fn unflag_archive(&self, archive: &Path) -> Result<bool, ExtractionError> {
        let flag_path = DeploymentFlag::Deployed.path_for(archive);
        match fs::remove_file(&flag_path) {
            Ok(()) => {
                tracing::info!(archive = %archive.display(), "Archive unflagged");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
