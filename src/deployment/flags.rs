//! Flag files and the deployment states they encode.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A zero-byte sentinel placed next to an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeploymentFlag {
    /// Archive should be deployed on the scanner's next pass.
    DoDeploy,
    /// Archive is deployed.
    Deployed,
}

impl DeploymentFlag {
    pub fn extension(&self) -> &'static str {
        match self {
            DeploymentFlag::DoDeploy => ".dodeploy",
            DeploymentFlag::Deployed => ".deployed",
        }
    }

    /// Path of this flag for `archive` (`<archive><extension>`).
    pub fn path_for(&self, archive: &Path) -> PathBuf {
        let mut flag = OsString::from(archive.as_os_str());
        flag.push(self.extension());
        PathBuf::from(flag)
    }
}

impl fmt::Display for DeploymentFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Deployment state of one archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    /// No archive, or an archive without flags.
    Absent,
    /// Archive present and flagged for deployment.
    PendingDeploy,
    /// Archive present and deployed.
    Deployed,
}

impl DeploymentState {
    pub fn from_flags(archive_present: bool, do_deploy: bool, deployed: bool) -> Self {
        match (archive_present, do_deploy, deployed) {
            (false, _, _) => DeploymentState::Absent,
            (true, _, true) => DeploymentState::Deployed,
            (true, true, false) => DeploymentState::PendingDeploy,
            (true, false, false) => DeploymentState::Absent,
        }
    }
}
