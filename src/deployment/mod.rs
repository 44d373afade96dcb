//! Application deployment lifecycle.
//!
//! # Data Flow
//! ```text
//! soak(archive)   → extractor copies it to <deploy_dir>/<name><suffix>
//! deploy(app)     → <deploy_dir>/<name><suffix>.dodeploy   (PendingDeploy)
//! scanner pass    → unpacks, writes .deployed               (Deployed)
//! undeploy(uuid)  → removes .deployed, scanner retires the application
//! ```
//!
//! # Design Decisions
//! - State lives in zero-byte flag files, their content is never read
//! - A crash after flagging leaves the archive pending; the scanner resumes it
//! - No retries here; retry policy belongs to the scanner
//! - Flag changes in one process are serialized, the scanner is not locked out

pub mod controller;
pub mod extractor;
pub mod flags;

pub use controller::{DeploymentController, UndeployOutcome};
pub use extractor::{DirectoryExtractor, ExtractionError, Extractor, ARCHIVE_SUFFIX};
pub use flags::{DeploymentFlag, DeploymentState};
