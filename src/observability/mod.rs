//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (uuid, archive, path, ...)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout)
//! ```
//!
//! # Design Decisions
//! - Structured fields rather than formatted messages where values matter
//! - Store swaps, persists, flag changes and reloads are logged at info

pub mod logging;

pub use logging::init_logging;
