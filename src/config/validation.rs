//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and naming constraints
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Settings → Result<(), Vec<ValidationError>>
//! - Runs before settings are accepted into the system

use std::fmt;

use crate::config::schema::Settings;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted settings key.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check `settings`, collecting every violation.
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.configuration_file.as_os_str().is_empty() {
        errors.push(ValidationError::new("configuration_file", "must not be empty"));
    }

    if settings.deployment.deploy_dir.as_os_str().is_empty() {
        errors.push(ValidationError::new("deployment.deploy_dir", "must not be empty"));
    }

    let suffix = &settings.deployment.archive_suffix;
    if !suffix.starts_with('.') || suffix.len() < 2 {
        errors.push(ValidationError::new(
            "deployment.archive_suffix",
            format!("'{}' must start with '.' followed by an extension", suffix),
        ));
    } else if suffix.contains(['/', '\\']) {
        errors.push(ValidationError::new(
            "deployment.archive_suffix",
            "must not contain path separators",
        ));
    }

    if !LOG_LEVELS.contains(&settings.observability.log_level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!(
                "'{}' is not one of {}",
                settings.observability.log_level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    if settings.watcher.enabled && settings.watcher.poll_interval_secs == 0 {
        errors.push(ValidationError::new("watcher.poll_interval_secs", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
