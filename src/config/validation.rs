//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (counts, intervals, timeouts > 0)
//! - Check that the configured signal name is a real signal
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DemoConfig → Result<(), Vec<ValidationError>>
//! - A signal that cannot carry a handler (SIGKILL) passes here and fails at
//!   registration time instead

use thiserror::Error;

use crate::config::schema::DemoConfig;
use crate::lifecycle::signals::parse_signal;

/// Upper bound on the number of workers one demo run may launch.
pub const MAX_WORKERS: usize = 1024;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("workers.count must be at least 1")]
    NoWorkers,
    #[error("workers.count {0} exceeds the limit of {MAX_WORKERS}")]
    TooManyWorkers(usize),
    #[error("signal.name {0:?} is not a known signal")]
    UnknownSignal(String),
    #[error("signal.wait_interval_ms must be greater than zero")]
    ZeroWaitInterval,
    #[error("supervisor.timeout_secs must be greater than zero")]
    ZeroTimeout,
    #[error("supervisor.poll_interval_ms must be greater than zero")]
    ZeroPollInterval,
}

/// Check a configuration, collecting every error found.
pub fn validate_config(config: &DemoConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.workers.count == 0 {
        errors.push(ValidationError::NoWorkers);
    } else if config.workers.count > MAX_WORKERS {
        errors.push(ValidationError::TooManyWorkers(config.workers.count));
    }

    if parse_signal(&config.signal.name).is_err() {
        errors.push(ValidationError::UnknownSignal(config.signal.name.clone()));
    }
    if config.signal.wait_interval_ms == 0 {
        errors.push(ValidationError::ZeroWaitInterval);
    }

    if config.supervisor.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.supervisor.poll_interval_ms == 0 {
        errors.push(ValidationError::ZeroPollInterval);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
