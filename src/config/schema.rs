//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the demos.
//! All types derive Serde traits for deserialization from config files.
//! Defaults reproduce the fixtures exactly, so running without a file is the
//! normal case.

use serde::{Deserialize, Serialize};

/// Root configuration shared by every demo binary.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    /// Thread demo settings.
    pub workers: WorkerConfig,

    /// Signal demo settings.
    pub signal: SignalConfig,

    /// Fixture supervisor settings.
    pub supervisor: SupervisorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Thread demo configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of execution units to launch.
    pub count: usize,

    /// How long each unit sleeps between its two messages, in milliseconds.
    pub sleep_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            count: 5,
            sleep_ms: 1000,
        }
    }
}

/// Signal demo configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SignalConfig {
    /// Signal to install a handler for and send to ourselves (e.g. "SIGUSR1").
    pub name: String,

    /// Delay between installing the handler and sending the signal.
    pub settle_ms: u64,

    /// Period of the waiting message once the signal has been sent.
    pub wait_interval_ms: u64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            name: "SIGUSR1".to_string(),
            settle_ms: 1000,
            wait_interval_ms: 1000,
        }
    }
}

/// Supervisor configuration used by `fixture-run`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Give up waiting on a fixture after this many seconds.
    pub timeout_secs: u64,

    /// Interval between non-blocking wait polls.
    pub poll_interval_ms: u64,

    /// Kill the fixture if the supervisor goes away while it still runs.
    pub terminate_on_drop: bool,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            poll_interval_ms: 10,
            terminate_on_drop: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive, overridden by `RUST_LOG` when set.
    pub log_level: String,

    /// Emit logs as JSON instead of the human-readable format.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "fixture_demos=warn".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixtures() {
        let config = DemoConfig::default();
        assert_eq!(config.workers.count, 5);
        assert_eq!(config.workers.sleep_ms, 1000);
        assert_eq!(config.signal.name, "SIGUSR1");
        assert_eq!(config.signal.wait_interval_ms, 1000);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: DemoConfig = toml::from_str("[workers]\ncount = 2\n").unwrap();
        assert_eq!(config.workers.count, 2);
        assert_eq!(config.workers.sleep_ms, 1000);
        assert_eq!(config.signal, SignalConfig::default());
    }
}
