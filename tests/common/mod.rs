//! Shared utilities for the fixture integration tests.

use std::io::Write;
use std::path::Path;
use fixture_demos::config::SupervisorConfig;
use fixture_demos::supervisor::{run_to_completion, RunReport};
use tempfile::NamedTempFile;

pub const THREAD_DEMO: &str = env!("CARGO_BIN_EXE_thread-demo");
pub const SIGNAL_DEMO: &str = env!("CARGO_BIN_EXE_signal-demo");
#[allow(dead_code)]
pub const FIXTURE_RUN: &str = env!("CARGO_BIN_EXE_fixture-run");

/// Run a binary to completion, killing it after `timeout_secs`.
pub fn run(program: &str, args: &[&str], timeout_secs: u64) -> RunReport {
    let config = SupervisorConfig {
        timeout_secs,
        ..SupervisorConfig::default()
    };
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    run_to_completion(Path::new(program), &args, &config).unwrap()
}

/// Write a TOML config file that lives as long as the returned handle.
#[allow(dead_code)]
pub fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}
