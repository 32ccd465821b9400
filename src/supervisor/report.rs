//! Run a fixture to the end and summarize what happened.

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};
use serde::Serialize;

use crate::config::SupervisorConfig;
use crate::supervisor::process::{Supervised, SupervisorError};
use crate::supervisor::reason::{State, StopReason};

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub program: String,
    pub args: Vec<String>,
    pub state: State,
    pub exit_code: Option<i32>,
    pub signal: Option<String>,
    pub stdout: Vec<String>,
    pub elapsed_ms: u64,
    pub timed_out: bool,
}

impl RunReport {
    fn new(proc: &Supervised, reason: StopReason, timed_out: bool) -> Self {
        Self {
            program: proc.program().display().to_string(),
            args: proc.args().to_vec(),
            state: reason.state,
            exit_code: reason.exit_code(),
            signal: reason.signal().map(|s| s.as_str().to_string()),
            stdout: proc.stdout_lines(),
            elapsed_ms: proc.elapsed().as_millis() as u64,
            timed_out,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "program:  {}", self.program)?;
        write!(f, "result:   {:?}", self.state)?;
        if let Some(code) = self.exit_code {
            write!(f, " (code {})", code)?;
        }
        if let Some(signal) = &self.signal {
            write!(f, " ({})", signal)?;
        }
        if self.timed_out {
            write!(f, " after timeout")?;
        }
        writeln!(f)?;
        writeln!(f, "elapsed:  {} ms", self.elapsed_ms)?;
        writeln!(f, "stdout:   {} line(s)", self.stdout.len())?;
        for line in &self.stdout {
            writeln!(f, "  | {}", line)?;
        }
        Ok(())
    }
}

/// Launch `program` and wait until it exits or is killed.
///
/// A fixture still running after `timeout_secs` is killed, along with its
/// process group, and reported as timed out. Intermediate stops are logged
/// and waited through.
pub fn run_to_completion(
    program: &Path,
    args: &[String],
    config: &SupervisorConfig,
) -> Result<RunReport, SupervisorError> {
    let mut proc = Supervised::launch(program, args, config.terminate_on_drop)?;
    let deadline = Instant::now() + Duration::from_secs(config.timeout_secs);
    let poll = Duration::from_millis(config.poll_interval_ms);

    let (reason, timed_out) = loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match proc.blocking_wait(remaining, poll) {
            Ok(reason) if reason.state.is_closed() => break (reason, false),
            Ok(reason) => {
                tracing::info!(
                    state = ?reason.state,
                    info = ?reason.info,
                    "Fixture changed state, still waiting"
                );
            }
            Err(SupervisorError::Timeout) => {
                tracing::warn!(timeout_secs = config.timeout_secs, "Fixture timed out, killing it");
                break (proc.terminate()?, true);
            }
            Err(e) => return Err(e),
        }
    };

    if config.terminate_on_drop {
        proc.kill_stragglers();
    }
    proc.finish_output();
    Ok(RunReport::new(&proc, reason, timed_out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    fn run_sh(script: &str, config: &SupervisorConfig) -> RunReport {
        run_to_completion(Path::new("/bin/sh"), &sh(script), config).unwrap()
    }

    fn short_timeout() -> SupervisorConfig {
        SupervisorConfig {
            timeout_secs: 1,
            ..SupervisorConfig::default()
        }
    }

    #[test]
    fn reports_normal_exit() {
        let report = run_sh("echo hello; exit 1", &SupervisorConfig::default());

        assert_eq!(report.state, State::Exited);
        assert_eq!(report.exit_code, Some(1));
        assert_eq!(report.signal, None);
        assert_eq!(report.stdout, vec!["hello"]);
        assert!(!report.timed_out);
    }

    #[test]
    fn kills_on_timeout() {
        let report = run_sh("echo before; sleep 30", &short_timeout());

        assert!(report.timed_out);
        assert!(report.elapsed_ms < 3_000, "{} ms", report.elapsed_ms);
        assert_eq!(report.state, State::Terminated);
        assert_eq!(report.signal.as_deref(), Some("SIGKILL"));
        assert_eq!(report.stdout, vec!["before"]);
    }

    #[test]
    fn timeout_is_honoured_with_background_children() {
        let started = Instant::now();
        let report = run_sh("sleep 8 & echo before; sleep 30", &short_timeout());

        assert!(started.elapsed() < Duration::from_secs(3), "{:?}", started.elapsed());
        assert!(report.timed_out);
        assert_eq!(report.stdout, vec!["before"]);
    }

    #[test]
    fn leftover_children_do_not_hold_up_the_report() {
        let started = Instant::now();
        let report = run_sh("sleep 8 & echo parent; exit 0", &SupervisorConfig::default());

        assert!(started.elapsed() < Duration::from_secs(3), "{:?}", started.elapsed());
        assert_eq!(report.exit_code, Some(0));
        assert_eq!(report.stdout, vec!["parent"]);
    }

    #[test]
    fn serializes_to_json() {
        let report = run_sh("exit 0", &SupervisorConfig::default());
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();

        assert_eq!(json["state"], "exited");
        assert_eq!(json["exit_code"], 0);
        assert!(json["signal"].is_null());
    }

    #[test]
    fn display_summarizes() {
        let report = run_sh("echo x; exit 2", &SupervisorConfig::default());
        let text = report.to_string();

        assert!(text.contains("Exited (code 2)"));
        assert!(text.contains("  | x"));
    }
}
