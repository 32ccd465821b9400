//! Line-oriented output for the fixtures.
//!
//! Every call to [`Console::line`] emits one complete line; concurrent
//! callers never interleave within a line.

use std::io::Write;
use std::sync::{Arc, Mutex};

/// Sink for the text a fixture prints.
pub trait Console: Send + Sync {
    /// Emit one line (without the trailing newline).
    fn line(&self, text: &str);
}

/// Writes each line to stdout and flushes it immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn line(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{}", text).and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "Failed to write to stdout");
        }
    }
}

/// Records lines in memory.
#[derive(Debug, Default, Clone)]
pub struct CapturedConsole {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CapturedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything printed so far, in print order.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of lines that start with `prefix`.
    pub fn count_prefixed(&self, prefix: &str) -> usize {
        self.lines()
            .iter()
            .filter(|line| line.starts_with(prefix))
            .count()
    }
}

impl Console for CapturedConsole {
    fn line(&self, text: &str) {
        // A worker that panicked mid-run must not hide later output.
        let mut lines = match self.lines.lock() {
            Ok(lines) => lines,
            Err(poisoned) => poisoned.into_inner(),
        };
        lines.push(text.to_string());
    }
}
