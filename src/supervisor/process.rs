//! A fixture running as a child process.
//!
//! # Responsibilities
//! - Launch the fixture with its stdout captured line by line
//! - Poll or block (with timeout) for state changes
//! - Stop, continue, signal and kill the fixture
//! - Clean up on drop
//!
//! The fixture leads its own process group, so killing it also kills
//! anything it forked that still holds the stdout pipe.

use std::io::{BufRead, BufReader};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use nix::errno::Errno;
use nix::sys::signal::{kill, killpg, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag};
use nix::unistd::Pid;
use thiserror::Error;

use crate::console::{CapturedConsole, Console};
use crate::supervisor::reason::{State, StopReason};

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to launch {}: {source}", program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to wait on the process: {0}")]
    WaitFailed(#[source] Errno),
    #[error("process has already exited")]
    NotRunning,
    #[error("blocking operation timed out")]
    Timeout,
    #[error("couldn't send {signal} to process: {source}")]
    KillFailed {
        signal: Signal,
        #[source]
        source: Errno,
    },
}

#[derive(Debug)]
pub struct Supervised {
    program: PathBuf,
    args: Vec<String>,
    pid: Pid,
    state: State,
    last: Option<StopReason>,
    stdout: CapturedConsole,
    reader: Option<JoinHandle<()>>,
    terminate_on_drop: bool,
    started: Instant,
}

impl Supervised {
    pub fn launch(
        program: &Path,
        args: &[String],
        terminate_on_drop: bool,
    ) -> Result<Self, SupervisorError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .process_group(0)
            .spawn()
            .map_err(|source| {
                tracing::error!(program = %program.display(), error = %source, "Failed to launch");
                SupervisorError::Launch {
                    program: program.to_path_buf(),
                    source,
                }
            })?;

        let pid = Pid::from_raw(child.id() as i32);
        let stdout = CapturedConsole::new();
        let reader = child
            .stdout
            .take()
            .and_then(|pipe| spawn_reader(pipe, stdout.clone()));
        if reader.is_none() {
            tracing::info!(pid = %pid, "No handle to process stdout");
        }

        tracing::info!(pid = %pid, program = %program.display(), "Fixture launched");

        Ok(Self {
            program: program.to_path_buf(),
            args: args.to_vec(),
            pid,
            state: State::Running,
            last: None,
            stdout,
            reader,
            terminate_on_drop,
            started: Instant::now(),
        })
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Most recent stop reason observed.
    pub fn last_reason(&self) -> Option<StopReason> {
        self.last
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Non-blocking check for a state change.
    pub fn wait_on_signal(&mut self) -> Result<Option<StopReason>, SupervisorError> {
        if self.state.is_closed() {
            return Err(SupervisorError::NotRunning);
        }

        let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
        let status = waitpid(self.pid, Some(flags)).map_err(SupervisorError::WaitFailed)?;

        let reason = StopReason::from_wait_status(status);
        if let Some(reason) = reason {
            tracing::debug!(
                pid = %self.pid,
                state = ?reason.state,
                info = ?reason.info,
                "Process changed state"
            );
            self.state = reason.state;
            self.last = Some(reason);
        }
        Ok(reason)
    }

    /// Poll every `poll` until something changes or `timeout` passes.
    pub fn blocking_wait(
        &mut self,
        timeout: Duration,
        poll: Duration,
    ) -> Result<StopReason, SupervisorError> {
        let waiting = Instant::now();
        loop {
            if let Some(reason) = self.wait_on_signal()? {
                return Ok(reason);
            }
            if waiting.elapsed() >= timeout {
                return Err(SupervisorError::Timeout);
            }
            thread::sleep(poll);
        }
    }

    pub fn signal(&self, signal: Signal) -> Result<(), SupervisorError> {
        if self.state.is_closed() {
            return Err(SupervisorError::NotRunning);
        }
        kill(self.pid, signal).map_err(|source| {
            tracing::error!(
                pid = %self.pid,
                signal = %signal,
                error = %source,
                "Couldn't signal process"
            );
            SupervisorError::KillFailed { signal, source }
        })
    }

    pub fn stop(&self) -> Result<(), SupervisorError> {
        self.signal(Signal::SIGSTOP)
    }

    pub fn resume(&mut self) -> Result<(), SupervisorError> {
        self.signal(Signal::SIGCONT)?;
        self.state = State::Running;
        Ok(())
    }

    /// Kill the process group and reap the leader.
    pub fn terminate(&mut self) -> Result<StopReason, SupervisorError> {
        if self.state.is_closed() {
            return Err(SupervisorError::NotRunning);
        }
        killpg(self.pid, Signal::SIGKILL).map_err(|source| {
            tracing::error!(pgid = %self.pid, error = %source, "Couldn't kill process group");
            SupervisorError::KillFailed {
                signal: Signal::SIGKILL,
                source,
            }
        })?;
        loop {
            let status = match waitpid(self.pid, None) {
                Err(Errno::EINTR) => continue,
                other => other.map_err(SupervisorError::WaitFailed)?,
            };
            if let Some(reason) = StopReason::from_wait_status(status) {
                if reason.state.is_closed() {
                    self.state = reason.state;
                    self.last = Some(reason);
                    return Ok(reason);
                }
            }
        }
    }

    /// Kill whatever is left of the group once the leader has closed.
    ///
    /// Background children keep the stdout pipe open, so this goes before
    /// [`Supervised::finish_output`] when they are not wanted.
    pub fn kill_stragglers(&self) {
        if !self.state.is_closed() {
            return;
        }
        match killpg(self.pid, Signal::SIGKILL) {
            Ok(()) => tracing::info!(pgid = %self.pid, "Killed leftover fixture children"),
            Err(Errno::ESRCH) => {}
            Err(e) => {
                tracing::warn!(pgid = %self.pid, error = %e, "Couldn't kill leftover children")
            }
        }
    }

    /// Lines printed so far. Complete once the process has closed and
    /// [`Supervised::finish_output`] returned.
    pub fn stdout_lines(&self) -> Vec<String> {
        self.stdout.lines()
    }

    /// Wait for the stdout reader to drain the pipe.
    pub fn finish_output(&mut self) {
        if !self.state.is_closed() {
            return;
        }
        if let Some(reader) = self.reader.take() {
            if reader.join().is_err() {
                tracing::warn!(pid = %self.pid, "Stdout reader panicked");
            }
        }
    }
}

impl Drop for Supervised {
    fn drop(&mut self) {
        if self.state.is_closed() {
            return;
        }

        if self.terminate_on_drop {
            if let Err(e) = killpg(self.pid, Signal::SIGKILL) {
                tracing::warn!(error = %e, "Couldn't issue sigkill on teardown");
            }
            if let Err(e) = waitpid(self.pid, None) {
                tracing::warn!(error = %e, "Wait after sigkill failed");
            }
        } else if self.state == State::Stopped {
            if let Err(e) = kill(self.pid, Signal::SIGCONT) {
                tracing::warn!(error = %e, "Couldn't continue process on teardown");
            }
        }
    }
}

fn spawn_reader(pipe: ChildStdout, sink: CapturedConsole) -> Option<JoinHandle<()>> {
    let spawned = thread::Builder::new()
        .name("fixture-stdout".to_string())
        .spawn(move || {
            for line in BufReader::new(pipe).lines() {
                match line {
                    Ok(line) => sink.line(&line),
                    Err(e) => {
                        tracing::warn!(error = %e, "Stopped reading fixture stdout");
                        break;
                    }
                }
            }
        });

    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Couldn't start stdout reader");
            None
        }
    }
}
