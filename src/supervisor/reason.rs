//! Process states and stop reasons.

use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;
use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Running,
    Stopped,
    Exited,
    Terminated,
}

impl State {
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Exited | Self::Terminated)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Info {
    Signalled(Signal),
    Return(i32),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StopReason {
    pub state: State,
    pub info: Info,
}

impl StopReason {
    pub fn new(state: State, info: Info) -> Self {
        Self { state, info }
    }

    /// Translate a wait status. `None` means nothing changed.
    pub fn from_wait_status(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(Self::new(State::Exited, Info::Return(code))),
            WaitStatus::Signaled(_, signal, _) => {
                Some(Self::new(State::Terminated, Info::Signalled(signal)))
            }
            WaitStatus::Stopped(_, signal) => {
                Some(Self::new(State::Stopped, Info::Signalled(signal)))
            }
            WaitStatus::Continued(_) => {
                Some(Self::new(State::Running, Info::Signalled(Signal::SIGCONT)))
            }
            WaitStatus::StillAlive => None,
            other => {
                tracing::warn!(status = ?other, "Ignoring unexpected wait status");
                None
            }
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self.info {
            Info::Return(code) if self.state == State::Exited => Some(code),
            _ => None,
        }
    }

    pub fn signal(&self) -> Option<Signal> {
        match self.info {
            Info::Signalled(signal) => Some(signal),
            Info::Return(_) => None,
        }
    }
}
