//! Signal demo state machine.
//!
//! # States
//! - WaitingToSignal: handler installed, signal sent or about to be sent
//! - LoopingIndefinitely: the handler did not fire within one wait interval
//! - HandlerFired: terminal, the program exits with success
//! - Cancelled: terminal, an explicit shutdown ended the wait
//!
//! # State Transitions
//! ```text
//! WaitingToSignal     → HandlerFired:        handler invoked
//! WaitingToSignal     → LoopingIndefinitely: wait tick
//! LoopingIndefinitely → LoopingIndefinitely: wait tick
//! LoopingIndefinitely → HandlerFired:        handler invoked (late delivery)
//! any non-terminal    → Cancelled:           shutdown requested
//! ```

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WaitingToSignal,
    LoopingIndefinitely,
    HandlerFired,
    Cancelled,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::HandlerFired | Self::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    HandlerInvoked,
    WaitTick,
    ShutdownRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("event {event:?} is not valid in phase {phase:?}")]
pub struct TransitionError {
    pub phase: Phase,
    pub event: PhaseEvent,
}

#[derive(Debug)]
pub struct SignalMachine {
    phase: Phase,
    ticks: u64,
}

impl SignalMachine {
    pub fn new() -> Self {
        Self {
            phase: Phase::WaitingToSignal,
            ticks: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Waiting ticks seen so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn apply(&mut self, event: PhaseEvent) -> Result<Phase, TransitionError> {
        let next = match (self.phase, event) {
            (phase, _) if phase.is_terminal() => None,
            (_, PhaseEvent::HandlerInvoked) => Some(Phase::HandlerFired),
            (_, PhaseEvent::ShutdownRequested) => Some(Phase::Cancelled),
            (_, PhaseEvent::WaitTick) => {
                self.ticks += 1;
                Some(Phase::LoopingIndefinitely)
            }
        };

        let next = next.ok_or(TransitionError {
            phase: self.phase,
            event,
        })?;

        if next != self.phase {
            tracing::debug!(from = ?self.phase, to = ?next, "Signal demo phase change");
        }
        self.phase = next;
        Ok(next)
    }
}

impl Default for SignalMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_fires_directly() {
        let mut machine = SignalMachine::new();
        assert_eq!(machine.apply(PhaseEvent::HandlerInvoked), Ok(Phase::HandlerFired));
        assert_eq!(machine.ticks(), 0);
    }

    #[test]
    fn ticks_move_into_looping_and_stay() {
        let mut machine = SignalMachine::new();
        assert_eq!(machine.apply(PhaseEvent::WaitTick), Ok(Phase::LoopingIndefinitely));
        assert_eq!(machine.apply(PhaseEvent::WaitTick), Ok(Phase::LoopingIndefinitely));
        assert_eq!(machine.ticks(), 2);
        assert_eq!(machine.apply(PhaseEvent::HandlerInvoked), Ok(Phase::HandlerFired));
    }

    #[test]
    fn shutdown_cancels_from_any_open_phase() {
        let mut waiting = SignalMachine::new();
        assert_eq!(waiting.apply(PhaseEvent::ShutdownRequested), Ok(Phase::Cancelled));

        let mut looping = SignalMachine::new();
        looping.apply(PhaseEvent::WaitTick).unwrap();
        assert_eq!(looping.apply(PhaseEvent::ShutdownRequested), Ok(Phase::Cancelled));
    }

    #[test]
    fn terminal_phases_reject_events() {
        let mut machine = SignalMachine::new();
        machine.apply(PhaseEvent::HandlerInvoked).unwrap();

        let err = machine.apply(PhaseEvent::WaitTick).unwrap_err();
        assert_eq!(err.phase, Phase::HandlerFired);
        assert_eq!(err.event, PhaseEvent::WaitTick);
        assert_eq!(machine.ticks(), 0);

        let mut cancelled = SignalMachine::new();
        cancelled.apply(PhaseEvent::ShutdownRequested).unwrap();
        assert!(cancelled.apply(PhaseEvent::HandlerInvoked).is_err());
        assert_eq!(cancelled.phase(), Phase::Cancelled);
    }
}
