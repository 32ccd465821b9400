//! Signal demo subsystem.
//!
//! # Data Flow
//! ```text
//! SignalConfig (name, settle, interval)
//!     → install handler (fatal on failure, nothing else has happened yet)
//!     → sleep settle
//!     → "Sending SIG to self" → SignalSender (fatal on failure)
//!     → wait loop (machine.rs):
//!         handler     → "Received SIG" → HandlerFired
//!         tick        → "Waiting for signal..." → LoopingIndefinitely
//!         shutdown    → Cancelled
//! ```
//!
//! # Design Decisions
//! - The never-ending wait is an explicit phase, not an accidental loop
//! - Leaving that phase needs either the signal or the shutdown channel
//! - The handler has priority over ticks, so a prompt delivery never
//!   prints a waiting line

pub mod demo;
pub mod machine;

pub use demo::{ArmedDemo, SignalDemo, SignalDemoError, SignalOutcome, WAITING_MESSAGE};
pub use machine::{Phase, PhaseEvent, SignalMachine, TransitionError};
