//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → every subscribed wait loop ends with Cancelled
//!
//! Signals (signals.rs):
//!     config name → Signal → handler stream (Tokio)
//!     SignalSender → kill(getpid(), sig)
//!     Ctrl-C → Shutdown::trigger
//! ```
//!
//! # Design Decisions
//! - Cancellation is an explicit channel, never a signal side effect
//! - Handler registration happens before any other work

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::{FailingSender, SelfSignaller, SignalSender, SuppressedSender};
