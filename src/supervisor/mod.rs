//! Fixture supervisor subsystem.
//!
//! # Data Flow
//! ```text
//! program + args
//!     → process.rs (spawn, stdout reader thread)
//!     → waitpid polling → reason.rs (State, Info, StopReason)
//!     → report.rs (run to completion or timeout → RunReport)
//! ```
//!
//! # Design Decisions
//! - Polling wait with an explicit timeout; a hung fixture never hangs us
//! - Stopped/continued children are observed, not treated as exits
//! - Dropping a supervised fixture kills it unless told otherwise

pub mod process;
pub mod reason;
pub mod report;

pub use process::{Supervised, SupervisorError};
pub use reason::{Info, State, StopReason};
pub use report::{run_to_completion, RunReport};
