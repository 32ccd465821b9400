//! Thread demo subsystem.
//!
//! # Data Flow
//! ```text
//! WorkerConfig (count, sleep)
//!     → ids 0..count, fixed before any launch
//!     → spawner.rs (one OS thread per id, optionally fault-injected)
//!     → each unit: "starting" → sleep → "done"
//!     → demo.rs joins in id order (join barrier)
//!     → "All threads have finished"
//! ```
//!
//! # Design Decisions
//! - Units are real OS threads, never async tasks
//! - Units share nothing but the console; each owns its id
//! - Any creation or join failure is fatal, no retries
//! - No cancellation: a hung unit blocks the join forever

pub mod demo;
pub mod spawner;

pub use demo::{ThreadDemo, ThreadReport, WorkerError, FINISHED_MESSAGE};
pub use spawner::{FaultPlan, FaultySpawner, OsThreads, Spawner};
