//! Thread and signal fixture programs, plus a supervisor to run them.
//!
//! # Architecture Overview
//!
//! ```text
//!   thread-demo ──▶ workers ──▶ OS threads ──┐
//!                                            ├──▶ console (stdout)
//!   signal-demo ──▶ selfsignal ──▶ lifecycle ┘
//!                     (phases)     (handler, kill, shutdown)
//!
//!   fixture-run ──▶ supervisor ──▶ child process ──▶ RunReport
//!
//!   Cross-cutting: config (TOML + defaults), observability (tracing → stderr)
//! ```

pub mod config;
pub mod console;
pub mod lifecycle;
pub mod observability;
pub mod selfsignal;
pub mod supervisor;
pub mod workers;

pub use config::DemoConfig;
pub use lifecycle::Shutdown;

/// Exit status for any fatal error.
pub const EXIT_FAILURE: u8 = 1;

/// Exit status when a wait was cancelled through the shutdown channel.
pub const EXIT_CANCELLED: u8 = 130;
