//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events on stderr)
//!
//! Consumers:
//!     → a terminal, or whoever captures the fixture's stderr
//! ```
//!
//! # Design Decisions
//! - Structured logging, optionally JSON, for machine parsing
//! - stdout belongs to the fixtures; nothing here ever writes to it

pub mod logging;

pub use logging::init_logging;
