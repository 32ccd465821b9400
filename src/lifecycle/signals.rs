//! OS signal handling.
//!
//! # Responsibilities
//! - Parse signal names from config and CLI
//! - Register signal handlers
//! - Send a signal to our own process
//! - Turn Ctrl-C into an explicit shutdown
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe); the handler itself only
//!   records delivery, all reactions run on the normal task
//! - Sending goes through a trait so failures can be injected

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::getpid;
use tokio::signal::unix::{Signal as SignalStream, SignalKind};
use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// Parse `SIGUSR1`, `USR1`, `usr1` or a raw number such as `10`.
pub fn parse_signal(name: &str) -> Result<Signal, Errno> {
    let name = name.trim();
    if let Ok(raw) = name.parse::<i32>() {
        return Signal::try_from(raw);
    }

    let upper = name.to_ascii_uppercase();
    if upper.starts_with("SIG") {
        upper.parse()
    } else {
        format!("SIG{}", upper).parse()
    }
}

/// Register a handler for `signal` and return the stream of deliveries.
///
/// Must be called from within a Tokio runtime. Signals that cannot be
/// caught (SIGKILL, SIGSTOP) or that Tokio refuses to manage return an error.
pub fn install_handler(signal: Signal) -> std::io::Result<SignalStream> {
    tokio::signal::unix::signal(SignalKind::from_raw(signal as i32))
}

/// Delivers a signal to the current process.
pub trait SignalSender: Send + Sync {
    fn send(&self, signal: Signal) -> nix::Result<()>;
}

impl<T: SignalSender + ?Sized> SignalSender for Box<T> {
    fn send(&self, signal: Signal) -> nix::Result<()> {
        (**self).send(signal)
    }
}

/// Sends the signal with `kill(getpid(), signal)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelfSignaller;

impl SignalSender for SelfSignaller {
    fn send(&self, signal: Signal) -> nix::Result<()> {
        kill(getpid(), signal)
    }
}

/// Reports success without delivering anything, as if the handler never ran.
#[derive(Debug, Default, Clone, Copy)]
pub struct SuppressedSender;

impl SignalSender for SuppressedSender {
    fn send(&self, signal: Signal) -> nix::Result<()> {
        tracing::warn!(signal = %signal, "Signal delivery suppressed");
        Ok(())
    }
}

/// Always fails with the given errno.
#[derive(Debug, Clone, Copy)]
pub struct FailingSender(pub Errno);

impl Default for FailingSender {
    fn default() -> Self {
        Self(Errno::EPERM)
    }
}

impl SignalSender for FailingSender {
    fn send(&self, _signal: Signal) -> nix::Result<()> {
        Err(self.0)
    }
}

/// Trigger `shutdown` on the first Ctrl-C.
pub fn forward_interrupt(shutdown: &Shutdown) -> JoinHandle<()> {
    let shutdown = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, shutting down");
                shutdown.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Unable to listen for interrupt"),
        }
    })
}
