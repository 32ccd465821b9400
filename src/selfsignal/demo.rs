//! The signal demo: install a handler, signal ourselves, wait.

use std::sync::Arc;
use std::time::Duration;
use nix::errno::Errno;
use nix::sys::signal::Signal;
use thiserror::Error;
use tokio::signal::unix::Signal as SignalStream;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{self, Instant};

use crate::config::SignalConfig;
use crate::console::Console;
use crate::lifecycle::signals::{install_handler, parse_signal, SignalSender};
use crate::selfsignal::machine::{PhaseEvent, SignalMachine, TransitionError};

/// Printed once per interval while the handler has not fired.
pub const WAITING_MESSAGE: &str = "Waiting for signal...";

pub fn sending_message(signal: Signal) -> String {
    format!("Sending {} to self", signal.as_str())
}

pub fn received_message(signal: Signal) -> String {
    format!("Received {}", signal.as_str())
}

#[derive(Debug, Error)]
pub enum SignalDemoError {
    #[error("unknown signal {0:?}")]
    UnknownSignal(String),
    #[error("failed to install handler for {signal}: {source}")]
    Install {
        signal: Signal,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to send {signal} to self: {source}")]
    Send {
        signal: Signal,
        #[source]
        source: Errno,
    },
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// How a run that did not fail came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// The handler ran; the program should exit successfully right away.
    HandlerFired,
    /// The shutdown channel fired first.
    Cancelled { waiting_ticks: u64 },
}

pub struct SignalDemo<S> {
    signal: Signal,
    settle: Duration,
    wait_interval: Duration,
    sender: S,
    console: Arc<dyn Console>,
}

impl<S: SignalSender> SignalDemo<S> {
    pub fn new(
        config: &SignalConfig,
        sender: S,
        console: Arc<dyn Console>,
    ) -> Result<Self, SignalDemoError> {
        let signal = parse_signal(&config.name)
            .map_err(|_| SignalDemoError::UnknownSignal(config.name.clone()))?;

        Ok(Self {
            signal,
            settle: Duration::from_millis(config.settle_ms),
            wait_interval: Duration::from_millis(config.wait_interval_ms),
            sender,
            console,
        })
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    /// Register the handler. Nothing is printed, slept or sent before this.
    pub fn install(self) -> Result<ArmedDemo<S>, SignalDemoError> {
        let signal = self.signal;
        let deliveries = install_handler(signal).map_err(|source| {
            tracing::error!(signal = %signal, error = %source, "Handler registration failed");
            SignalDemoError::Install { signal, source }
        })?;
        tracing::info!(signal = %signal, "Handler installed");

        Ok(ArmedDemo {
            demo: self,
            deliveries,
        })
    }

    /// Install the handler, then run until it fires, the send fails, or
    /// `shutdown` fires.
    pub async fn run(
        self,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<SignalOutcome, SignalDemoError> {
        self.install()?.run(shutdown).await
    }
}

/// A demo whose handler is in place.
pub struct ArmedDemo<S> {
    demo: SignalDemo<S>,
    deliveries: SignalStream,
}

impl<S: SignalSender> ArmedDemo<S> {
    pub fn signal(&self) -> Signal {
        self.demo.signal
    }

    /// Run until the handler fires, the send fails, or `shutdown` fires.
    ///
    /// Without a shutdown and without delivery this never returns.
    pub async fn run(
        self,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<SignalOutcome, SignalDemoError> {
        let ArmedDemo { demo, mut deliveries } = self;
        let signal = demo.signal;
        let mut machine = SignalMachine::new();

        tokio::select! {
            _ = time::sleep(demo.settle) => {}
            _ = shutdown_requested(&mut shutdown) => {
                machine.apply(PhaseEvent::ShutdownRequested)?;
                return Ok(SignalOutcome::Cancelled { waiting_ticks: 0 });
            }
        }

        demo.console.line(&sending_message(signal));
        demo.sender.send(signal).map_err(|source| {
            tracing::error!(signal = %signal, error = %source, "Signal send failed");
            SignalDemoError::Send { signal, source }
        })?;

        let mut ticker = time::interval_at(Instant::now() + demo.wait_interval, demo.wait_interval);
        let mut listening = true;

        loop {
            tokio::select! {
                biased;

                delivered = deliveries.recv(), if listening => {
                    if delivered.is_some() {
                        machine.apply(PhaseEvent::HandlerInvoked)?;
                        demo.console.line(&received_message(signal));
                        return Ok(SignalOutcome::HandlerFired);
                    }
                    tracing::error!(
                        signal = %signal,
                        "Signal stream closed, handler can no longer fire"
                    );
                    listening = false;
                }
                _ = shutdown_requested(&mut shutdown) => {
                    machine.apply(PhaseEvent::ShutdownRequested)?;
                    tracing::info!(ticks = machine.ticks(), "Wait loop cancelled");
                    return Ok(SignalOutcome::Cancelled { waiting_ticks: machine.ticks() });
                }
                _ = ticker.tick() => {
                    machine.apply(PhaseEvent::WaitTick)?;
                    demo.console.line(WAITING_MESSAGE);
                }
            }
        }
    }
}

/// Resolves when shutdown is triggered; never resolves once every sender is gone.
async fn shutdown_requested(rx: &mut broadcast::Receiver<()>) {
    if let Err(RecvError::Closed) = rx.recv().await {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::CapturedConsole;
    use crate::lifecycle::{FailingSender, SelfSignaller, Shutdown, SuppressedSender};
    use nix::sys::signal::kill;
    use nix::unistd::getpid;
    use serial_test::serial;

    fn config(name: &str, settle_ms: u64, wait_interval_ms: u64) -> SignalConfig {
        SignalConfig {
            name: name.to_string(),
            settle_ms,
            wait_interval_ms,
        }
    }

    #[tokio::test]
    #[serial]
    async fn handler_fires_once_and_loop_never_prints() {
        let console = CapturedConsole::new();
        let demo = SignalDemo::new(
            &config("SIGUSR1", 10, 500),
            SelfSignaller,
            Arc::new(console.clone()),
        )
        .unwrap();
        let shutdown = Shutdown::new();

        let outcome = demo.run(shutdown.subscribe()).await.unwrap();

        assert_eq!(outcome, SignalOutcome::HandlerFired);
        assert_eq!(console.lines(), vec!["Sending SIGUSR1 to self", "Received SIGUSR1"]);
    }

    #[tokio::test]
    #[serial]
    async fn send_failure_skips_the_wait_loop() {
        let console = CapturedConsole::new();
        let demo = SignalDemo::new(
            &config("SIGUSR1", 10, 10),
            FailingSender(Errno::EPERM),
            Arc::new(console.clone()),
        )
        .unwrap();
        let shutdown = Shutdown::new();

        let err = demo.run(shutdown.subscribe()).await.unwrap_err();

        assert!(matches!(
            err,
            SignalDemoError::Send { signal: Signal::SIGUSR1, source: Errno::EPERM }
        ));
        assert_eq!(console.lines(), vec!["Sending SIGUSR1 to self"]);
    }

    #[tokio::test]
    async fn install_failure_happens_before_sleep_and_send() {
        let console = CapturedConsole::new();
        let demo = SignalDemo::new(
            &config("SIGKILL", 5_000, 10),
            SelfSignaller,
            Arc::new(console.clone()),
        )
        .unwrap();
        let shutdown = Shutdown::new();

        let started = std::time::Instant::now();
        let err = demo.run(shutdown.subscribe()).await.unwrap_err();

        assert!(matches!(err, SignalDemoError::Install { signal: Signal::SIGKILL, .. }));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(console.lines().is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn missing_handler_loops_until_shutdown() {
        let console = CapturedConsole::new();
        let demo = SignalDemo::new(
            &config("SIGUSR2", 0, 20),
            SuppressedSender,
            Arc::new(console.clone()),
        )
        .unwrap();
        let shutdown = Shutdown::new();

        let trigger = shutdown.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(150)).await;
            trigger.trigger();
        });

        let outcome = demo.run(shutdown.subscribe()).await.unwrap();

        let SignalOutcome::Cancelled { waiting_ticks } = outcome else {
            panic!("expected cancellation, got {outcome:?}");
        };
        let lines = console.lines();
        assert!(waiting_ticks >= 2, "only {waiting_ticks} ticks");
        assert_eq!(lines[0], "Sending SIGUSR2 to self");
        assert_eq!(lines.len() as u64, waiting_ticks + 1);
        assert!(lines[1..].iter().all(|l| l == WAITING_MESSAGE));
    }

    #[tokio::test]
    #[serial]
    async fn late_delivery_ends_the_loop() {
        let console = CapturedConsole::new();
        let demo = SignalDemo::new(
            &config("SIGUSR2", 0, 20),
            SuppressedSender,
            Arc::new(console.clone()),
        )
        .unwrap();
        let shutdown = Shutdown::new();

        tokio::spawn(async {
            time::sleep(Duration::from_millis(90)).await;
            kill(getpid(), Signal::SIGUSR2).unwrap();
        });

        let outcome = demo.run(shutdown.subscribe()).await.unwrap();

        assert_eq!(outcome, SignalOutcome::HandlerFired);
        let lines = console.lines();
        assert!(console.count_prefixed(WAITING_MESSAGE) >= 1);
        assert_eq!(lines.last().map(String::as_str), Some("Received SIGUSR2"));
    }

    #[tokio::test]
    #[serial]
    async fn delivery_between_install_and_run_is_kept() {
        let console = CapturedConsole::new();
        let demo = SignalDemo::new(
            &config("SIGUSR2", 0, 500),
            SuppressedSender,
            Arc::new(console.clone()),
        )
        .unwrap();
        let shutdown = Shutdown::new();

        let armed = demo.install().unwrap();
        kill(getpid(), Signal::SIGUSR2).unwrap();
        let outcome = armed.run(shutdown.subscribe()).await.unwrap();

        assert_eq!(outcome, SignalOutcome::HandlerFired);
        assert_eq!(console.lines(), vec!["Sending SIGUSR2 to self", "Received SIGUSR2"]);
    }

    #[tokio::test]
    async fn shutdown_during_settle_cancels_before_sending() {
        let console = CapturedConsole::new();
        let demo = SignalDemo::new(
            &config("SIGUSR2", 5_000, 20),
            FailingSender::default(),
            Arc::new(console.clone()),
        )
        .unwrap();
        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();
        shutdown.trigger();

        let outcome = demo.run(rx).await.unwrap();

        assert_eq!(outcome, SignalOutcome::Cancelled { waiting_ticks: 0 });
        assert!(console.lines().is_empty());
    }

    #[test]
    fn unknown_signal_is_rejected_up_front() {
        let console = Arc::new(CapturedConsole::new());
        let err = SignalDemo::new(&config("SIGNOPE", 0, 1), SelfSignaller, console)
            .err()
            .unwrap();
        assert!(matches!(err, SignalDemoError::UnknownSignal(name) if name == "SIGNOPE"));
    }
}
