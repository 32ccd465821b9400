use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use clap::Parser;
use fixture_demos::config::load_or_default;
use fixture_demos::config::validation::validate_config;
use fixture_demos::console::StdoutConsole;
use fixture_demos::lifecycle::signals::forward_interrupt;
use fixture_demos::lifecycle::{
    FailingSender, SelfSignaller, Shutdown, SignalSender, SuppressedSender,
};
use fixture_demos::observability::init_logging;
use fixture_demos::selfsignal::{SignalDemo, SignalOutcome};
use fixture_demos::{EXIT_CANCELLED, EXIT_FAILURE};

#[derive(Parser)]
#[command(name = "signal-demo")]
#[command(
    about = "Install a signal handler, send the signal to ourselves, and wait",
    long_about = None
)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Signal to use instead of the configured one (e.g. SIGUSR2)
    #[arg(short, long)]
    signal: Option<String>,

    /// Pretend to send the signal without delivering it
    #[arg(long, hide = true, conflicts_with = "fail_send")]
    suppress_send: bool,

    /// Make sending the signal fail
    #[arg(long, hide = true)]
    fail_send: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    if let Some(name) = cli.signal {
        config.signal.name = name;
    }
    if let Err(errors) = validate_config(&config) {
        for e in errors {
            eprintln!("error: {}", e);
        }
        return ExitCode::from(EXIT_FAILURE);
    }

    let sender: Box<dyn SignalSender> = if cli.fail_send {
        Box::new(FailingSender::default())
    } else if cli.suppress_send {
        Box::new(SuppressedSender)
    } else {
        Box::new(SelfSignaller)
    };

    // The handler goes in as soon as the signal is known, ahead of logging
    // and the Ctrl-C forwarder.
    let armed = match SignalDemo::new(&config.signal, sender, Arc::new(StdoutConsole))
        .and_then(SignalDemo::install)
    {
        Ok(armed) => armed,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    if let Err(e) = init_logging(&config.observability) {
        eprintln!("warning: logging unavailable: {}", e);
    }

    let shutdown = Shutdown::new();
    let _interrupts = forward_interrupt(&shutdown);

    match armed.run(shutdown.subscribe()).await {
        Ok(SignalOutcome::HandlerFired) => ExitCode::SUCCESS,
        Ok(SignalOutcome::Cancelled { waiting_ticks }) => {
            tracing::info!(waiting_ticks, "Signal demo cancelled");
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(e) => {
            tracing::error!(error = %e, "Signal demo failed");
            eprintln!("error: {}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
