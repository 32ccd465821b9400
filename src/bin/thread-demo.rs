use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use clap::Parser;
use fixture_demos::config::load_or_default;
use fixture_demos::console::StdoutConsole;
use fixture_demos::observability::init_logging;
use fixture_demos::workers::{FaultPlan, FaultySpawner, OsThreads, ThreadDemo};
use fixture_demos::EXIT_FAILURE;

#[derive(Parser)]
#[command(name = "thread-demo")]
#[command(
    about = "Launch worker threads that sleep and print, then join them all",
    long_about = None
)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Make creation of this worker fail
    #[arg(long, hide = true)]
    fail_spawn_at: Option<usize>,

    /// Make this worker panic so joining it fails
    #[arg(long, hide = true)]
    panic_worker: Option<usize>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    if let Err(e) = init_logging(&config.observability) {
        eprintln!("warning: logging unavailable: {}", e);
    }

    let plan = FaultPlan {
        fail_spawn_at: cli.fail_spawn_at,
        panic_worker: cli.panic_worker,
    };
    if !plan.is_empty() {
        tracing::warn!(?plan, "Fault injection enabled");
    }

    let demo = ThreadDemo::new(
        config.workers,
        FaultySpawner::new(OsThreads, plan),
        Arc::new(StdoutConsole),
    );

    match demo.run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Thread demo failed");
            eprintln!("error: {}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
