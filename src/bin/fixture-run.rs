use std::path::PathBuf;
use std::process::ExitCode;
use clap::Parser;
use fixture_demos::config::load_or_default;
use fixture_demos::config::validation::validate_config;
use fixture_demos::observability::init_logging;
use fixture_demos::supervisor::run_to_completion;
use fixture_demos::EXIT_FAILURE;

#[derive(Parser)]
#[command(name = "fixture-run")]
#[command(
    about = "Run a fixture program, wait for it to end and report how it ended",
    long_about = None
)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Kill the fixture after this many seconds
    #[arg(short, long)]
    timeout_secs: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Fixture executable
    program: PathBuf,

    /// Arguments passed to the fixture
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    if let Some(timeout) = cli.timeout_secs {
        config.supervisor.timeout_secs = timeout;
    }
    if let Err(errors) = validate_config(&config) {
        for e in errors {
            eprintln!("error: {}", e);
        }
        return ExitCode::from(EXIT_FAILURE);
    }

    if let Err(e) = init_logging(&config.observability) {
        eprintln!("warning: logging unavailable: {}", e);
    }

    let report = match run_to_completion(&cli.program, &cli.args, &config.supervisor) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Supervised run failed");
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::from(EXIT_FAILURE);
            }
        }
    } else {
        print!("{}", report);
    }

    ExitCode::SUCCESS
}
