mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::controls::ControlsArgs;
use commands::deck::DeckArgs;
use commands::scenario::ScenarioArgs;
use commands::sensitivity::SensitivityArgs;
use output::OutputFormat;

/// Fund scenario model: leveraged real estate plus structural-long sleeve
#[derive(Parser)]
#[command(
    name = "fundm",
    version,
    about = "Fund scenario model for the investor deck",
    long_about = "Runs the 10-year fund scenario model with decimal precision: NAV \
                  trajectory, debt-service coverage, fee and carry waterfall, IRR/MOIC, \
                  stress metrics and sensitivity sweeps."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scenario and report NAV, returns, carry and stress metrics
    Scenario(ScenarioArgs),
    /// Sweep property value or a control and tabulate the results
    Sensitivity(SensitivityArgs),
    /// List the scenario sliders and their declared bounds
    Controls(ControlsArgs),
    /// Build the formatted slide bundle (chart series, cards, detail)
    Deck(DeckArgs),
    /// Print version information
    Version,
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Scenario(args) => commands::scenario::run_scenario(args),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args),
        Commands::Controls(args) => commands::controls::run_controls(args),
        Commands::Deck(args) => commands::deck::run_deck(args),
        Commands::Version => {
            println!("fundm {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            cli.output.write(&value);
            process::exit(0);
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
