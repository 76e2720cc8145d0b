mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::metrics::MetricsArgs;
use commands::waterfall::CalculateArgs;

/// Fund distribution waterfall calculations
#[derive(Parser)]
#[command(
    name = "fwf",
    version,
    about = "Fund distribution waterfall calculations",
    long_about = "Allocates a fund's annual net cash flows between LPs and the GP \
                  under flat and structured (senior / mezzanine / subordinate) \
                  waterfalls, with IRR, DPI and payback metrics in decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate cash flows through a distribution waterfall
    Calculate(CalculateArgs),
    /// Compute IRR, DPI and payback periods only
    Metrics(MetricsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::waterfall::run_calculate(args),
        Commands::Metrics(args) => commands::metrics::run_metrics(args),
        Commands::Version => {
            println!("fwf {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
