mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::allocation::AllocationArgs;
use commands::benchmarks::BenchmarksArgs;
use commands::report::ReportArgs;

/// Risk/return analytics for multi-asset allocations
#[derive(Parser)]
#[command(
    name = "alloc",
    version,
    about = "Risk/return analytics for multi-asset allocations",
    long_about = "Evaluates target allocation profiles against a table of base-100 \
                  price indices: annualised return and volatility, maximum drawdown, \
                  risk contribution by asset class and blended benchmarks. \
                  Weights are percentages and are not rescaled to sum to 100."
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
    /// Evaluate weight profiles against a price table
    Report(ReportArgs),
    /// Show which columns resolve to the benchmark roles
    Benchmarks(BenchmarksArgs),
    /// Sum profile weights per asset class
    Allocation(AllocationArgs),
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
    // Diagnostics go to stderr so stdout stays parseable.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }

    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Report(args) => commands::report::run_report(args),
        Commands::Benchmarks(args) => commands::benchmarks::run_benchmarks(args),
        Commands::Allocation(args) => commands::allocation::run_allocation(args),
        Commands::Version => {
            println!("alloc {}", env!("CARGO_PKG_VERSION"));
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
