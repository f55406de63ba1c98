mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::clean::CleanArgs;
use commands::combine::CombineArgs;
use commands::ecl::EclArgs;
use commands::history::HistoryArgs;
use commands::recommend::RecommendArgs;

/// Credit risk analyst toolkit
#[derive(Parser)]
#[command(
    name = "cra",
    version,
    about = "Loan-portfolio cleaning and segment-level Expected Credit Loss analytics",
    long_about = "Clean an uploaded loan portfolio into the canonical schema, aggregate it \
                  into risk segments with PD/LGD/EAD/ECL metrics, recombine ad-hoc segment \
                  selections, keep a per-user result history, and request policy \
                  recommendations from a remote model."
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
    /// Validate and clean a raw loan dataset
    Clean(CleanArgs),
    /// Compute Expected Credit Loss per segment
    Ecl(EclArgs),
    /// Combine aggregated segments into one weighted summary
    Combine(CombineArgs),
    /// Browse the saved aggregation history
    History(HistoryArgs),
    /// Request a policy recommendation for one segment
    Recommend(RecommendArgs),
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
    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Clean(args) => commands::clean::run_clean(args),
        Commands::Ecl(args) => commands::ecl::run_ecl(args),
        Commands::Combine(args) => commands::combine::run_combine(args),
        Commands::History(args) => commands::history::run_history(args),
        Commands::Recommend(args) => commands::recommend::run_recommend(args),
        Commands::Version => {
            println!("cra {}", env!("CARGO_PKG_VERSION"));
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
