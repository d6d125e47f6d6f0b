mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::bins::BinsArgs;
use commands::simulate::SimulateArgs;

/// Monte Carlo IRR simulation for angel investment portfolios
#[derive(Parser)]
#[command(
    name = "angelsim",
    version,
    about = "Monte Carlo IRR simulation for angel investment portfolios",
    long_about = "Estimates the probability distribution of portfolio IRR for a \
                  basket of early-stage investments, using the Wiltbank power-law \
                  return hypothesis and an XIRR solver over dated cash flows."
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
    /// Run the Monte Carlo portfolio simulation
    Simulate(SimulateArgs),
    /// Print the Wiltbank return-model bin table
    Bins(BinsArgs),
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
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Simulate(args) => commands::simulate::run_simulate(args),
        Commands::Bins(args) => commands::bins::run_bins(args),
        Commands::Version => {
            println!("angelsim {}", env!("CARGO_PKG_VERSION"));
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
