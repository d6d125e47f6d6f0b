use clap::Args;
use serde_json::Value;

use angel_sim_core::simulation::{self, AngelSimInput};

use crate::input;

/// Arguments for the Monte Carlo portfolio simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Number of independent portfolio trials
    #[arg(long)]
    pub trials: Option<u32>,

    /// Number of investments in one portfolio
    #[arg(long)]
    pub portfolio_size: Option<u32>,

    /// Years over which the portfolio is deployed
    #[arg(long)]
    pub investment_period: Option<u32>,

    /// Calendar year of the first vintage
    #[arg(long)]
    pub base_year: Option<i32>,

    /// Peak year of the top bin's triangular exit sampler (10 to 17)
    #[arg(long)]
    pub late_exit_peak: Option<f64>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sim_input: AngelSimInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(piped) = input::stdin::read_stdin()? {
        piped
    } else {
        let mut sim_input = AngelSimInput::default();
        if let Some(trials) = args.trials {
            sim_input.trials = trials;
        }
        if let Some(size) = args.portfolio_size {
            sim_input.portfolio_size = size;
        }
        if let Some(period) = args.investment_period {
            sim_input.investment_period_years = period;
        }
        if let Some(year) = args.base_year {
            sim_input.base_year = year;
        }
        if let Some(peak) = args.late_exit_peak {
            sim_input.late_exit_peak = peak;
        }
        sim_input.seed = args.seed;
        sim_input
    };

    let result = simulation::run_simulation(&sim_input)?;
    Ok(serde_json::to_value(result)?)
}
