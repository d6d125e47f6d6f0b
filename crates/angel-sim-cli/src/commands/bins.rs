use clap::Args;
use serde_json::Value;

use angel_sim_core::model::{ReturnModel, DEFAULT_LATE_EXIT_PEAK};

/// Arguments for printing the return-model bin table
#[derive(Args)]
pub struct BinsArgs {
    /// Peak year of the top bin's triangular exit sampler (10 to 17)
    #[arg(long)]
    pub late_exit_peak: Option<f64>,
}

pub fn run_bins(args: BinsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let peak = args.late_exit_peak.unwrap_or(DEFAULT_LATE_EXIT_PEAK);
    let model = ReturnModel::wiltbank(peak)?;

    let rows: Vec<Value> = model
        .bins()
        .iter()
        .map(|bin| {
            serde_json::json!({
                "range": format!("[{:.2}, {:.2})", bin.lower, bin.upper),
                "probability": bin.upper - bin.lower,
                "multiplier": serde_json::to_value(bin.multiplier).unwrap_or_default(),
                "exit_years": serde_json::to_value(bin.exit_years).unwrap_or_default(),
            })
        })
        .collect();

    Ok(Value::Array(rows))
}
