use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::AngelSimError;
use crate::investment::generate_investment;
use crate::model::{ReturnModel, DEFAULT_LATE_EXIT_PEAK};
use crate::time_value::{xirr, DEFAULT_IRR_GUESS};
use crate::types::{with_metadata, ComputationOutput, Transaction};
use crate::AngelSimResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Top-level input for the angel portfolio simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AngelSimInput {
    /// Number of independent portfolio trials.
    #[serde(default = "default_trials")]
    pub trials: u32,
    /// Number of investments in one portfolio.
    #[serde(default = "default_portfolio_size")]
    pub portfolio_size: u32,
    /// Years over which the portfolio is deployed; bets are spread evenly,
    /// so `portfolio_size` must divide by this.
    #[serde(default = "default_investment_period")]
    pub investment_period_years: u32,
    /// Calendar year of the first vintage.
    #[serde(default = "default_base_year")]
    pub base_year: i32,
    /// Peak of the top bin's triangular exit sampler (calibration constant).
    #[serde(default = "default_late_exit_peak")]
    pub late_exit_peak: f64,
    /// Optional seed for reproducibility.
    pub seed: Option<u64>,
}

fn default_trials() -> u32 {
    10_000
}

fn default_portfolio_size() -> u32 {
    20
}

fn default_investment_period() -> u32 {
    5
}

fn default_base_year() -> i32 {
    2016
}

fn default_late_exit_peak() -> f64 {
    DEFAULT_LATE_EXIT_PEAK
}

impl Default for AngelSimInput {
    fn default() -> Self {
        AngelSimInput {
            trials: default_trials(),
            portfolio_size: default_portfolio_size(),
            investment_period_years: default_investment_period(),
            base_year: default_base_year(),
            late_exit_peak: default_late_exit_peak(),
            seed: None,
        }
    }
}

/// Outcome of one Monte Carlo trial. The sentinel substitution for a
/// non-converged IRR is explicit here rather than hidden in an exception
/// handler: `irr_pct` is `0.0` whenever `converged` is false.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Portfolio IRR as a percentage, rounded to 3 decimals.
    pub irr_pct: f64,
    pub converged: bool,
}

/// Probability of each named outcome range, in rounded integer percent.
///
/// Buckets are half-open (`loss < 0 <= low < 20 <= mid < 80 <= high`), so
/// every trial lands in exactly one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BucketProbabilities {
    pub loss: f64,
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

/// A single histogram bin, 1 percentage point wide on integer edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u32,
    pub frequency: f64,
}

/// Aggregated simulation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AngelSimOutput {
    pub trials: u32,
    /// Trials where the IRR solver did not converge (recorded as 0.0%).
    pub failed_trials: u32,
    /// Batch mean of per-trial IRR percentages.
    pub mean_irr_pct: f64,
    /// Sample standard deviation (n-1) around the batch mean.
    pub std_dev_pct: f64,
    pub buckets: BucketProbabilities,
    pub histogram: Vec<HistogramBin>,
    /// One-line human-readable digest of mean, spread, and buckets.
    pub summary: String,
    /// Raw per-trial IRR percentages, in trial order.
    pub irrs_pct: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Portfolio simulation
// ---------------------------------------------------------------------------

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Simulate one portfolio: spread the bets evenly across the investment
/// period, merge all cash flows, and solve for the portfolio IRR.
///
/// A `ConvergenceFailure` from the solver is recovered here with the `0.0`
/// sentinel; any other error aborts the batch.
pub fn simulate_portfolio(
    model: &ReturnModel,
    input: &AngelSimInput,
    rng: &mut StdRng,
) -> AngelSimResult<TrialResult> {
    let bets_per_year = input.portfolio_size / input.investment_period_years;
    let mut flows: Vec<Transaction> = Vec::with_capacity(input.portfolio_size as usize * 2);

    for year in 0..input.investment_period_years {
        for _ in 0..bets_per_year {
            flows.extend(generate_investment(model, input.base_year, year, rng)?);
        }
    }

    match xirr(&flows, DEFAULT_IRR_GUESS) {
        Ok(rate) => Ok(TrialResult {
            irr_pct: round3(100.0 * rate),
            converged: true,
        }),
        Err(e) if e.is_convergence_failure() => Ok(TrialResult {
            irr_pct: 0.0,
            converged: false,
        }),
        Err(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// Aggregation helpers
// ---------------------------------------------------------------------------

fn bucket_probabilities(irrs: &[f64]) -> BucketProbabilities {
    let n = irrs.len() as f64;
    let pct = |count: usize| (100.0 * count as f64 / n).round();
    BucketProbabilities {
        loss: pct(irrs.iter().filter(|&&r| r < 0.0).count()),
        low: pct(irrs.iter().filter(|&&r| (0.0..20.0).contains(&r)).count()),
        mid: pct(irrs.iter().filter(|&&r| (20.0..80.0).contains(&r)).count()),
        high: pct(irrs.iter().filter(|&&r| r >= 80.0).count()),
    }
}

/// Build a histogram with 1-percentage-point bins on integer edges.
fn build_histogram(irrs: &[f64]) -> Vec<HistogramBin> {
    let min_val = irrs.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_val = irrs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let first_edge = min_val.floor();
    let num_bins = ((max_val - first_edge).floor() as usize).max(0) + 1;
    let n = irrs.len() as f64;

    let mut bins: Vec<HistogramBin> = (0..num_bins)
        .map(|i| HistogramBin {
            lower: first_edge + i as f64,
            upper: first_edge + (i + 1) as f64,
            count: 0,
            frequency: 0.0,
        })
        .collect();

    for &val in irrs {
        let mut idx = (val - first_edge).floor() as usize;
        if idx >= num_bins {
            idx = num_bins - 1;
        }
        bins[idx].count += 1;
    }

    for bin in &mut bins {
        bin.frequency = bin.count as f64 / n;
    }

    bins
}

/// Decorrelate per-trial RNG streams from one master seed.
fn trial_seed(master: u64, trial: u32) -> u64 {
    master.wrapping_add((trial as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

// ---------------------------------------------------------------------------
// Public API: Monte Carlo driver
// ---------------------------------------------------------------------------

fn validate(input: &AngelSimInput) -> AngelSimResult<()> {
    if input.trials == 0 {
        return Err(AngelSimError::InvalidInput {
            field: "trials".into(),
            reason: "Must be at least 1".into(),
        });
    }
    if input.portfolio_size == 0 {
        return Err(AngelSimError::InvalidInput {
            field: "portfolio_size".into(),
            reason: "Must be at least 1".into(),
        });
    }
    if input.investment_period_years == 0 {
        return Err(AngelSimError::InvalidInput {
            field: "investment_period_years".into(),
            reason: "Must be at least 1".into(),
        });
    }
    if !(1900..=2200).contains(&input.base_year) {
        return Err(AngelSimError::InvalidInput {
            field: "base_year".into(),
            reason: format!("must lie within [1900, 2200], got {}", input.base_year),
        });
    }
    if input.portfolio_size % input.investment_period_years != 0 {
        return Err(AngelSimError::InvalidInput {
            field: "portfolio_size".into(),
            reason: format!(
                "{} is not divisible by investment_period_years ({})",
                input.portfolio_size, input.investment_period_years
            ),
        });
    }
    Ok(())
}

/// Run the full Monte Carlo simulation.
///
/// Trials are statistically independent and run in parallel; each gets its
/// own RNG stream derived from the master seed, so a fixed `seed` produces
/// an identical `irrs_pct` sequence regardless of scheduling.
pub fn run_simulation(
    input: &AngelSimInput,
) -> AngelSimResult<ComputationOutput<AngelSimOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate(input)?;
    let model = ReturnModel::wiltbank(input.late_exit_peak)?;

    let master_seed = input.seed.unwrap_or_else(rand::random);

    let results: Vec<TrialResult> = (0..input.trials)
        .into_par_iter()
        .map(|trial| {
            let mut rng = StdRng::seed_from_u64(trial_seed(master_seed, trial));
            simulate_portfolio(&model, input, &mut rng)
        })
        .collect::<AngelSimResult<Vec<_>>>()?;

    let failed_trials = results.iter().filter(|t| !t.converged).count() as u32;
    if failed_trials > 0 {
        warnings.push(format!(
            "{failed_trials} of {} trials did not converge; recorded as 0.0%",
            input.trials
        ));
    }

    let irrs_pct: Vec<f64> = results.iter().map(|t| t.irr_pct).collect();
    let n = irrs_pct.len() as f64;

    let mean_irr_pct = irrs_pct.iter().sum::<f64>() / n;
    let std_dev_pct = if irrs_pct.len() > 1 {
        (irrs_pct
            .iter()
            .map(|r| (r - mean_irr_pct).powi(2))
            .sum::<f64>()
            / (n - 1.0))
            .sqrt()
    } else {
        0.0
    };

    let buckets = bucket_probabilities(&irrs_pct);
    let histogram = build_histogram(&irrs_pct);

    let summary = format!(
        "Mean: {:.1}% StDev: {:.1} | IRR [<0% = {}%] [0-20% = {}%] [20-80% = {}%] [>80% = {}%]",
        mean_irr_pct, std_dev_pct, buckets.loss, buckets.low, buckets.mid, buckets.high
    );

    let output = AngelSimOutput {
        trials: input.trials,
        failed_trials,
        mean_irr_pct,
        std_dev_pct,
        buckets,
        histogram,
        summary,
        irrs_pct,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Angel Portfolio Monte Carlo (Wiltbank power-law hypothesis)",
        &serde_json::json!({
            "trials": input.trials,
            "portfolio_size": input.portfolio_size,
            "investment_period_years": input.investment_period_years,
            "base_year": input.base_year,
            "late_exit_peak": input.late_exit_peak,
            "seed": input.seed,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
