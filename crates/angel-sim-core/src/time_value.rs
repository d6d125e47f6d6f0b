use crate::error::AngelSimError;
use crate::types::Transaction;
use crate::AngelSimResult;

const CONVERGENCE_THRESHOLD: f64 = 1e-7;
const MAX_IRR_ITERATIONS: u32 = 100;
const DAYS_PER_YEAR: f64 = 365.0;

/// Default starting guess for portfolio IRR. Angel portfolios are loss-heavy,
/// so starting below zero converges faster than the textbook +0.1.
pub const DEFAULT_IRR_GUESS: f64 = -0.1;

/// Net present value of dated cash flows at annualized rate `rate`,
/// discounting by actual day count from the earliest transaction.
pub fn npv_dated(rate: f64, flows: &[Transaction]) -> f64 {
    let Some(epoch) = flows.iter().map(|t| t.date).min() else {
        return 0.0;
    };
    flows
        .iter()
        .map(|t| {
            let years = (t.date - epoch).num_days() as f64 / DAYS_PER_YEAR;
            t.amount / (1.0 + rate).powf(years)
        })
        .sum()
}

/// Extended IRR over irregularly dated cash flows using Newton-Raphson.
///
/// Finds `r` with `Σ amount_i / (1+r)^(days_i/365) = 0`. Flows need not be
/// sorted; the discount epoch is the earliest date, so ordering never
/// affects the result. Fails with `ConvergenceFailure` when the flows have
/// no sign change (an all-loss portfolio has no positive flow), when the
/// derivative vanishes, or when the iteration cap is hit. Callers are
/// expected to treat that failure as recoverable.
///
/// The iteration clamps the rate to `[-0.99, 100.0]` to contain divergent
/// Newton steps, so a true IRR above 10,000% (conceivable only for tiny
/// single-bet flows) is reported as a `ConvergenceFailure`, not found.
pub fn xirr(flows: &[Transaction], guess: f64) -> AngelSimResult<f64> {
    if flows.len() < 2 {
        return Err(AngelSimError::InsufficientData(
            "XIRR requires at least 2 cash flows".into(),
        ));
    }

    let has_outflow = flows.iter().any(|t| t.amount < 0.0);
    let has_inflow = flows.iter().any(|t| t.amount > 0.0);
    if !has_outflow || !has_inflow {
        return Err(AngelSimError::ConvergenceFailure {
            function: "XIRR".into(),
            iterations: 0,
            last_delta: flows.iter().map(|t| t.amount).sum(),
        });
    }

    // min() is Some here: len >= 2
    let epoch = flows.iter().map(|t| t.date).min().unwrap_or(flows[0].date);
    let mut rate = guess;

    for i in 0..MAX_IRR_ITERATIONS {
        let mut npv_val = 0.0_f64;
        let mut dnpv = 0.0_f64;
        let one_plus_r = 1.0 + rate;

        if one_plus_r <= 0.0 {
            return Err(AngelSimError::ConvergenceFailure {
                function: "XIRR".into(),
                iterations: i,
                last_delta: npv_val,
            });
        }

        for t in flows {
            let years = (t.date - epoch).num_days() as f64 / DAYS_PER_YEAR;
            let discount = one_plus_r.powf(years);
            if discount == 0.0 {
                continue;
            }
            npv_val += t.amount / discount;
            dnpv -= years * t.amount / (one_plus_r * discount);
        }

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }

        if dnpv == 0.0 {
            return Err(AngelSimError::ConvergenceFailure {
                function: "XIRR".into(),
                iterations: i,
                last_delta: npv_val,
            });
        }

        rate -= npv_val / dnpv;

        // Guard against divergence
        rate = rate.clamp(-0.99, 100.0);
    }

    Err(AngelSimError::ConvergenceFailure {
        function: "XIRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta: npv_dated(rate, flows),
    })
}
