use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::AngelSimError;
use crate::AngelSimResult;

/// Probability sampler for one model parameter.
///
/// The original model wired these up as stored closures; a tagged variant
/// with a single dispatch point keeps the bin table serializable and lets
/// each constructor validate its parameters up front.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Sampler {
    /// Ignores the supplied draw and samples a fresh uniform in `[min, max]`.
    ///
    /// The "ignore input, resample internally" behaviour is deliberate: it
    /// keeps an exit-year draw independent of the multiplier draw that
    /// selected the bin.
    Uniform { min: f64, max: f64 },
    /// The affine function through `(x0, y0)` and `(x1, y1)`.
    Linear { x0: f64, x1: f64, y0: f64, y1: f64 },
    /// Inverse CDF of the triangular distribution on `[min, max]` with
    /// mode `peak`, applied to a uniform draw in `[0, 1)`.
    Triangular { min: f64, max: f64, peak: f64 },
}

impl Sampler {
    pub fn uniform(min: f64, max: f64) -> AngelSimResult<Self> {
        if min > max {
            return Err(AngelSimError::InvalidInput {
                field: "uniform".into(),
                reason: format!("min ({min}) must not exceed max ({max})"),
            });
        }
        Ok(Sampler::Uniform { min, max })
    }

    pub fn linear(x0: f64, x1: f64, y0: f64, y1: f64) -> AngelSimResult<Self> {
        if x0 == x1 {
            return Err(AngelSimError::DivisionByZero {
                context: format!("linear sampler with degenerate range x0 == x1 == {x0}"),
            });
        }
        Ok(Sampler::Linear { x0, x1, y0, y1 })
    }

    pub fn triangular(min: f64, max: f64, peak: f64) -> AngelSimResult<Self> {
        if !(min < max) {
            return Err(AngelSimError::InvalidInput {
                field: "triangular".into(),
                reason: format!("min ({min}) must be strictly less than max ({max})"),
            });
        }
        if peak < min || peak > max {
            return Err(AngelSimError::InvalidInput {
                field: "triangular".into(),
                reason: format!("peak ({peak}) must lie within [{min}, {max}]"),
            });
        }
        Ok(Sampler::Triangular { min, max, peak })
    }

    /// Evaluate the sampler at draw `x`.
    ///
    /// `Linear` and `Triangular` are pure functions of `x`; `Uniform`
    /// discards `x` and pulls fresh randomness from `rng`.
    pub fn eval(&self, x: f64, rng: &mut StdRng) -> f64 {
        match *self {
            Sampler::Uniform { min, max } => {
                if min == max {
                    min
                } else {
                    rng.gen_range(min..=max)
                }
            }
            Sampler::Linear { x0, x1, y0, y1 } => {
                let a = (y1 - y0) / (x1 - x0);
                let b = (y0 * x1 - y1 * x0) / (x1 - x0);
                a * x + b
            }
            Sampler::Triangular { min, max, peak } => {
                let threshold = (peak - min) / (max - min);
                if x < threshold {
                    min + (x * (max - min) * (peak - min)).sqrt()
                } else {
                    max - ((1.0 - x) * (max - min) * (max - peak)).sqrt()
                }
            }
        }
    }
}
