use serde::{Deserialize, Serialize};

use crate::distribution::Sampler;
use crate::error::AngelSimError;
use crate::AngelSimResult;

/// Exit window of the top (30x–1000x) bin.
pub const LATE_EXIT_MIN_YEARS: f64 = 10.0;
pub const LATE_EXIT_MAX_YEARS: f64 = 17.0;

/// Default peak of the top bin's triangular exit sampler. Observed
/// calibrations of the source model disagree (10 vs 8/12), so the peak is a
/// configuration constant rather than part of the fixed table.
pub const DEFAULT_LATE_EXIT_PEAK: f64 = 10.0;

/// One probability bin of the return model: a half-open sub-range of
/// `[0, 1)` mapped to a payout-multiplier sampler and an exit-year sampler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReturnBin {
    pub lower: f64,
    pub upper: f64,
    pub multiplier: Sampler,
    pub exit_years: Sampler,
}

impl ReturnBin {
    pub fn contains(&self, x: f64) -> bool {
        self.lower <= x && x < self.upper
    }
}

/// The Wiltbank power-law return hypothesis: an ordered set of bins
/// partitioning `[0, 1)`. Built once at startup, read-only thereafter, and
/// shared across all trials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnModel {
    bins: Vec<ReturnBin>,
}

impl ReturnModel {
    /// Build the six-bin Wiltbank table. Roughly half of all bets are a
    /// total loss; the top 2% carry the power-law tail.
    pub fn wiltbank(late_exit_peak: f64) -> AngelSimResult<Self> {
        if !(LATE_EXIT_MIN_YEARS..=LATE_EXIT_MAX_YEARS).contains(&late_exit_peak) {
            return Err(AngelSimError::InvalidInput {
                field: "late_exit_peak".into(),
                reason: format!(
                    "must lie within [{LATE_EXIT_MIN_YEARS}, {LATE_EXIT_MAX_YEARS}], got {late_exit_peak}"
                ),
            });
        }

        let bins = vec![
            ReturnBin {
                lower: 0.0,
                upper: 0.50,
                multiplier: Sampler::linear(0.0, 0.50, 0.0, 0.0)?,
                exit_years: Sampler::uniform(1.0, 5.0)?,
            },
            ReturnBin {
                lower: 0.50,
                upper: 0.69,
                multiplier: Sampler::linear(0.50, 0.69, 0.0, 1.0)?,
                exit_years: Sampler::uniform(1.0, 5.0)?,
            },
            ReturnBin {
                lower: 0.69,
                upper: 0.87,
                multiplier: Sampler::linear(0.69, 0.87, 1.0, 5.0)?,
                exit_years: Sampler::uniform(1.0, 15.0)?,
            },
            ReturnBin {
                lower: 0.87,
                upper: 0.94,
                multiplier: Sampler::linear(0.87, 0.94, 5.0, 10.0)?,
                exit_years: Sampler::uniform(3.0, 15.0)?,
            },
            ReturnBin {
                lower: 0.94,
                upper: 0.98,
                multiplier: Sampler::linear(0.94, 0.98, 10.0, 30.0)?,
                exit_years: Sampler::triangular(7.0, 12.0, 8.0)?,
            },
            ReturnBin {
                lower: 0.98,
                upper: 1.0,
                multiplier: Sampler::linear(0.98, 1.0, 30.0, 1000.0)?,
                exit_years: Sampler::triangular(
                    LATE_EXIT_MIN_YEARS,
                    LATE_EXIT_MAX_YEARS,
                    late_exit_peak,
                )?,
            },
        ];

        let model = ReturnModel { bins };
        model.validate_partition()?;
        Ok(model)
    }

    pub fn bins(&self) -> &[ReturnBin] {
        &self.bins
    }

    /// Find the bin containing draw `x`. Bins are disjoint and exhaustive
    /// over `[0, 1)`, so exactly one matches for any valid draw.
    pub fn lookup(&self, x: f64) -> AngelSimResult<&ReturnBin> {
        self.bins.iter().find(|bin| bin.contains(x)).ok_or_else(|| {
            AngelSimError::InvalidInput {
                field: "x".into(),
                reason: format!("draw {x} outside [0, 1)"),
            }
        })
    }

    /// Verify the bins partition `[0, 1)` with no gaps or overlaps.
    fn validate_partition(&self) -> AngelSimResult<()> {
        let mut edge = 0.0;
        for (i, bin) in self.bins.iter().enumerate() {
            if bin.lower != edge {
                return Err(AngelSimError::InvalidInput {
                    field: "bins".into(),
                    reason: format!(
                        "bin {i} starts at {} but previous bin ends at {edge}",
                        bin.lower
                    ),
                });
            }
            if bin.upper <= bin.lower {
                return Err(AngelSimError::InvalidInput {
                    field: "bins".into(),
                    reason: format!("bin {i} has empty range [{}, {})", bin.lower, bin.upper),
                });
            }
            edge = bin.upper;
        }
        if edge != 1.0 {
            return Err(AngelSimError::InvalidInput {
                field: "bins".into(),
                reason: format!("bins end at {edge}, expected 1.0"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn model() -> ReturnModel {
        ReturnModel::wiltbank(DEFAULT_LATE_EXIT_PEAK).unwrap()
    }

    #[test]
    fn test_table_has_six_bins() {
        assert_eq!(model().bins().len(), 6);
    }

    #[test]
    fn test_every_draw_matches_exactly_one_bin() {
        let m = model();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100_000 {
            let x: f64 = rng.gen();
            let matches = m.bins().iter().filter(|b| b.contains(x)).count();
            assert_eq!(matches, 1, "x={x}");
        }
    }

    #[test]
    fn test_bin_edges_are_half_open() {
        let m = model();
        // Each lower edge belongs to its own bin, not the previous one.
        for edge in [0.0, 0.50, 0.69, 0.87, 0.94, 0.98] {
            let bin = m.lookup(edge).unwrap();
            assert_eq!(bin.lower, edge);
        }
    }

    #[test]
    fn test_lookup_rejects_out_of_range() {
        let m = model();
        assert!(m.lookup(1.0).is_err());
        assert!(m.lookup(-0.01).is_err());
        assert!(m.lookup(2.5).is_err());
    }

    #[test]
    fn test_total_loss_bin_multiplier_is_zero() {
        let m = model();
        let mut rng = StdRng::seed_from_u64(7);
        let bin = m.lookup(0.25).unwrap();
        assert_eq!(bin.multiplier.eval(0.25, &mut rng), 0.0);
        assert_eq!(bin.multiplier.eval(0.49, &mut rng), 0.0);
    }

    #[test]
    fn test_multiplier_continuity_at_bin_edges() {
        // Adjacent bins agree at their shared edge: the table is a
        // continuous piecewise-linear payout curve.
        let m = model();
        let mut rng = StdRng::seed_from_u64(7);
        for window in m.bins().windows(2) {
            let (a, b) = (&window[0], &window[1]);
            let left = a.multiplier.eval(a.upper, &mut rng);
            let right = b.multiplier.eval(b.lower, &mut rng);
            assert!((left - right).abs() < 1e-9, "edge {}: {left} vs {right}", a.upper);
        }
    }

    #[test]
    fn test_top_bin_multiplier_range() {
        let m = model();
        let mut rng = StdRng::seed_from_u64(7);
        let bin = m.lookup(0.99).unwrap();
        let at_low = bin.multiplier.eval(0.98, &mut rng);
        let at_high = bin.multiplier.eval(1.0, &mut rng);
        assert!((at_low - 30.0).abs() < 1e-9);
        assert!((at_high - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_late_exit_peak_is_configurable() {
        assert!(ReturnModel::wiltbank(12.0).is_ok());
        assert!(ReturnModel::wiltbank(8.0).is_err());
        assert!(ReturnModel::wiltbank(18.0).is_err());
    }
}
