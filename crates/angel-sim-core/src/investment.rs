use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::Rng;

use crate::error::AngelSimError;
use crate::model::ReturnModel;
use crate::types::Transaction;
use crate::AngelSimResult;

/// January 1 of the given calendar year.
fn year_start(year: i32) -> AngelSimResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| AngelSimError::DateError(format!("invalid calendar year {year}")))
}

/// Generate the cash flow for a single bet made in `vintage_year` (an
/// offset into the investment period).
///
/// One unit goes out at the vintage date; the random outcome determines the
/// payout multiple and how many years later the exit lands. The exit-year
/// draw is independent of the multiplier draw, so a marginal winner can
/// still exit late and a big winner early within its bin's window.
pub fn generate_investment(
    model: &ReturnModel,
    base_year: i32,
    vintage_year: u32,
    rng: &mut StdRng,
) -> AngelSimResult<[Transaction; 2]> {
    let invested = Transaction::new(year_start(base_year + vintage_year as i32)?, -1.0);

    let x: f64 = rng.gen();
    let bin = model.lookup(x)?;
    let payout = bin.multiplier.eval(x, rng);
    let years_to_exit = bin.exit_years.eval(rng.gen(), rng);

    let exit_year = base_year + vintage_year as i32 + years_to_exit.round() as i32;
    let returned = Transaction::new(year_start(exit_year)?, payout);

    Ok([invested, returned])
}
