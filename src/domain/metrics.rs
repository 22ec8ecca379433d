//! Performance metrics over an equity series.
//!
//! Annualization counts points, not calendar days: one point is assumed to
//! be one day with no gaps. Calendar gaps in the input (weekends missing
//! from a price feed, dropped rows) therefore skew the annualized figure.

/// Daily points per year, calendar-day cadence.
pub const PERIODS_PER_YEAR: f64 = 365.25;

/// Geometric annualized growth between the first and last finite values.
///
/// `years = count / periods_per_year`. Returns 0.0 when fewer than two
/// values remain, the first value is not positive, or `years <= 0`.
pub fn annualized_return(values: &[f64], periods_per_year: f64) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 {
        return 0.0;
    }

    let start = finite[0];
    let end = finite[finite.len() - 1];
    let years = finite.len() as f64 / periods_per_year;
    if start <= 0.0 || years <= 0.0 || years.is_nan() {
        return 0.0;
    }

    (end / start).powf(1.0 / years) - 1.0
}

/// Most negative `value / running_max - 1`, scanning left to right.
///
/// Empty or all non-finite input gives 0.0. While the running maximum is
/// not positive the drawdown is taken as 0.0.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;

    for &value in values.iter().filter(|v| v.is_finite()) {
        peak = peak.max(value);
        if peak > 0.0 {
            worst = worst.min(value / peak - 1.0);
        }
    }

    worst
}

/// last / initial - 1, or 0.0 when `initial` is not positive.
pub fn total_return(last: f64, initial: f64) -> f64 {
    if initial > 0.0 && last.is_finite() {
        last / initial - 1.0
    } else {
        0.0
    }
}
