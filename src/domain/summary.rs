//! Headline metrics and comparable equity curves, strategy vs buy-and-hold.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::daily_bar::DailyBar;
use super::metrics::{PERIODS_PER_YEAR, annualized_return, max_drawdown, total_return};
use super::portfolio::EquityPoint;

/// A dated close price, the input to the buy-and-hold benchmark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl From<&DailyBar> for PricePoint {
    fn from(bar: &DailyBar) -> Self {
        PricePoint {
            date: bar.date,
            close: bar.close,
        }
    }
}

/// Close prices of a bar series.
pub fn close_prices(series: &[DailyBar]) -> Vec<PricePoint> {
    series.iter().map(PricePoint::from).collect()
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryMetrics {
    pub strategy_return: f64,
    pub strategy_cagr: f64,
    pub strategy_mdd: f64,
    pub bh_return: f64,
    pub bh_cagr: f64,
    /// Not computed here; set from the trade log by the caller.
    pub n_trades: usize,
}

impl SummaryMetrics {
    pub fn with_trade_count(self, n_trades: usize) -> Self {
        SummaryMetrics { n_trades, ..self }
    }
}

/// One row of the comparison chart.
#[derive(Debug, Clone, PartialEq)]
pub struct CurvePoint {
    pub date: NaiveDate,
    pub strategy: f64,
    pub buy_and_hold: f64,
}

/// Capital invested at the first close and held: `close / first_close * initial_capital`.
///
/// Empty when there are no prices or the first close is not positive.
pub fn buy_and_hold_equity(closes: &[PricePoint], initial_capital: f64) -> Vec<EquityPoint> {
    let first = match closes.first() {
        Some(p) if p.close > 0.0 => p.close,
        _ => return Vec::new(),
    };
    closes
        .iter()
        .map(|p| EquityPoint {
            date: p.date,
            equity: p.close / first * initial_capital,
        })
        .collect()
}

fn values(points: &[EquityPoint]) -> Vec<f64> {
    points.iter().map(|p| p.equity).collect()
}

pub fn summary_metrics(
    equity: &[EquityPoint],
    closes: &[PricePoint],
    initial_capital: f64,
) -> SummaryMetrics {
    let Some(last) = equity.last() else {
        return SummaryMetrics::default();
    };

    let strategy = values(equity);
    let bh = values(&buy_and_hold_equity(closes, initial_capital));

    let bh_return = match (closes.first(), closes.last()) {
        (Some(first), Some(last)) => total_return(last.close, first.close),
        _ => 0.0,
    };

    SummaryMetrics {
        strategy_return: total_return(last.equity, initial_capital),
        strategy_cagr: annualized_return(&strategy, PERIODS_PER_YEAR),
        strategy_mdd: max_drawdown(&strategy),
        bh_return,
        bh_cagr: annualized_return(&bh, PERIODS_PER_YEAR),
        n_trades: 0,
    }
}

/// Strategy and buy-and-hold equity on common dates only, ascending.
pub fn equity_curves(
    equity: &[EquityPoint],
    closes: &[PricePoint],
    initial_capital: f64,
) -> Vec<CurvePoint> {
    let bh: BTreeMap<NaiveDate, f64> = buy_and_hold_equity(closes, initial_capital)
        .into_iter()
        .map(|p| (p.date, p.equity))
        .collect();
    let strategy: BTreeMap<NaiveDate, f64> = equity.iter().map(|p| (p.date, p.equity)).collect();

    strategy
        .into_iter()
        .filter(|(_, value)| value.is_finite())
        .filter_map(|(date, value)| {
            bh.get(&date)
                .filter(|b| b.is_finite())
                .map(|&buy_and_hold| CurvePoint {
                    date,
                    strategy: value,
                    buy_and_hold,
                })
        })
        .collect()
}
