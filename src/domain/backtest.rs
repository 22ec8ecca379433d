//! Backtest engine: a single pass over the aligned daily series.
//!
//! Buys when sentiment drops below `buy_threshold`, sells when it rises
//! above `sell_threshold`. Every buy converts all cash, every sell converts
//! all BTC. Equity is marked at each bar's close.

use chrono::NaiveDate;

use super::daily_bar::DailyBar;
use super::portfolio::{EquityPoint, PortfolioState};
use super::trade::{Side, Trade};

/// When an order decided on a bar is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionTiming {
    /// At the signal bar's close.
    OnClose,
    /// At the following bar's open.
    NextOpen,
}

impl ExecutionTiming {
    pub fn from_execute_on_close(on_close: bool) -> Self {
        if on_close {
            ExecutionTiming::OnClose
        } else {
            ExecutionTiming::NextOpen
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExecutionTiming::OnClose => "close",
            ExecutionTiming::NextOpen => "next open",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub buy_threshold: f64,
    pub sell_threshold: f64,
    pub timing: ExecutionTiming,
    pub fee_bps: f64,
}

impl BacktestConfig {
    /// Multiplier applied to the cash-equivalent amount of every fill.
    pub fn fee_multiplier(&self) -> f64 {
        1.0 - self.fee_bps / 10_000.0
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

/// Run the strategy over `series`, which must be sorted ascending by date.
///
/// Thresholds are not checked against each other; inverted thresholds just
/// produce few or odd trades. Never fails: an empty series gives an empty
/// result.
pub fn run_backtest(series: &[DailyBar], config: &BacktestConfig) -> BacktestResult {
    let fee_mult = config.fee_multiplier();
    let mut state = PortfolioState::new(config.initial_capital);
    let mut result = BacktestResult {
        trades: Vec::new(),
        equity_curve: Vec::with_capacity(series.len()),
    };

    tracing::info!(
        bars = series.len(),
        buy_threshold = config.buy_threshold,
        sell_threshold = config.sell_threshold,
        timing = config.timing.label(),
        fee_bps = config.fee_bps,
        "running backtest"
    );

    for (i, bar) in series.iter().enumerate() {
        match execution_price(series, i, config.timing) {
            Some(price) => {
                if let Some(trade) = step(&mut state, bar, price, config, fee_mult) {
                    tracing::debug!(
                        date = %trade.date,
                        side = %trade.side,
                        price = trade.execution_price,
                        sentiment = trade.sentiment,
                        "trade executed"
                    );
                    result.trades.push(trade);
                }
            }
            None => {
                // No fill price for this bar: holdings are only marked.
            }
        }

        result.equity_curve.push(EquityPoint {
            date: bar.date,
            equity: state.mark_to_market(bar.close),
        });
    }

    tracing::info!(trades = result.trades.len(), "backtest finished");
    result
}

/// Fill price for an order decided on `series[i]`.
///
/// Under `NextOpen` the last bar has no next open and never trades. A
/// missing, non-finite or non-positive price means no fill.
fn execution_price(series: &[DailyBar], i: usize, timing: ExecutionTiming) -> Option<f64> {
    let price = match timing {
        ExecutionTiming::OnClose => Some(series[i].close),
        ExecutionTiming::NextOpen => series.get(i + 1).and_then(|next| next.open),
    }?;
    (price.is_finite() && price > 0.0).then_some(price)
}

/// Apply at most one state transition for `bar`.
fn step(
    state: &mut PortfolioState,
    bar: &DailyBar,
    price: f64,
    config: &BacktestConfig,
    fee_mult: f64,
) -> Option<Trade> {
    let signal_buy = bar.sentiment < config.buy_threshold;
    let signal_sell = bar.sentiment > config.sell_threshold;

    let side = if !state.is_long() && signal_buy && state.buy_all(price, fee_mult) {
        Side::Buy
    } else if state.is_long() && signal_sell && state.sell_all(price, fee_mult) {
        Side::Sell
    } else {
        return None;
    };

    Some(Trade {
        date: bar.date,
        side,
        execution_price: price,
        sentiment: bar.sentiment,
    })
}
