//! Configuration validation.
//!
//! The engine accepts any parameters; these bounds are enforced at the
//! front end before a run, matching the ranges the tool has always offered.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::FgTraderError;
use crate::ports::config_port::ConfigPort;

pub const MAX_BUY_THRESHOLD: f64 = 49.0;
pub const MIN_SELL_THRESHOLD: f64 = 51.0;
pub const MIN_INITIAL_CAPITAL: f64 = 10.0;
pub const MAX_FEE_BPS: f64 = 2_000.0;

pub fn validate_backtest_config(config: &BacktestConfig) -> Result<(), FgTraderError> {
    validate_initial_capital(config)?;
    validate_thresholds(config)?;
    validate_fee(config)?;
    validate_dates(config)?;
    Ok(())
}

/// Checks the `[data]` section names a price file and exactly one sentiment source.
pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), FgTraderError> {
    match config.get_string("data", "prices_csv") {
        Some(s) if !s.trim().is_empty() => {}
        _ => {
            return Err(FgTraderError::ConfigMissing {
                section: "data".to_string(),
                key: "prices_csv".to_string(),
            });
        }
    }

    let sources: Vec<&str> = ["sentiment_json", "sentiment_csv", "sentiment_url"]
        .into_iter()
        .filter(|key| {
            config
                .get_string("data", key)
                .is_some_and(|v| !v.trim().is_empty())
        })
        .collect();

    match sources.as_slice() {
        [] => Err(FgTraderError::ConfigMissing {
            section: "data".to_string(),
            key: "sentiment_json".to_string(),
        }),
        [_] => Ok(()),
        [first, ..] => Err(FgTraderError::invalid(
            "data",
            first,
            format!("only one sentiment source may be set, found {}", sources.join(", ")),
        )),
    }
}

fn validate_initial_capital(config: &BacktestConfig) -> Result<(), FgTraderError> {
    if config.initial_capital.is_nan() || config.initial_capital < MIN_INITIAL_CAPITAL {
        return Err(FgTraderError::invalid(
            "backtest",
            "initial_capital",
            format!("initial_capital must be at least {MIN_INITIAL_CAPITAL}"),
        ));
    }
    Ok(())
}

fn validate_thresholds(config: &BacktestConfig) -> Result<(), FgTraderError> {
    if !(0.0..=MAX_BUY_THRESHOLD).contains(&config.buy_threshold) {
        return Err(FgTraderError::invalid(
            "backtest",
            "buy_threshold",
            format!("buy_threshold must be between 0 and {MAX_BUY_THRESHOLD}"),
        ));
    }
    if !(MIN_SELL_THRESHOLD..=100.0).contains(&config.sell_threshold) {
        return Err(FgTraderError::invalid(
            "backtest",
            "sell_threshold",
            format!("sell_threshold must be between {MIN_SELL_THRESHOLD} and 100"),
        ));
    }
    Ok(())
}

fn validate_fee(config: &BacktestConfig) -> Result<(), FgTraderError> {
    if !(0.0..=MAX_FEE_BPS).contains(&config.fee_bps) {
        return Err(FgTraderError::invalid(
            "backtest",
            "fee_bps",
            format!("fee_bps must be between 0 and {MAX_FEE_BPS}"),
        ));
    }
    Ok(())
}

fn validate_dates(config: &BacktestConfig) -> Result<(), FgTraderError> {
    if config.start_date >= config.end_date {
        return Err(FgTraderError::invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}
