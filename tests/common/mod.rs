#![allow(dead_code)]

use chrono::NaiveDate;
use fgtrader::domain::backtest::{BacktestConfig, ExecutionTiming};
use fgtrader::domain::daily_bar::DailyBar;
use fgtrader::domain::error::FgTraderError;
use fgtrader::domain::market_data::{PriceBar, SentimentReading};
use fgtrader::ports::data_port::{PricePort, SentimentPort};

pub struct MockPricePort {
    pub bars: Vec<PriceBar>,
    pub error: Option<String>,
}

impl MockPricePort {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self { bars, error: None }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            bars: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl PricePort for MockPricePort {
    fn fetch_prices(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, FgTraderError> {
        if let Some(reason) = &self.error {
            return Err(FgTraderError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .bars
            .iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .cloned()
            .collect())
    }
}

pub struct MockSentimentPort {
    pub readings: Vec<SentimentReading>,
}

impl MockSentimentPort {
    pub fn new(readings: Vec<SentimentReading>) -> Self {
        Self { readings }
    }
}

impl SentimentPort for MockSentimentPort {
    fn fetch_sentiment(&self) -> Result<Vec<SentimentReading>, FgTraderError> {
        Ok(self.readings.clone())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Day `i` (0-based) of January 2024.
pub fn day(i: usize) -> NaiveDate {
    date(2024, 1, 1) + chrono::Duration::days(i as i64)
}

/// Consecutive daily bars starting 2024-01-01, open equal to close.
pub fn make_series(closes: &[f64], sentiment: &[f64]) -> Vec<DailyBar> {
    closes
        .iter()
        .zip(sentiment)
        .enumerate()
        .map(|(i, (&close, &value))| DailyBar {
            date: day(i),
            open: Some(close),
            close,
            sentiment: value,
        })
        .collect()
}

pub fn price_bars(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: day(i),
            open: Some(close),
            close: Some(close),
        })
        .collect()
}

pub fn readings(values: &[f64]) -> Vec<SentimentReading> {
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| SentimentReading { date: day(i), value })
        .collect()
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        start_date: date(2024, 1, 1),
        end_date: date(2024, 12, 31),
        initial_capital: 1_000.0,
        buy_threshold: 30.0,
        sell_threshold: 70.0,
        timing: ExecutionTiming::OnClose,
        fee_bps: 0.0,
    }
}
