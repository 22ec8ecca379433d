//! Fear & Greed Index history in the alternative.me `/fng/` JSON format.
//!
//! ```json
//! {"name": "Fear and Greed Index",
//!  "data": [{"value": "40", "value_classification": "Fear", "timestamp": "1551157200"}]}
//! ```
//!
//! `timestamp` is unix seconds, or `MM-DD-YYYY` when the API is asked for
//! `date_format=us`. Entries that do not parse are skipped.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::domain::error::FgTraderError;
use crate::domain::market_data::SentimentReading;
use crate::ports::data_port::SentimentPort;

#[derive(Debug, Deserialize)]
struct FngResponse {
    #[serde(default)]
    data: Vec<FngEntry>,
}

#[derive(Debug, Deserialize)]
struct FngEntry {
    value: Option<serde_json::Value>,
    timestamp: Option<serde_json::Value>,
}

fn as_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    if let Ok(secs) = raw.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive());
    }
    NaiveDate::parse_from_str(raw, "%m-%d-%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

fn parse_entry(entry: &FngEntry) -> Option<SentimentReading> {
    let value = as_text(entry.value.as_ref()?)?.parse::<f64>().ok()?;
    let date = parse_day(&as_text(entry.timestamp.as_ref()?)?)?;
    value.is_finite().then_some(SentimentReading { date, value })
}

/// Parse a `/fng/` response body into readings sorted by date, one per day
/// (the first entry for a day wins).
pub fn parse_fear_greed(body: &str) -> Result<Vec<SentimentReading>, FgTraderError> {
    let response: FngResponse = serde_json::from_str(body)
        .map_err(|e| FgTraderError::data_source(format!("invalid Fear & Greed JSON: {}", e)))?;

    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut skipped = 0usize;
    for entry in &response.data {
        match parse_entry(entry) {
            Some(reading) => {
                by_date.entry(reading.date).or_insert(reading.value);
            }
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, "skipped malformed Fear & Greed entries");
    }

    Ok(by_date
        .into_iter()
        .map(|(date, value)| SentimentReading { date, value })
        .collect())
}

/// Reads a saved `/fng/` response from disk.
pub struct FearGreedJsonAdapter {
    path: PathBuf,
}

impl FearGreedJsonAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SentimentPort for FearGreedJsonAdapter {
    fn fetch_sentiment(&self) -> Result<Vec<SentimentReading>, FgTraderError> {
        let body = fs::read_to_string(&self.path).map_err(|e| {
            FgTraderError::data_source(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        parse_fear_greed(&body)
    }
}

#[cfg(feature = "http")]
pub use http::FearGreedHttpAdapter;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use super::parse_fear_greed;
    use crate::domain::error::FgTraderError;
    use crate::domain::market_data::SentimentReading;
    use crate::ports::data_port::SentimentPort;

    pub const DEFAULT_URL: &str = "https://api.alternative.me/fng/?limit=0&format=json";

    /// Fetches the full index history over HTTP.
    pub struct FearGreedHttpAdapter {
        client: reqwest::blocking::Client,
        url: String,
    }

    impl FearGreedHttpAdapter {
        pub fn new(url: Option<String>) -> Result<Self, FgTraderError> {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .map_err(|e| FgTraderError::data_source(format!("HTTP client error: {}", e)))?;
            Ok(Self {
                client,
                url: url.unwrap_or_else(|| DEFAULT_URL.to_string()),
            })
        }
    }

    impl SentimentPort for FearGreedHttpAdapter {
        fn fetch_sentiment(&self) -> Result<Vec<SentimentReading>, FgTraderError> {
            tracing::info!(url = %self.url, "fetching Fear & Greed history");
            let body = self
                .client
                .get(&self.url)
                .send()
                .and_then(|resp| resp.error_for_status())
                .and_then(|resp| resp.text())
                .map_err(|e| FgTraderError::data_source(format!("GET {}: {}", self.url, e)))?;
            parse_fear_greed(&body)
        }
    }
}
