//! CSV file data adapters for price and sentiment history.
//!
//! Columns are located by header name, case-insensitively, so exports with
//! extra columns (`High`, `Low`, `Volume`, ...) load unchanged. Empty cells
//! are read as missing values.

use crate::domain::error::FgTraderError;
use crate::domain::market_data::{PriceBar, SentimentReading};
use crate::ports::data_port::{PricePort, SentimentPort};
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs;
use std::path::{Path, PathBuf};

/// Daily BTC prices with `date`, `open` and `close` columns.
pub struct CsvPriceAdapter {
    path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Fear & Greed history with `date` and `value` columns.
pub struct CsvSentimentAdapter {
    path: PathBuf,
}

impl CsvSentimentAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn read_records(path: &Path) -> Result<(StringRecord, Vec<StringRecord>), FgTraderError> {
    let content = fs::read_to_string(path).map_err(|e| {
        FgTraderError::data_source(format!("failed to read {}: {}", path.display(), e))
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let headers = rdr
        .headers()
        .map_err(|e| FgTraderError::data_source(format!("CSV header error: {}", e)))?
        .clone();

    let records = rdr
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| FgTraderError::data_source(format!("CSV parse error: {}", e)))?;

    Ok((headers, records))
}

fn column(headers: &StringRecord, name: &str) -> Result<usize, FgTraderError> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| FgTraderError::data_source(format!("missing {} column", name)))
}

/// `YYYY-MM-DD`, optionally followed by a time part which is ignored.
pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, FgTraderError> {
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| FgTraderError::data_source(format!("invalid date {:?}: {}", value, e)))
}

fn parse_optional(record: &StringRecord, idx: usize, name: &str) -> Result<Option<f64>, FgTraderError> {
    match record.get(idx).map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null") => Ok(None),
        Some(s) => s
            .parse::<f64>()
            .map(Some)
            .map_err(|e| FgTraderError::data_source(format!("invalid {} value {:?}: {}", name, s, e))),
    }
}

impl PricePort for CsvPriceAdapter {
    fn fetch_prices(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, FgTraderError> {
        let (headers, records) = read_records(&self.path)?;
        let date_idx = column(&headers, "date")?;
        let open_idx = column(&headers, "open")?;
        let close_idx = column(&headers, "close")?;

        let mut bars = Vec::new();
        for record in &records {
            let date_str = record
                .get(date_idx)
                .ok_or_else(|| FgTraderError::data_source("missing date value"))?;
            let date = parse_date(date_str)?;

            if date < start_date || date > end_date {
                continue;
            }

            bars.push(PriceBar {
                date,
                open: parse_optional(record, open_idx, "open")?,
                close: parse_optional(record, close_idx, "close")?,
            });
        }

        bars.sort_by_key(|b| b.date);
        tracing::debug!(path = %self.path.display(), bars = bars.len(), "loaded price history");
        Ok(bars)
    }
}

impl SentimentPort for CsvSentimentAdapter {
    fn fetch_sentiment(&self) -> Result<Vec<SentimentReading>, FgTraderError> {
        let (headers, records) = read_records(&self.path)?;
        let date_idx = column(&headers, "date")?;
        let value_idx = column(&headers, "value")?;

        let mut readings = Vec::new();
        for record in &records {
            let date_str = record
                .get(date_idx)
                .ok_or_else(|| FgTraderError::data_source("missing date value"))?;
            let date = parse_date(date_str)?;
            if let Some(value) = parse_optional(record, value_idx, "value")? {
                readings.push(SentimentReading { date, value });
            }
        }

        readings.sort_by_key(|r| r.date);
        tracing::debug!(path = %self.path.display(), readings = readings.len(), "loaded sentiment history");
        Ok(readings)
    }
}
