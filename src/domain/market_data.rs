//! Raw inputs from the data sources, before alignment.

use chrono::NaiveDate;

/// One day of BTC price history. Either price may be missing in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub close: Option<f64>,
}

/// One daily Fear & Greed reading.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentReading {
    pub date: NaiveDate,
    pub value: f64,
}
