//! Data access port traits.

use crate::domain::error::FgTraderError;
use crate::domain::market_data::{PriceBar, SentimentReading};
use chrono::NaiveDate;

/// Daily BTC price history.
pub trait PricePort {
    fn fetch_prices(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, FgTraderError>;
}

/// Daily Fear & Greed history. Returns everything the source has; the
/// caller restricts it to a window during alignment.
pub trait SentimentPort {
    fn fetch_sentiment(&self) -> Result<Vec<SentimentReading>, FgTraderError>;
}
