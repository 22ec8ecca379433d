//! Date alignment of price and sentiment histories.
//!
//! Inner join on date: a day survives only if both sources have it. No
//! interpolation or forward fill.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::NaiveDate;

use super::daily_bar::AlignedRow;
use super::market_data::{PriceBar, SentimentReading};

/// Join prices and sentiment on date, restricted to `start..=end`.
///
/// The first occurrence of a duplicated date wins in either input. Output
/// is sorted ascending by date.
pub fn align_series(
    prices: &[PriceBar],
    sentiment: &[SentimentReading],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<AlignedRow> {
    if start > end {
        return Vec::new();
    }

    let mut scores: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for reading in sentiment {
        scores.entry(reading.date).or_insert(reading.value);
    }

    let mut by_date: BTreeMap<NaiveDate, &PriceBar> = BTreeMap::new();
    for bar in prices {
        if let Entry::Vacant(slot) = by_date.entry(bar.date) {
            slot.insert(bar);
        }
    }

    let rows: Vec<AlignedRow> = by_date
        .range(start..=end)
        .filter_map(|(date, bar)| {
            scores.get(date).map(|&score| AlignedRow {
                date: *date,
                open: bar.open,
                close: bar.close,
                sentiment: Some(score),
            })
        })
        .collect();

    let unmatched = by_date.range(start..=end).count() - rows.len();
    if unmatched > 0 {
        tracing::warn!(unmatched, "price days without a sentiment reading were discarded");
    }

    rows
}
