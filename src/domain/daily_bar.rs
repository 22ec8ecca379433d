//! Daily bar representation and pre-simulation cleaning.

use chrono::NaiveDate;

/// One aligned calendar day before cleaning. Any value may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub close: Option<f64>,
    pub sentiment: Option<f64>,
}

/// One day of the simulation input.
///
/// `close` and `sentiment` are always present; `open` is only needed for
/// next-open execution and may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub close: f64,
    pub sentiment: f64,
}

impl DailyBar {
    /// Build a bar from an aligned row, or `None` if close or sentiment is missing.
    pub fn from_row(row: &AlignedRow) -> Option<Self> {
        Some(DailyBar {
            date: row.date,
            open: present(row.open),
            close: present(row.close)?,
            sentiment: present(row.sentiment)?,
        })
    }
}

/// Non-finite values count as missing.
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Convert aligned rows to bars, dropping rows without a close or a sentiment score.
pub fn drop_incomplete(rows: &[AlignedRow]) -> Vec<DailyBar> {
    let bars: Vec<DailyBar> = rows.iter().filter_map(DailyBar::from_row).collect();
    let dropped = rows.len() - bars.len();
    if dropped > 0 {
        tracing::warn!(dropped, "dropped rows with missing close or sentiment");
    }
    bars
}
