//! Report output port trait.

use std::path::Path;

use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::error::FgTraderError;
use crate::domain::summary::{CurvePoint, SummaryMetrics};

/// Everything a finished run hands to presentation. Read-only.
pub struct ReportData<'a> {
    pub config: &'a BacktestConfig,
    pub result: &'a BacktestResult,
    pub summary: &'a SummaryMetrics,
    pub curves: &'a [CurvePoint],
}

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(&self, report: &ReportData<'_>, output_path: &Path) -> Result<(), FgTraderError>;
}
