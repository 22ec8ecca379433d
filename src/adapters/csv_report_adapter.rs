//! CSV export of a finished run.
//!
//! Writes four files into the output directory:
//! - `trades.csv`: the trade log
//! - `portfolio.csv`: the strategy equity series
//! - `equity_curves.csv`: strategy vs buy-and-hold on common dates
//! - `summary.csv`: headline metrics, one row

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::domain::error::FgTraderError;
use crate::ports::report_port::{ReportData, ReportPort};

#[derive(Serialize)]
struct TradeRow {
    date: String,
    side: String,
    price: f64,
    fgi: f64,
}

#[derive(Serialize)]
struct EquityRow {
    date: String,
    equity: f64,
}

#[derive(Serialize)]
struct CurveRow {
    date: String,
    #[serde(rename = "Strategy")]
    strategy: f64,
    #[serde(rename = "Buy&Hold")]
    buy_and_hold: f64,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    start_date: String,
    end_date: String,
    initial_capital: f64,
    buy_threshold: f64,
    sell_threshold: f64,
    execution: &'a str,
    fee_bps: f64,
    strategy_return: f64,
    strategy_cagr: f64,
    strategy_mdd: f64,
    bh_return: f64,
    bh_cagr: f64,
    n_trades: usize,
}

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    fn write_rows<T: Serialize>(
        path: &Path,
        rows: impl IntoIterator<Item = T>,
    ) -> Result<(), FgTraderError> {
        let export_err = |e: csv::Error| FgTraderError::Export {
            reason: format!("{}: {}", path.display(), e),
        };
        let mut writer = csv::Writer::from_path(path).map_err(export_err)?;
        for row in rows {
            writer.serialize(row).map_err(export_err)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &ReportData<'_>, output_path: &Path) -> Result<(), FgTraderError> {
        fs::create_dir_all(output_path)?;

        Self::write_rows(
            &output_path.join("trades.csv"),
            report.result.trades.iter().map(|t| TradeRow {
                date: t.date.to_string(),
                side: t.side.to_string(),
                price: t.execution_price,
                fgi: t.sentiment,
            }),
        )?;

        Self::write_rows(
            &output_path.join("portfolio.csv"),
            report.result.equity_curve.iter().map(|p| EquityRow {
                date: p.date.to_string(),
                equity: p.equity,
            }),
        )?;

        Self::write_rows(
            &output_path.join("equity_curves.csv"),
            report.curves.iter().map(|c| CurveRow {
                date: c.date.to_string(),
                strategy: c.strategy,
                buy_and_hold: c.buy_and_hold,
            }),
        )?;

        let config = report.config;
        let summary = report.summary;
        Self::write_rows(
            &output_path.join("summary.csv"),
            [SummaryRow {
                start_date: config.start_date.to_string(),
                end_date: config.end_date.to_string(),
                initial_capital: config.initial_capital,
                buy_threshold: config.buy_threshold,
                sell_threshold: config.sell_threshold,
                execution: config.timing.label(),
                fee_bps: config.fee_bps,
                strategy_return: summary.strategy_return,
                strategy_cagr: summary.strategy_cagr,
                strategy_mdd: summary.strategy_mdd,
                bh_return: summary.bh_return,
                bh_cagr: summary.bh_cagr,
                n_trades: summary.n_trades,
            }],
        )?;

        tracing::info!(dir = %output_path.display(), "report written");
        Ok(())
    }
}
