//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::console_report::render_summary;
use crate::adapters::csv_adapter::{CsvPriceAdapter, CsvSentimentAdapter};
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::fear_greed_json::FearGreedJsonAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::alignment::align_series;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, ExecutionTiming};
use crate::domain::config_validation::{validate_backtest_config, validate_data_config};
use crate::domain::daily_bar::{DailyBar, drop_incomplete};
use crate::domain::error::FgTraderError;
use crate::domain::summary::{close_prices, equity_curves, summary_metrics};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::{PricePort, SentimentPort};
use crate::ports::report_port::{ReportData, ReportPort};

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;
pub const DEFAULT_BUY_THRESHOLD: f64 = 30.0;
pub const DEFAULT_SELL_THRESHOLD: f64 = 70.0;
pub const DEFAULT_FEE_BPS: f64 = 10.0;

#[derive(Parser, Debug)]
#[command(
    name = "fgtrader",
    about = "Backtest a Fear & Greed threshold strategy on daily BTC prices"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// First day of the window (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day of the window (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Buy when the index is below this value
        #[arg(long)]
        buy_threshold: Option<f64>,
        /// Sell when the index is above this value
        #[arg(long)]
        sell_threshold: Option<f64>,
        /// Initial capital in USD
        #[arg(long)]
        capital: Option<f64>,
        /// Fee per trade in basis points
        #[arg(long)]
        fee_bps: Option<f64>,
        /// Fill orders at the next day's open instead of the signal day's close
        #[arg(long)]
        next_open: bool,
        /// Directory for CSV exports
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the data available for the configured window
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub buy_threshold: Option<f64>,
    pub sell_threshold: Option<f64>,
    pub initial_capital: Option<f64>,
    pub fee_bps: Option<f64>,
    pub execute_on_close: Option<bool>,
}

/// Install the stderr `tracing` subscriber. Filter from `FGTRADER_LOG`, default `warn`.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_env("FGTRADER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            start,
            end,
            buy_threshold,
            sell_threshold,
            capital,
            fee_bps,
            next_open,
            output,
        } => {
            let overrides = Overrides {
                start_date: start,
                end_date: end,
                buy_threshold,
                sell_threshold,
                initial_capital: capital,
                fee_bps,
                execute_on_close: next_open.then_some(false),
            };
            run_backtest(&config, &overrides, output.as_deref())
        }
        Command::Validate { config } => run_validate(&config),
        Command::Info { config } => run_info(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = FgTraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn report_error(err: FgTraderError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

fn parse_config_date(
    adapter: &dyn ConfigPort,
    key: &str,
    value: Option<NaiveDate>,
) -> Result<NaiveDate, FgTraderError> {
    if let Some(date) = value {
        return Ok(date);
    }
    let raw = adapter
        .get_string("backtest", key)
        .ok_or_else(|| FgTraderError::ConfigMissing {
            section: "backtest".into(),
            key: key.into(),
        })?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        FgTraderError::invalid("backtest", key, "invalid date format (expected YYYY-MM-DD)")
    })
}

/// Read `[backtest]`, apply overrides and fill defaults. Does not validate bounds.
pub fn build_backtest_config(
    adapter: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<BacktestConfig, FgTraderError> {
    let start_date = parse_config_date(adapter, "start_date", overrides.start_date)?;
    let end_date = parse_config_date(adapter, "end_date", overrides.end_date)?;

    let execute_on_close = overrides
        .execute_on_close
        .unwrap_or_else(|| adapter.get_bool("backtest", "execute_on_close", true));

    Ok(BacktestConfig {
        start_date,
        end_date,
        initial_capital: overrides.initial_capital.unwrap_or_else(|| {
            adapter.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL)
        }),
        buy_threshold: overrides.buy_threshold.unwrap_or_else(|| {
            adapter.get_double("backtest", "buy_threshold", DEFAULT_BUY_THRESHOLD)
        }),
        sell_threshold: overrides.sell_threshold.unwrap_or_else(|| {
            adapter.get_double("backtest", "sell_threshold", DEFAULT_SELL_THRESHOLD)
        }),
        timing: ExecutionTiming::from_execute_on_close(execute_on_close),
        fee_bps: overrides
            .fee_bps
            .unwrap_or_else(|| adapter.get_double("backtest", "fee_bps", DEFAULT_FEE_BPS)),
    })
}

fn data_path(adapter: &dyn ConfigPort, key: &str) -> Option<PathBuf> {
    adapter
        .get_string("data", key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

pub fn build_price_port(adapter: &dyn ConfigPort) -> Result<Box<dyn PricePort>, FgTraderError> {
    let path = data_path(adapter, "prices_csv").ok_or_else(|| FgTraderError::ConfigMissing {
        section: "data".into(),
        key: "prices_csv".into(),
    })?;
    Ok(Box::new(CsvPriceAdapter::new(path)))
}

pub fn build_sentiment_port(
    adapter: &dyn ConfigPort,
) -> Result<Box<dyn SentimentPort>, FgTraderError> {
    if let Some(path) = data_path(adapter, "sentiment_json") {
        return Ok(Box::new(FearGreedJsonAdapter::new(path)));
    }
    if let Some(path) = data_path(adapter, "sentiment_csv") {
        return Ok(Box::new(CsvSentimentAdapter::new(path)));
    }
    if let Some(url) = adapter
        .get_string("data", "sentiment_url")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    {
        // `default` selects the public alternative.me endpoint.
        #[cfg(feature = "http")]
        {
            use crate::adapters::fear_greed_json::FearGreedHttpAdapter;
            let url = (!url.eq_ignore_ascii_case("default")).then_some(url);
            return Ok(Box::new(FearGreedHttpAdapter::new(url)?));
        }

        #[cfg(not(feature = "http"))]
        {
            let _ = url;
            return Err(FgTraderError::invalid(
                "data",
                "sentiment_url",
                "http feature is required to fetch sentiment over the network",
            ));
        }
    }
    Err(FgTraderError::ConfigMissing {
        section: "data".into(),
        key: "sentiment_json".into(),
    })
}

/// Fetch both histories, align them on the configured window and drop
/// incomplete days.
pub fn load_series(
    price_port: &dyn PricePort,
    sentiment_port: &dyn SentimentPort,
    config: &BacktestConfig,
) -> Result<Vec<DailyBar>, FgTraderError> {
    let sentiment = sentiment_port.fetch_sentiment()?;
    let prices = price_port.fetch_prices(config.start_date, config.end_date)?;
    eprintln!(
        "  Loaded {} price days and {} sentiment readings",
        prices.len(),
        sentiment.len()
    );

    let rows = align_series(&prices, &sentiment, config.start_date, config.end_date);
    let series = drop_incomplete(&rows);
    if series.is_empty() {
        return Err(FgTraderError::NoData {
            start: config.start_date,
            end: config.end_date,
        });
    }
    Ok(series)
}

fn run_backtest(config_path: &Path, overrides: &Overrides, output_path: Option<&Path>) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Build and validate parameters
    let bt_config = match build_backtest_config(&adapter, overrides)
        .and_then(|c| validate_backtest_config(&c).map(|()| c))
    {
        Ok(c) => c,
        Err(e) => return report_error(e),
    };
    if let Err(e) = validate_data_config(&adapter) {
        return report_error(e);
    }

    // Stage 3: Resolve data sources
    let price_port = match build_price_port(&adapter) {
        Ok(p) => p,
        Err(e) => return report_error(e),
    };
    let sentiment_port = match build_sentiment_port(&adapter) {
        Ok(p) => p,
        Err(e) => return report_error(e),
    };

    let output = output_path
        .map(Path::to_path_buf)
        .or_else(|| adapter.get_string("report", "output_dir").map(PathBuf::from));

    run_backtest_pipeline(
        price_port.as_ref(),
        sentiment_port.as_ref(),
        &CsvReportAdapter,
        &bt_config,
        output.as_deref(),
    )
}

pub fn run_backtest_pipeline(
    price_port: &dyn PricePort,
    sentiment_port: &dyn SentimentPort,
    report_port: &dyn ReportPort,
    bt_config: &BacktestConfig,
    output_path: Option<&Path>,
) -> ExitCode {
    // Stage 4: Fetch and align data
    eprintln!(
        "Fetching data for {} to {}",
        bt_config.start_date, bt_config.end_date
    );
    let series = match load_series(price_port, sentiment_port, bt_config) {
        Ok(s) => s,
        Err(e) => return report_error(e),
    };

    // Stage 5: Run backtest
    eprintln!("Running backtest: {} days", series.len());
    let result = backtest_engine::run_backtest(&series, bt_config);

    // Stage 6: Summaries
    let closes = close_prices(&series);
    let summary = summary_metrics(&result.equity_curve, &closes, bt_config.initial_capital)
        .with_trade_count(result.trades.len());
    let curves = equity_curves(&result.equity_curve, &closes, bt_config.initial_capital);

    let final_equity = result
        .equity_curve
        .last()
        .map(|p| p.equity)
        .unwrap_or(bt_config.initial_capital);
    eprintln!("\n{}", render_summary(bt_config, &summary, final_equity));

    // Stage 7: Export
    let Some(output) = output_path else {
        return ExitCode::SUCCESS;
    };
    let report = ReportData {
        config: bt_config,
        result: &result,
        summary: &summary,
        curves: &curves,
    };
    match report_port.write(&report, output) {
        Ok(()) => {
            eprintln!("\nResults written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => report_error(e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let bt_config = match build_backtest_config(&adapter, &Overrides::default()) {
        Ok(c) => c,
        Err(e) => return report_error(e),
    };
    if let Err(e) = validate_backtest_config(&bt_config) {
        return report_error(e);
    }
    if let Err(e) = validate_data_config(&adapter) {
        return report_error(e);
    }

    eprintln!("\nWindow:     {} to {}", bt_config.start_date, bt_config.end_date);
    eprintln!(
        "Thresholds: buy < {}, sell > {}",
        bt_config.buy_threshold, bt_config.sell_threshold
    );
    eprintln!("Capital:    {}", bt_config.initial_capital);
    eprintln!("Execution:  {}", bt_config.timing.label());
    eprintln!("Fee:        {} bps", bt_config.fee_bps);
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_info(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let bt_config = match build_backtest_config(&adapter, &Overrides::default()) {
        Ok(c) => c,
        Err(e) => return report_error(e),
    };
    let price_port = match build_price_port(&adapter) {
        Ok(p) => p,
        Err(e) => return report_error(e),
    };
    let sentiment_port = match build_sentiment_port(&adapter) {
        Ok(p) => p,
        Err(e) => return report_error(e),
    };

    match load_series(price_port.as_ref(), sentiment_port.as_ref(), &bt_config) {
        Ok(series) => {
            let with_open = series.iter().filter(|b| b.open.is_some()).count();
            if let (Some(first), Some(last)) = (series.first(), series.last()) {
                println!(
                    "{} aligned days, {} to {} ({} with an open price)",
                    series.len(),
                    first.date,
                    last.date,
                    with_open
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => report_error(e),
    }
}
