//! CLI integration tests for the backtest command orchestration.
//!
//! Tests cover:
//! - Config parsing and command-line overrides (build_backtest_config)
//! - Data source selection (build_price_port, build_sentiment_port)
//! - Full pipeline with mock ports and a temp output directory
//! - Full pipeline with real CSV and JSON files on disk

mod common;

use approx::assert_relative_eq;
use common::*;
use fgtrader::adapters::csv_report_adapter::CsvReportAdapter;
use fgtrader::adapters::file_config_adapter::FileConfigAdapter;
use fgtrader::cli::{self, Overrides};
use fgtrader::domain::backtest::ExecutionTiming;
use fgtrader::domain::config_validation::{validate_backtest_config, validate_data_config};
use fgtrader::domain::error::FgTraderError;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[backtest]
start_date = 2018-02-01
end_date = 2024-12-31
initial_capital = 10000
buy_threshold = 25
sell_threshold = 75
execute_on_close = false
fee_bps = 15

[data]
prices_csv = data/btc.csv
sentiment_json = data/fng.json

[report]
output_dir = out
"#;

mod config_loading {
    use super::*;

    #[test]
    fn build_backtest_config_valid_full() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_backtest_config(&adapter, &Overrides::default()).unwrap();

        assert_eq!(config.start_date, date(2018, 2, 1));
        assert_eq!(config.end_date, date(2024, 12, 31));
        assert_relative_eq!(config.initial_capital, 10_000.0);
        assert_relative_eq!(config.buy_threshold, 25.0);
        assert_relative_eq!(config.sell_threshold, 75.0);
        assert_relative_eq!(config.fee_bps, 15.0);
        assert_eq!(config.timing, ExecutionTiming::NextOpen);
        assert!(validate_backtest_config(&config).is_ok());
        assert!(validate_data_config(&adapter).is_ok());
    }

    #[test]
    fn build_backtest_config_uses_defaults() {
        let ini = "[backtest]\nstart_date = 2020-01-01\nend_date = 2020-12-31\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let config = cli::build_backtest_config(&adapter, &Overrides::default()).unwrap();

        assert_relative_eq!(config.initial_capital, cli::DEFAULT_INITIAL_CAPITAL);
        assert_relative_eq!(config.buy_threshold, cli::DEFAULT_BUY_THRESHOLD);
        assert_relative_eq!(config.sell_threshold, cli::DEFAULT_SELL_THRESHOLD);
        assert_relative_eq!(config.fee_bps, cli::DEFAULT_FEE_BPS);
        assert_eq!(config.timing, ExecutionTiming::OnClose);
    }

    #[test]
    fn overrides_take_precedence() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let overrides = Overrides {
            start_date: Some(date(2021, 1, 1)),
            end_date: None,
            buy_threshold: Some(10.0),
            sell_threshold: Some(90.0),
            initial_capital: Some(500.0),
            fee_bps: Some(0.0),
            execute_on_close: Some(true),
        };
        let config = cli::build_backtest_config(&adapter, &overrides).unwrap();

        assert_eq!(config.start_date, date(2021, 1, 1));
        assert_eq!(config.end_date, date(2024, 12, 31));
        assert_relative_eq!(config.buy_threshold, 10.0);
        assert_relative_eq!(config.sell_threshold, 90.0);
        assert_relative_eq!(config.initial_capital, 500.0);
        assert_relative_eq!(config.fee_bps, 0.0);
        assert_eq!(config.timing, ExecutionTiming::OnClose);
    }

    #[test]
    fn missing_end_date_is_error() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nstart_date = 2020-01-01\n").unwrap();
        let err = cli::build_backtest_config(&adapter, &Overrides::default()).unwrap_err();
        assert!(matches!(err, FgTraderError::ConfigMissing { ref key, .. } if key == "end_date"));
    }

    #[test]
    fn end_date_override_satisfies_missing_key() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nstart_date = 2020-01-01\n").unwrap();
        let overrides = Overrides {
            end_date: Some(date(2020, 6, 30)),
            ..Overrides::default()
        };
        let config = cli::build_backtest_config(&adapter, &overrides).unwrap();
        assert_eq!(config.end_date, date(2020, 6, 30));
    }

    #[test]
    fn bad_date_is_invalid() {
        let ini = "[backtest]\nstart_date = 01/02/2020\nend_date = 2020-12-31\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let err = cli::build_backtest_config(&adapter, &Overrides::default()).unwrap_err();
        assert!(matches!(err, FgTraderError::ConfigInvalid { ref key, .. } if key == "start_date"));
    }

    #[test]
    fn out_of_range_override_fails_validation() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let overrides = Overrides {
            buy_threshold: Some(60.0),
            ..Overrides::default()
        };
        let config = cli::build_backtest_config(&adapter, &overrides).unwrap();
        assert!(validate_backtest_config(&config).is_err());
    }

    #[test]
    fn load_config_missing_file_exits_with_config_code() {
        let code = cli::load_config(Path::new("/nonexistent/fgtrader.ini")).err().unwrap();
        assert_eq!(code, ExitCode::from(2));
    }
}

mod data_sources {
    use super::*;

    #[test]
    fn price_port_requires_prices_csv() {
        let adapter = FileConfigAdapter::from_string("[data]\nsentiment_json = fng.json\n").unwrap();
        assert!(matches!(
            cli::build_price_port(&adapter),
            Err(FgTraderError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn sentiment_port_requires_a_source() {
        let adapter = FileConfigAdapter::from_string("[data]\nprices_csv = btc.csv\n").unwrap();
        assert!(matches!(
            cli::build_sentiment_port(&adapter),
            Err(FgTraderError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn sentiment_csv_source_is_read() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fng.csv");
        fs::write(&path, "date,value\n2024-01-02,40\n2024-01-01,20\n").unwrap();

        let ini = format!("[data]\nsentiment_csv = {}\n", path.display());
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let port = cli::build_sentiment_port(&adapter).unwrap();
        let readings = port.fetch_sentiment().unwrap();

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].date, date(2024, 1, 1));
    }

    #[cfg(not(feature = "http"))]
    #[test]
    fn sentiment_url_needs_http_feature() {
        let adapter =
            FileConfigAdapter::from_string("[data]\nsentiment_url = https://example.invalid/\n")
                .unwrap();
        assert!(matches!(
            cli::build_sentiment_port(&adapter),
            Err(FgTraderError::ConfigInvalid { .. })
        ));
    }
}

mod pipeline {
    use super::*;

    #[test]
    fn full_pipeline_with_mock_ports() {
        let prices = MockPricePort::new(price_bars(&[100.0, 90.0, 80.0, 120.0, 130.0]));
        let sentiment = MockSentimentPort::new(readings(&[60.0, 20.0, 20.0, 80.0, 50.0]));
        let dir = tempfile::TempDir::new().unwrap();

        let code = cli::run_backtest_pipeline(
            &prices,
            &sentiment,
            &CsvReportAdapter,
            &sample_config(),
            Some(dir.path()),
        );
        assert_eq!(code, ExitCode::SUCCESS);

        let trades = fs::read_to_string(dir.path().join("trades.csv")).unwrap();
        let lines: Vec<&str> = trades.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2024-01-02,buy,90.0,20.0"));
        assert!(lines[2].starts_with("2024-01-04,sell,120.0,80.0"));

        let portfolio = fs::read_to_string(dir.path().join("portfolio.csv")).unwrap();
        assert_eq!(portfolio.lines().count(), 6);
        assert!(dir.path().join("equity_curves.csv").exists());
        assert!(dir.path().join("summary.csv").exists());
    }

    #[test]
    fn pipeline_without_output_writes_nothing() {
        let prices = MockPricePort::new(price_bars(&[100.0, 90.0]));
        let sentiment = MockSentimentPort::new(readings(&[60.0, 20.0]));

        let code =
            cli::run_backtest_pipeline(&prices, &sentiment, &CsvReportAdapter, &sample_config(), None);
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn pipeline_with_no_overlap_exits_no_data() {
        let prices = MockPricePort::new(price_bars(&[100.0, 90.0]));
        let sentiment = MockSentimentPort::new(Vec::new());

        let code =
            cli::run_backtest_pipeline(&prices, &sentiment, &CsvReportAdapter, &sample_config(), None);
        assert_eq!(code, ExitCode::from(5));
    }

    #[test]
    fn pipeline_fetch_error_exits_data_code() {
        let prices = MockPricePort::failing("connection reset");
        let sentiment = MockSentimentPort::new(readings(&[10.0]));

        let code =
            cli::run_backtest_pipeline(&prices, &sentiment, &CsvReportAdapter, &sample_config(), None);
        assert_eq!(code, ExitCode::from(3));
    }

    #[test]
    fn load_series_restricts_to_window() {
        let prices = MockPricePort::new(price_bars(&[1.0, 2.0, 3.0, 4.0, 5.0]));
        let sentiment = MockSentimentPort::new(readings(&[50.0; 5]));
        let mut config = sample_config();
        config.start_date = day(1);
        config.end_date = day(3);

        let series = cli::load_series(&prices, &sentiment, &config).unwrap();
        let dates: Vec<_> = series.iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);
    }
}

mod files_on_disk {
    use super::*;

    #[test]
    fn csv_prices_and_json_sentiment_end_to_end() {
        let dir = tempfile::TempDir::new().unwrap();
        let prices = dir.path().join("btc.csv");
        fs::write(
            &prices,
            "Date,Open,Close\n\
             2018-02-01,100,100\n\
             2018-02-02,95,90\n\
             2018-02-03,85,80\n\
             2018-02-04,110,120\n\
             2018-02-05,125,130\n",
        )
        .unwrap();
        let fng = dir.path().join("fng.json");
        fs::write(
            &fng,
            r#"{"data": [
                {"value": "50", "timestamp": "1517788800"},
                {"value": "80", "timestamp": "1517702400"},
                {"value": "20", "timestamp": "1517616000"},
                {"value": "20", "timestamp": "1517529600"},
                {"value": "60", "timestamp": "1517443200"}
            ]}"#,
        )
        .unwrap();
        let out = dir.path().join("out");

        let ini = format!(
            "[backtest]\nstart_date = 2018-02-01\nend_date = 2018-02-28\n\
             initial_capital = 1000\nfee_bps = 0\n\n\
             [data]\nprices_csv = {}\nsentiment_json = {}\n",
            prices.display(),
            fng.display()
        );
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let config = cli::build_backtest_config(&adapter, &Overrides::default()).unwrap();
        validate_backtest_config(&config).unwrap();
        validate_data_config(&adapter).unwrap();

        let price_port = cli::build_price_port(&adapter).unwrap();
        let sentiment_port = cli::build_sentiment_port(&adapter).unwrap();
        let code = cli::run_backtest_pipeline(
            price_port.as_ref(),
            sentiment_port.as_ref(),
            &CsvReportAdapter,
            &config,
            Some(&out),
        );
        assert_eq!(code, ExitCode::SUCCESS);

        let portfolio = fs::read_to_string(out.join("portfolio.csv")).unwrap();
        let last = portfolio.lines().last().unwrap();
        let (day, equity) = last.split_once(',').unwrap();
        assert_eq!(day, "2018-02-05");
        assert_relative_eq!(equity.parse::<f64>().unwrap(), 1_000.0 / 90.0 * 120.0, epsilon = 1e-6);
    }

    #[test]
    fn real_ini_file_loads() {
        let file = write_temp_ini(VALID_INI);
        let adapter = cli::load_config(file.path()).unwrap();
        let config = cli::build_backtest_config(&adapter, &Overrides::default()).unwrap();
        assert_eq!(config.start_date, date(2018, 2, 1));
    }
}
