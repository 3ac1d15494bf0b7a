//! CLI integration tests for config loading and backtest orchestration.
//!
//! Tests cover:
//! - Config files on disk (read_config, prepare_request)
//! - Orchestration with MockDataPort (execute_backtest)
//! - End-to-end with CSV data and JSON output on disk

mod common;

use backcast::adapters::csv_adapter::CsvAdapter;
use backcast::adapters::file_config_adapter::FileConfigAdapter;
use backcast::cli::{self, Cli, ModuleList};
use backcast::domain::backtest::Engine;
use backcast::domain::error::BacktestError;
use clap::Parser;
use common::*;
use std::io::Write;
use std::path::PathBuf;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[backtest]
initial_capital = 25000
periods_per_year = 252
start_date = 2024-01-01
end_date = 2024-12-31

[indicators]
active = sma, rsi

[indicator.sma]
period = 10

[indicator.rsi]
period = 14

[strategy]
name = sma_cross
fast = 5
slow = 20
"#;

mod config_loading {
    use super::*;

    #[test]
    fn read_config_from_disk() {
        let file = write_temp_ini(VALID_INI);
        let config = cli::read_config(file.path()).unwrap();
        let request = cli::prepare_request(&config, &Engine::with_builtins(), None).unwrap();

        assert_eq!(request.starting_capital, 25_000.0);
        assert_eq!(request.indicator_names, vec!["sma", "rsi"]);
        assert_eq!(request.indicator_params["rsi"]["period"], 14.0);
        assert_eq!(request.strategy_name.as_deref(), Some("sma_cross"));
        assert_eq!(request.strategy_params["fast"], 5.0);
    }

    #[test]
    fn missing_file_is_config_parse_error() {
        let err = cli::read_config(&PathBuf::from("/nonexistent/path/config.ini")).unwrap_err();
        assert!(matches!(err, BacktestError::ConfigParse { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn unknown_strategy_key_rejected_at_boundary() {
        let config =
            FileConfigAdapter::from_string("[strategy]\nfast = 5\nthreshold = 0.3\n").unwrap();
        let err = cli::prepare_request(&config, &Engine::with_builtins(), None).unwrap_err();
        assert!(matches!(err, BacktestError::UnknownParameter { ref key, .. } if key == "threshold"));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn bad_capital_is_config_error() {
        let config = FileConfigAdapter::from_string("[backtest]\ninitial_capital = -5\n").unwrap();
        let err = cli::prepare_request(&config, &Engine::with_builtins(), None).unwrap_err();
        assert!(matches!(err, BacktestError::ConfigInvalid { ref key, .. } if key == "initial_capital"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn override_replaces_config_strategy() {
        let config = FileConfigAdapter::from_string("[strategy]\nname = missing\n").unwrap();
        let request =
            cli::prepare_request(&config, &Engine::with_builtins(), Some("sma_cross")).unwrap();
        assert_eq!(request.strategy_name.as_deref(), Some("sma_cross"));
    }

    #[test]
    fn resolved_name_falls_back_to_first_strategy() {
        let config = FileConfigAdapter::from_string("[backtest]\n").unwrap();
        let engine = Engine::with_builtins();
        let request = cli::prepare_request(&config, &engine, None).unwrap();
        assert_eq!(cli::resolved_strategy_name(&request, &engine), "sma_cross");
    }
}

mod pipeline_mock {
    use super::*;

    fn config() -> FileConfigAdapter {
        FileConfigAdapter::from_string(VALID_INI).unwrap()
    }

    #[test]
    fn execute_backtest_with_mock_data() {
        let port = MockDataPort::new().with_bars("SPY", generate_bars("2023-12-01", 120, 100.0));
        let report =
            cli::execute_backtest(&config(), &port, &Engine::with_builtins(), "SPY", None).unwrap();

        // December bars are outside the configured range
        assert_eq!(report.chart.dates.len(), 89);
        assert_eq!(report.chart.dates[0], "2024-01-01 00:00");
        assert_eq!(report.performance.capital, 25_000.0);
        assert!(report.chart.indicators.contains_key("sma_10"));
        assert!(report.chart.indicators.contains_key("sma_5"));
        assert!(report.chart.indicators.contains_key("sma_20"));
        assert_eq!(report.chart.rsi.len(), 89);
    }

    #[test]
    fn data_error_propagates() {
        let port = MockDataPort::new().with_error("SPY", "corrupt file");
        let err = cli::execute_backtest(&config(), &port, &Engine::with_builtins(), "SPY", None)
            .unwrap_err();
        assert!(matches!(err, BacktestError::Data { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn no_bars_in_range_is_input_error() {
        let port = MockDataPort::new().with_bars("SPY", generate_bars("2020-01-01", 30, 100.0));
        let err = cli::execute_backtest(&config(), &port, &Engine::with_builtins(), "SPY", None)
            .unwrap_err();
        assert!(matches!(err, BacktestError::EmptySeries));
    }

    #[test]
    fn unknown_override_is_input_error() {
        let port = MockDataPort::new().with_bars("SPY", generate_bars("2024-01-01", 30, 100.0));
        let err = cli::execute_backtest(
            &config(),
            &port,
            &Engine::with_builtins(),
            "SPY",
            Some("mean_revert"),
        )
        .unwrap_err();
        assert!(matches!(err, BacktestError::UnknownStrategy { name } if name == "mean_revert"));
    }
}

mod end_to_end {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn csv_data_through_cli_to_json_file() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "ACME", &generate_bars("2024-01-01", 90, 40.0));
        let ini = write_temp_ini(VALID_INI);
        let output = dir.path().join("out.json");

        let cli = Cli::try_parse_from([
            "backcast",
            "backtest",
            "--config",
            ini.path().to_str().unwrap(),
            "--data",
            dir.path().to_str().unwrap(),
            "--symbol",
            "ACME",
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();
        let _ = cli::run(cli);

        let text = std::fs::read_to_string(&output).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["chart"]["dates"].as_array().unwrap().len(), 90);
        assert_eq!(json["equity"]["equity"][0], 25_000.0);
        assert_eq!(
            json["equity"]["projection"]["dates"].as_array().unwrap().len(),
            22
        );
        assert!(json["chart"]["indicators"]["sma_10"][0].is_null());
    }

    #[test]
    fn csv_and_mock_ports_agree() {
        let dir = TempDir::new().unwrap();
        let bars = generate_bars("2024-02-01", 50, 75.0);
        write_csv(dir.path(), "ACME", &bars);
        let config = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let engine = Engine::with_builtins();

        let csv = CsvAdapter::new(dir.path().to_path_buf());
        let mock = MockDataPort::new().with_bars("ACME", bars);

        let from_csv = cli::execute_backtest(&config, &csv, &engine, "ACME", None).unwrap();
        let from_mock = cli::execute_backtest(&config, &mock, &engine, "ACME", None).unwrap();
        assert_eq!(from_csv, from_mock);
    }

    #[test]
    fn failed_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let ini = write_temp_ini(VALID_INI);
        let output = dir.path().join("out.json");

        let cli = Cli::try_parse_from([
            "backcast",
            "backtest",
            "-c",
            ini.path().to_str().unwrap(),
            "-d",
            dir.path().to_str().unwrap(),
            "--symbol",
            "MISSING",
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();
        let _ = cli::run(cli);
        assert!(!output.exists());
    }

    #[test]
    fn modules_lists_builtins() {
        let modules = ModuleList::from_engine(&Engine::with_builtins());
        let json = serde_json::to_value(&modules).unwrap();
        assert_eq!(json["indicators"], serde_json::json!(["sma", "rsi"]));
        assert_eq!(json["strategies"], serde_json::json!(["sma_cross"]));
    }
}
