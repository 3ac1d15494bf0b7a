//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::{JsonReportAdapter, STDOUT_PATH};
use crate::domain::backtest::{BacktestRequest, Engine};
use crate::domain::config_validation::{
    build_request, read_date_range, validate_backtest_config, validate_config,
    validate_indicator_config, validate_request,
};
use crate::domain::error::BacktestError;
use crate::domain::metrics::{PerformanceReport, ProfitFactor};
use crate::domain::report::BacktestReport;
use crate::domain::transform::Params;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "backcast", about = "Single-instrument strategy backtester")]
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
        /// Directory holding one `<SYMBOL>.csv` per instrument
        #[arg(short, long)]
        data: PathBuf,
        #[arg(long)]
        symbol: String,
        /// Overrides `[strategy] name`
        #[arg(short, long)]
        strategy: Option<String>,
        /// JSON output file; standard output when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
        #[arg(long)]
        dry_run: bool,
    },
    /// List registered indicators and strategies
    Modules,
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in a data directory
    ListSymbols {
        #[arg(short, long)]
        data: PathBuf,
    },
}

/// Registered transform names, as printed by `modules`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleList {
    pub indicators: Vec<String>,
    pub strategies: Vec<String>,
}

impl ModuleList {
    pub fn from_engine(engine: &Engine) -> Self {
        Self {
            indicators: owned(engine.indicators.names()),
            strategies: owned(engine.strategies.names()),
        }
    }
}

fn owned(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(str::to_string).collect()
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            symbol,
            strategy,
            output,
            compact,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, strategy.as_deref())
            } else {
                run_backtest(
                    &config,
                    &data,
                    &symbol,
                    strategy.as_deref(),
                    output.as_deref(),
                    !compact,
                )
            }
        }
        Command::Modules => run_modules(),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { data } => run_list_symbols(&data),
    }
}

fn fail(err: &BacktestError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn read_config(path: &Path) -> Result<FileConfigAdapter, BacktestError> {
    FileConfigAdapter::from_file(path).map_err(|e| BacktestError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    read_config(path).map_err(|e| fail(&e))
}

/// Validates `config` and builds the request the engine will run.
pub fn prepare_request(
    config: &dyn ConfigPort,
    engine: &Engine,
    strategy_override: Option<&str>,
) -> Result<BacktestRequest, BacktestError> {
    validate_backtest_config(config)?;
    validate_indicator_config(config, &engine.indicators)?;
    let request = build_request(config, strategy_override)?;
    validate_request(&request, engine)?;
    Ok(request)
}

/// Name of the strategy `request` will run.
pub fn resolved_strategy_name(request: &BacktestRequest, engine: &Engine) -> String {
    request
        .strategy_name
        .clone()
        .or_else(|| engine.strategies.first().map(|(name, _)| name.to_string()))
        .unwrap_or_default()
}

/// Validates the config, fetches `symbol` and runs the engine.
pub fn execute_backtest(
    config: &dyn ConfigPort,
    data_port: &dyn DataPort,
    engine: &Engine,
    symbol: &str,
    strategy_override: Option<&str>,
) -> Result<BacktestReport, BacktestError> {
    // Stage 1: Validate config and build request
    let request = prepare_request(config, engine, strategy_override)?;
    let (start_date, end_date) = read_date_range(config)?;
    let strategy_name = resolved_strategy_name(&request, engine);
    eprintln!("Strategy: {strategy_name}");

    // Stage 2: Load price data
    let bars = data_port.fetch_bars(symbol, start_date, end_date)?;
    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        eprintln!(
            "Running backtest: {} ({} bars, {} to {})",
            symbol,
            bars.len(),
            first.timestamp.date(),
            last.timestamp.date(),
        );
    }

    // Stage 3: Run engine
    let report = engine.run(&bars, &request)?;
    info!(symbol, strategy = %strategy_name, "report ready");
    Ok(report)
}

fn run_backtest(
    config_path: &Path,
    data_dir: &Path,
    symbol: &str,
    strategy_override: Option<&str>,
    output_path: Option<&Path>,
    pretty: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let data_port = CsvAdapter::new(data_dir.to_path_buf());
    let engine = Engine::with_builtins();
    let report = match execute_backtest(&adapter, &data_port, &engine, symbol, strategy_override) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    // Stage 4: Console summary
    print_summary(&report.performance);

    // Stage 5: Write JSON
    let output = output_path
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| STDOUT_PATH.to_string());
    if let Err(e) = JsonReportAdapter::new(pretty).write(&report, &output) {
        return fail(&e);
    }
    if output != STDOUT_PATH {
        eprintln!("\nReport written to: {output}");
    }
    ExitCode::SUCCESS
}

pub fn print_summary(perf: &PerformanceReport) {
    eprintln!("\n=== Results ===");
    eprintln!("Start Capital:    {:.2}", perf.capital);
    eprintln!("End Capital:      {:.2}", perf.end_capital);
    eprintln!("Total Return:     {:.2}%", perf.total_return);
    eprintln!("Buy & Hold:       {:.2}% ({:.2})", perf.bh_return, perf.bh_capital);
    eprintln!("Sharpe Ratio:     {:.2}", perf.sharpe);
    eprintln!("Max Drawdown:     {:.2}%", perf.max_drawdown);
    eprintln!("Calmar Ratio:     {:.2}", perf.calmar);
    eprintln!("Total Trades:     {}", perf.total_trades);
    eprintln!("Win Rate:         {:.2}%", perf.win_rate);
    match perf.profit_factor {
        ProfitFactor::Ratio(r) => eprintln!("Profit Factor:    {r:.2}"),
        ProfitFactor::NoLosses => eprintln!("Profit Factor:    n/a (no losing bars)"),
    }
}

fn format_params(params: &Params) -> String {
    if params.is_empty() {
        return "defaults".to_string();
    }
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn run_dry_run(config_path: &Path, strategy_override: Option<&str>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let engine = Engine::with_builtins();
    let request = match prepare_request(&adapter, &engine, strategy_override) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    let (start_date, end_date) = match read_date_range(&adapter) {
        Ok(range) => range,
        Err(e) => return fail(&e),
    };
    eprintln!("Config validated successfully");

    eprintln!("\nIndicators to compute:");
    if request.indicator_names.is_empty() {
        eprintln!("  (none)");
    }
    for name in &request.indicator_names {
        let status = if engine.indicators.contains(name) {
            request
                .indicator_params
                .get(name)
                .map(format_params)
                .unwrap_or_else(|| "defaults".to_string())
        } else {
            "unknown, will be skipped".to_string()
        };
        eprintln!("  {name}: {status}");
    }

    eprintln!("\nStrategy:");
    eprintln!(
        "  {}: {}",
        resolved_strategy_name(&request, &engine),
        format_params(&request.strategy_params)
    );

    eprintln!("\nBacktest:");
    eprintln!("  initial_capital:  {:.2}", request.starting_capital);
    eprintln!("  periods_per_year: {}", request.periods_per_year);
    let bound = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
    };
    eprintln!("  range:            {} to {}", bound(start_date), bound(end_date));

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_modules() -> ExitCode {
    let modules = ModuleList::from_engine(&Engine::with_builtins());
    match serde_json::to_string_pretty(&modules) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&BacktestError::from(e)),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_config(&adapter, &Engine::with_builtins()) {
        return fail(&e);
    }

    eprintln!("Configuration is valid.");
    ExitCode::SUCCESS
}

fn run_list_symbols(data_dir: &Path) -> ExitCode {
    let symbols = match CsvAdapter::new(data_dir.to_path_buf()).list_symbols() {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    if symbols.is_empty() {
        eprintln!("No symbols found in {}", data_dir.display());
    } else {
        for symbol in &symbols {
            println!("{symbol}");
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}
