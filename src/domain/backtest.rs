//! Backtest engine: one pure call from price series to result bundle.
//!
//! bars → indicators → strategy → simulation → {metrics, projection} → report

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::domain::error::BacktestError;
use crate::domain::frame::PriceFrame;
use crate::domain::metrics::{PerformanceReport, ReturnStats, TRADING_DAYS_PER_YEAR};
use crate::domain::ohlcv::{PriceBar, validate_series};
use crate::domain::pipeline::{apply_indicators, apply_strategy};
use crate::domain::projection::{project, projection_horizon};
use crate::domain::registry::PluginRegistry;
use crate::domain::report::{BacktestReport, ChartData, EquityData};
use crate::domain::simulation::simulate;
use crate::domain::transform::Params;

pub const DEFAULT_CAPITAL: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRequest {
    pub starting_capital: f64,
    pub indicator_names: Vec<String>,
    pub indicator_params: BTreeMap<String, Params>,
    /// `None` selects the first registered strategy.
    pub strategy_name: Option<String>,
    pub strategy_params: Params,
    /// Sharpe annualization factor.
    pub periods_per_year: f64,
}

impl Default for BacktestRequest {
    fn default() -> Self {
        Self {
            starting_capital: DEFAULT_CAPITAL,
            indicator_names: Vec::new(),
            indicator_params: BTreeMap::new(),
            strategy_name: None,
            strategy_params: Params::new(),
            periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

/// Holds the indicator and strategy registries. Stateless between calls.
#[derive(Debug, Clone)]
pub struct Engine {
    pub indicators: PluginRegistry,
    pub strategies: PluginRegistry,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl Engine {
    pub fn new(indicators: PluginRegistry, strategies: PluginRegistry) -> Self {
        Self {
            indicators,
            strategies,
        }
    }

    pub fn with_builtins() -> Self {
        Self::new(
            PluginRegistry::builtin_indicators(),
            PluginRegistry::builtin_strategies(),
        )
    }

    pub fn run(
        &self,
        bars: &[PriceBar],
        request: &BacktestRequest,
    ) -> Result<BacktestReport, BacktestError> {
        validate_series(bars)?;
        let capital = request.starting_capital;
        if !(capital > 0.0 && capital.is_finite()) {
            return Err(BacktestError::InvalidCapital { capital });
        }
        let periods = request.periods_per_year;
        if !(periods > 0.0 && periods.is_finite()) {
            return Err(BacktestError::InvalidPeriodsPerYear { periods });
        }

        let frame = PriceFrame::new(bars);
        let frame = apply_indicators(
            &self.indicators,
            &frame,
            &request.indicator_names,
            &request.indicator_params,
        )?;
        let strategy = apply_strategy(
            &self.strategies,
            &frame,
            request.strategy_name.as_deref(),
            &request.strategy_params,
        )?;

        let sim = simulate(bars, &strategy.signals, capital);
        debug!(bars = bars.len(), "simulation complete");

        let performance = PerformanceReport::compute(&sim, capital, request.periods_per_year);

        let stats = ReturnStats::from_returns(&sim.realized_returns());
        let last_equity = sim.final_equity().unwrap_or(capital);
        let last_date = bars[bars.len() - 1].timestamp.date();
        let band = project(last_equity, last_date, stats, projection_horizon(bars.len()));

        info!(
            strategy = %strategy.name,
            bars = bars.len(),
            total_return = performance.total_return,
            "backtest complete"
        );

        Ok(BacktestReport {
            chart: ChartData::from_frame(&strategy.frame),
            equity: EquityData::new(&strategy.frame, &sim, band),
            performance,
        })
    }
}

/// Runs `request` against the built-in registries.
pub fn run_backtest(
    bars: &[PriceBar],
    request: &BacktestRequest,
) -> Result<BacktestReport, BacktestError> {
    Engine::with_builtins().run(bars, request)
}
