//! Configuration validation and request building.
//!
//! Checks every `[backtest]`, `[indicators]`, `[indicator.<name>]` and
//! `[strategy]` value before a backtest runs, then turns the config into a
//! [`BacktestRequest`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::warn;

use crate::domain::backtest::{BacktestRequest, DEFAULT_CAPITAL, Engine};
use crate::domain::error::BacktestError;
use crate::domain::metrics::TRADING_DAYS_PER_YEAR;
use crate::domain::registry::PluginRegistry;
use crate::domain::transform::{Params, validate_params};
use crate::ports::config_port::ConfigPort;

pub const BACKTEST_SECTION: &str = "backtest";
pub const INDICATORS_SECTION: &str = "indicators";
pub const STRATEGY_SECTION: &str = "strategy";
pub const CONFIG_DATE_FORMAT: &str = "%Y-%m-%d";

/// Section holding the parameters of indicator `name`.
pub fn indicator_section(name: &str) -> String {
    format!("indicator.{name}")
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    read_positive(config, "initial_capital", DEFAULT_CAPITAL)?;
    read_positive(config, "periods_per_year", TRADING_DAYS_PER_YEAR)?;
    read_date_range(config)?;
    Ok(())
}

/// Checks the active indicator list and each indicator's parameter keys.
/// Names the registry does not know are allowed; the engine skips them.
pub fn validate_indicator_config(
    config: &dyn ConfigPort,
    registry: &PluginRegistry,
) -> Result<(), BacktestError> {
    for name in active_indicators(config) {
        let params = read_params(config, &indicator_section(&name), &[])?;
        match registry.get(&name) {
            Some(transform) => validate_params(transform.as_ref(), &params)?,
            None => warn!(indicator = %name, "unknown indicator will be skipped"),
        }
    }
    Ok(())
}

/// Checks the strategy name and rejects parameter keys the chosen strategy
/// does not declare.
pub fn validate_strategy_config(
    config: &dyn ConfigPort,
    registry: &PluginRegistry,
) -> Result<(), BacktestError> {
    let params = read_params(config, STRATEGY_SECTION, &["name"])?;

    let transform = match strategy_name(config) {
        Some(name) => registry.get(&name).ok_or_else(|| BacktestError::ConfigInvalid {
            section: STRATEGY_SECTION.to_string(),
            key: "name".to_string(),
            reason: format!(
                "unknown strategy '{name}' (available: {})",
                registry.names().join(", ")
            ),
        })?,
        None => match registry.first() {
            Some((_, transform)) => transform,
            None => {
                return Err(BacktestError::ConfigInvalid {
                    section: STRATEGY_SECTION.to_string(),
                    key: "name".to_string(),
                    reason: "no strategies are registered".to_string(),
                });
            }
        },
    };

    validate_params(transform.as_ref(), &params)
}

/// Runs every validator against `engine`'s registries.
pub fn validate_config(config: &dyn ConfigPort, engine: &Engine) -> Result<(), BacktestError> {
    validate_backtest_config(config)?;
    validate_indicator_config(config, &engine.indicators)?;
    validate_strategy_config(config, &engine.strategies)?;
    Ok(())
}

/// Checks a built request against `engine`: the strategy must resolve and
/// every supplied parameter key must be declared by its transform.
pub fn validate_request(request: &BacktestRequest, engine: &Engine) -> Result<(), BacktestError> {
    for (name, params) in &request.indicator_params {
        if let Some(transform) = engine.indicators.get(name) {
            validate_params(transform.as_ref(), params)?;
        }
    }

    let transform = match request.strategy_name.as_deref() {
        Some(name) => engine.strategies.get(name),
        None => engine.strategies.first().map(|(_, t)| t),
    };
    let transform = transform.ok_or_else(|| BacktestError::UnknownStrategy {
        name: request.strategy_name.clone().unwrap_or_default(),
    })?;
    validate_params(transform.as_ref(), &request.strategy_params)
}

/// Builds the engine request. `strategy_override` wins over `[strategy] name`.
pub fn build_request(
    config: &dyn ConfigPort,
    strategy_override: Option<&str>,
) -> Result<BacktestRequest, BacktestError> {
    let indicator_names = active_indicators(config);
    let mut indicator_params = BTreeMap::new();
    for name in &indicator_names {
        let params = read_params(config, &indicator_section(name), &[])?;
        if !params.is_empty() {
            indicator_params.insert(name.clone(), params);
        }
    }

    let strategy_name = strategy_override
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| strategy_name(config));

    Ok(BacktestRequest {
        starting_capital: read_positive(config, "initial_capital", DEFAULT_CAPITAL)?,
        indicator_names,
        indicator_params,
        strategy_name,
        strategy_params: read_params(config, STRATEGY_SECTION, &["name"])?,
        periods_per_year: read_positive(config, "periods_per_year", TRADING_DAYS_PER_YEAR)?,
    })
}

/// `[indicators] active`, split on commas, in order.
pub fn active_indicators(config: &dyn ConfigPort) -> Vec<String> {
    config
        .get_string(INDICATORS_SECTION, "active")
        .map(|s| {
            s.split(',')
                .map(|n| n.trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn strategy_name(config: &dyn ConfigPort) -> Option<String> {
    config
        .get_string(STRATEGY_SECTION, "name")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Every key of `section` except `skip`, parsed as a number.
pub fn read_params(
    config: &dyn ConfigPort,
    section: &str,
    skip: &[&str],
) -> Result<Params, BacktestError> {
    let mut params = Params::new();
    for key in config.keys(section) {
        if skip.contains(&key.as_str()) {
            continue;
        }
        let raw = config.get_string(section, &key).unwrap_or_default();
        let value = parse_number(section, &key, &raw)?;
        params.insert(key, value);
    }
    Ok(params)
}

/// Optional inclusive `[backtest]` date filter.
pub fn read_date_range(
    config: &dyn ConfigPort,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), BacktestError> {
    let start = read_date(config, "start_date")?;
    let end = read_date(config, "end_date")?;
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(BacktestError::ConfigInvalid {
                section: BACKTEST_SECTION.to_string(),
                key: "start_date".to_string(),
                reason: format!("start_date ({s}) is after end_date ({e})"),
            });
        }
    }
    Ok((start, end))
}

fn read_date(config: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, BacktestError> {
    let Some(raw) = config
        .get_string(BACKTEST_SECTION, key)
        .filter(|s| !s.trim().is_empty())
    else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw.trim(), CONFIG_DATE_FORMAT)
        .map(Some)
        .map_err(|_| BacktestError::ConfigInvalid {
            section: BACKTEST_SECTION.to_string(),
            key: key.to_string(),
            reason: "invalid date format (expected YYYY-MM-DD)".to_string(),
        })
}

fn read_positive(config: &dyn ConfigPort, key: &str, default: f64) -> Result<f64, BacktestError> {
    let value = match config.get_string(BACKTEST_SECTION, key) {
        Some(raw) => parse_number(BACKTEST_SECTION, key, &raw)?,
        None => default,
    };
    if value <= 0.0 {
        return Err(BacktestError::ConfigInvalid {
            section: BACKTEST_SECTION.to_string(),
            key: key.to_string(),
            reason: format!("{key} must be positive"),
        });
    }
    Ok(value)
}

fn parse_number(section: &str, key: &str, raw: &str) -> Result<f64, BacktestError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(BacktestError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("expected a number, got '{}'", raw.trim()),
        }),
    }
}
