//! Indicator pipeline and strategy selection.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::error::BacktestError;
use crate::domain::frame::PriceFrame;
use crate::domain::registry::PluginRegistry;
use crate::domain::strategy::{Signal, extract_signals};
use crate::domain::transform::Params;

/// Applies `names` left to right. Names missing from `registry` are skipped;
/// a registered indicator that fails aborts the pipeline.
pub fn apply_indicators<'a>(
    registry: &PluginRegistry,
    frame: &PriceFrame<'a>,
    names: &[String],
    params: &BTreeMap<String, Params>,
) -> Result<PriceFrame<'a>, BacktestError> {
    let empty = Params::new();
    let mut current = frame.clone();
    for name in names {
        let indicator_params = params.get(name).unwrap_or(&empty);
        match registry.invoke(name, &current, indicator_params) {
            Some(result) => current = check_alignment(result?, name)?,
            None => debug!(indicator = %name, "indicator not registered, skipping"),
        }
    }
    Ok(current)
}

/// Rejects a transform output carrying a column that is not one value per bar.
fn check_alignment<'a>(
    frame: PriceFrame<'a>,
    transform: &str,
) -> Result<PriceFrame<'a>, BacktestError> {
    match frame.misaligned_column() {
        Some((column, got)) => Err(BacktestError::ColumnLength {
            transform: transform.to_string(),
            column: column.to_string(),
            expected: frame.len(),
            got,
        }),
        None => Ok(frame),
    }
}

/// Output of the strategy stage.
#[derive(Debug, Clone)]
pub struct StrategyOutput<'a> {
    pub name: String,
    pub frame: PriceFrame<'a>,
    pub signals: Vec<Signal>,
}

/// Resolves the strategy (`name`, or the first registered one), runs it and
/// reads back its `signal` column.
pub fn apply_strategy<'a>(
    registry: &PluginRegistry,
    frame: &PriceFrame<'a>,
    name: Option<&str>,
    params: &Params,
) -> Result<StrategyOutput<'a>, BacktestError> {
    let name = match name.filter(|n| !n.is_empty()) {
        Some(n) => n.to_string(),
        None => registry
            .first()
            .map(|(n, _)| n.to_string())
            .ok_or_else(|| BacktestError::UnknownStrategy {
                name: String::new(),
            })?,
    };

    let frame = registry
        .invoke(&name, frame, params)
        .ok_or_else(|| BacktestError::UnknownStrategy { name: name.clone() })??;
    let frame = check_alignment(frame, &name)?;
    let signals = extract_signals(&frame, &name)?;
    debug!(strategy = %name, bars = signals.len(), "strategy applied");

    Ok(StrategyOutput {
        name,
        frame,
        signals,
    })
}
