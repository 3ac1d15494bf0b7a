//! Transform capability shared by indicators and strategies.

use std::collections::BTreeMap;

use crate::domain::error::BacktestError;
use crate::domain::frame::PriceFrame;

/// Named numeric parameters as supplied by a caller.
pub type Params = BTreeMap<String, f64>;

/// `(frame, params) -> frame'`, where `frame'` is `frame` plus zero or more
/// derived columns.
///
/// `params` handed to [`Transform::apply`] only ever contains keys listed in
/// [`Transform::accepted_params`]; the registry filters the rest.
pub trait Transform: Send + Sync {
    fn name(&self) -> &'static str;

    fn accepted_params(&self) -> &'static [&'static str];

    fn apply<'a>(
        &self,
        frame: &PriceFrame<'a>,
        params: &Params,
    ) -> Result<PriceFrame<'a>, BacktestError>;
}

/// Drops every key `transform` does not declare.
pub fn filter_params(transform: &dyn Transform, params: &Params) -> Params {
    let accepted = transform.accepted_params();
    params
        .iter()
        .filter(|(k, _)| accepted.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), *v))
        .collect()
}

/// Rejects keys `transform` does not declare. Used at the configuration
/// boundary; the engine itself filters instead.
pub fn validate_params(transform: &dyn Transform, params: &Params) -> Result<(), BacktestError> {
    let accepted = transform.accepted_params();
    match params.keys().find(|k| !accepted.contains(&k.as_str())) {
        Some(key) => Err(BacktestError::UnknownParameter {
            transform: transform.name().to_string(),
            key: key.clone(),
        }),
        None => Ok(()),
    }
}

/// Reads a window length: a whole number >= 1, or `default` when absent.
pub fn period_param(
    transform: &str,
    params: &Params,
    key: &str,
    default: usize,
) -> Result<usize, BacktestError> {
    let Some(&value) = params.get(key) else {
        return Ok(default);
    };
    if !value.is_finite() || value.fract() != 0.0 || value < 1.0 {
        return Err(BacktestError::InvalidParameter {
            transform: transform.to_string(),
            key: key.to_string(),
            reason: format!("expected a whole number >= 1, got {value}"),
        });
    }
    Ok(value as usize)
}
