//! Technical indicator transforms.
//!
//! Each indicator is a [`Transform`](crate::domain::transform::Transform) that
//! appends one column to the frame:
//! - [`sma::Sma`]: `sma_{period}`, rolling mean of close
//! - [`rsi::Rsi`]: `rsi`, simple-mean relative strength index

pub mod rsi;
pub mod sma;

use crate::domain::frame::Column;

/// Rolling arithmetic mean over `period` entries.
///
/// An entry is defined only when its whole window is defined, so the first
/// `period - 1` entries (and any window touching an undefined input) are `None`.
pub fn rolling_mean(values: &[Option<f64>], period: usize) -> Column {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    for (i, window) in values.windows(period).enumerate() {
        out[i + period - 1] = window
            .iter()
            .copied()
            .sum::<Option<f64>>()
            .map(|s| s / period as f64);
    }
    out
}
