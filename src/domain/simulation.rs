//! Signal → position → returns → equity.
//!
//! The signal is lagged one bar before it is multiplied into returns, so a
//! decision taken on bar t's close earns nothing from bar t itself.

use crate::domain::ohlcv::PriceBar;
use crate::domain::strategy::Signal;

#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    /// 0 or 1 per bar; index 0 is always 0.
    pub position: Vec<u8>,
    /// close[t] / close[t-1] - 1, undefined at t = 0.
    pub returns: Vec<Option<f64>>,
    pub strategy_returns: Vec<Option<f64>>,
    pub equity: Vec<f64>,
    pub bh_equity: Vec<f64>,
    pub equity_high: Vec<f64>,
    pub equity_low: Vec<f64>,
}

impl Simulation {
    pub fn final_equity(&self) -> Option<f64> {
        self.equity.last().copied()
    }

    pub fn final_bh_equity(&self) -> Option<f64> {
        self.bh_equity.last().copied()
    }

    /// Strategy returns with the undefined entries dropped.
    pub fn realized_returns(&self) -> Vec<f64> {
        self.strategy_returns.iter().flatten().copied().collect()
    }
}

/// `position[t] = max(signal[t-1], 0)`, `position[0] = 0`.
pub fn lag_positions(signals: &[Signal]) -> Vec<u8> {
    if signals.is_empty() {
        return Vec::new();
    }
    std::iter::once(0)
        .chain(signals[..signals.len() - 1].iter().map(|s| s.long_exposure()))
        .collect()
}

/// Bar-over-bar close returns. Undefined at t = 0 and where the previous
/// close is zero or either close is not finite.
pub fn close_returns(bars: &[PriceBar]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(bars.len());
    if bars.is_empty() {
        return out;
    }
    out.push(None);
    for w in bars.windows(2) {
        let (prev, curr) = (w[0].close, w[1].close);
        let r = if prev != 0.0 && prev.is_finite() && curr.is_finite() {
            Some(curr / prev - 1.0)
        } else {
            None
        };
        out.push(r);
    }
    out
}

/// `capital * Π(1 + r)`, undefined returns contributing a factor of 1.
pub fn compound(capital: f64, returns: &[Option<f64>]) -> Vec<f64> {
    returns
        .iter()
        .scan(capital, |equity, r| {
            if let Some(r) = r {
                *equity *= 1.0 + r;
            }
            Some(*equity)
        })
        .collect()
}

/// `signals` holds one entry per bar, as returned by
/// [`extract_signals`](crate::domain::strategy::extract_signals).
pub fn simulate(bars: &[PriceBar], signals: &[Signal], capital: f64) -> Simulation {
    debug_assert_eq!(bars.len(), signals.len());

    let position = lag_positions(signals);
    let returns = close_returns(bars);
    let strategy_returns: Vec<Option<f64>> = position
        .iter()
        .zip(&returns)
        .map(|(&p, r)| r.map(|r| f64::from(p) * r))
        .collect();

    let equity = compound(capital, &strategy_returns);
    let bh_equity = compound(capital, &returns);

    let (equity_high, equity_low) = bars
        .iter()
        .zip(&position)
        .zip(&equity)
        .map(|((bar, &p), &eq)| match bar.intrabar_ratios() {
            Some((hi, lo)) if p == 1 => (eq * hi, eq * lo),
            _ => (eq, eq),
        })
        .unzip();

    Simulation {
        position,
        returns,
        strategy_returns,
        equity,
        bh_equity,
        equity_high,
        equity_low,
    }
}
