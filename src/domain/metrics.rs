//! Performance metrics and statistics.

use serde::{Serialize, Serializer};

use super::simulation::Simulation;

/// Default Sharpe annualization. Applied as-is regardless of bar interval
/// unless the caller passes another `periods_per_year`.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Wire value for a profit factor with no losing bars.
pub const PROFIT_FACTOR_NO_LOSSES: f64 = 999.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfitFactor {
    Ratio(f64),
    /// Gross loss is zero; serialized as [`PROFIT_FACTOR_NO_LOSSES`].
    NoLosses,
}

impl ProfitFactor {
    pub fn value(self) -> f64 {
        match self {
            ProfitFactor::Ratio(r) => r,
            ProfitFactor::NoLosses => PROFIT_FACTOR_NO_LOSSES,
        }
    }
}

impl Serialize for ProfitFactor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            ProfitFactor::Ratio(r) => serializer.serialize_f64(r),
            ProfitFactor::NoLosses => serializer.serialize_u32(PROFIT_FACTOR_NO_LOSSES as u32),
        }
    }
}

/// Mean and sample standard deviation (n - 1) of a return series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStats {
    pub mean: f64,
    pub std: f64,
}

impl ReturnStats {
    /// Fewer than two values give `std == 0`; no values give `mean == 0`.
    pub fn from_returns(returns: &[f64]) -> Self {
        let count = returns.len();
        if count == 0 {
            return Self {
                mean: 0.0,
                std: 0.0,
            };
        }
        let n = count as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let std = if count > 1 {
            let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
            variance.sqrt()
        } else {
            0.0
        };
        Self { mean, std }
    }
}

/// Scalar report, every value rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub end_capital: f64,
    pub total_return: f64,
    pub bh_return: f64,
    pub bh_capital: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub total_trades: usize,
    pub profit_factor: ProfitFactor,
    pub calmar: f64,
    pub capital: f64,
}

impl PerformanceReport {
    pub fn compute(sim: &Simulation, capital: f64, periods_per_year: f64) -> Self {
        let end_capital = sim.final_equity().unwrap_or(capital);
        let bh_capital = sim.final_bh_equity().unwrap_or(capital);

        let total_return = (end_capital / capital - 1.0) * 100.0;
        let bh_return = (bh_capital / capital - 1.0) * 100.0;

        let max_drawdown = compute_max_drawdown(&sim.equity);

        let returns = sim.realized_returns();
        let stats = ReturnStats::from_returns(&returns);
        let sharpe = if stats.std > 0.0 {
            stats.mean / stats.std * periods_per_year.sqrt()
        } else {
            0.0
        };

        let mut wins = 0usize;
        let mut losses = 0usize;
        let mut gross_profit = 0.0_f64;
        let mut gross_loss = 0.0_f64;
        for &r in &returns {
            if r > 0.0 {
                wins += 1;
                gross_profit += r;
            } else if r < 0.0 {
                losses += 1;
                gross_loss += r;
            }
        }
        let gross_loss = gross_loss.abs();
        let total_trades = wins + losses;

        let win_rate = if total_trades > 0 {
            wins as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let profit_factor = if gross_loss > 0.0 {
            ProfitFactor::Ratio(round_to(gross_profit / gross_loss, 2))
        } else {
            ProfitFactor::NoLosses
        };

        let calmar = if max_drawdown != 0.0 {
            total_return / max_drawdown.abs()
        } else {
            0.0
        };

        PerformanceReport {
            end_capital: round_to(end_capital, 2),
            total_return: round_to(total_return, 2),
            bh_return: round_to(bh_return, 2),
            bh_capital: round_to(bh_capital, 2),
            sharpe: round_to(sharpe, 2),
            max_drawdown: round_to(max_drawdown, 2),
            win_rate: round_to(win_rate, 2),
            total_trades,
            profit_factor,
            calmar: round_to(calmar, 2),
            capital: round_to(capital, 2),
        }
    }
}

/// Most negative `(equity - running_peak) / running_peak`, in percent.
fn compute_max_drawdown(equity: &[f64]) -> f64 {
    let Some(&first) = equity.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &e in equity {
        if e > peak {
            peak = e;
        }
        if peak > 0.0 {
            max_dd = max_dd.min((e - peak) / peak);
        }
    }
    max_dd * 100.0
}

/// Rounds half away from zero to `decimals` places. Non-finite values pass through.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
