//! Forward equity band extrapolated from realized return statistics.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::domain::metrics::{ReturnStats, round_to};

pub const MIN_PROJECTION_DAYS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionBand {
    pub dates: Vec<NaiveDate>,
    pub upper: Vec<f64>,
    pub mid: Vec<f64>,
    pub lower: Vec<f64>,
}

/// `max(5, bars / 4)`.
pub fn projection_horizon(bar_count: usize) -> usize {
    MIN_PROJECTION_DAYS.max(bar_count / 4)
}

/// The `count` weekdays following `last`.
pub fn business_days_after(last: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut cur = last;
    while dates.len() < count {
        cur = match cur.checked_add_days(Days::new(1)) {
            Some(d) => d,
            None => break,
        };
        if !matches!(cur.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(cur);
        }
    }
    dates
}

/// Compounds `last_equity` forward by `mean`, `mean + std` and `mean - std`
/// per step, rounded to 2 decimals.
pub fn project(
    last_equity: f64,
    last_date: NaiveDate,
    stats: ReturnStats,
    horizon: usize,
) -> ProjectionBand {
    let dates = business_days_after(last_date, horizon);
    let path = |rate: f64| -> Vec<f64> {
        (1..=dates.len())
            .map(|i| round_to(last_equity * (1.0 + rate).powi(i as i32), 2))
            .collect()
    };

    ProjectionBand {
        upper: path(stats.mean + stats.std),
        mid: path(stats.mean),
        lower: path(stats.mean - stats.std),
        dates,
    }
}
