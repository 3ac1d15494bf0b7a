//! Working frame: the borrowed price series plus named derived columns.
//!
//! Transforms never mutate a frame they are handed. They clone it (bars are
//! borrowed, so only the column map is copied) and return the extended copy.

use std::collections::BTreeMap;

use crate::domain::ohlcv::PriceBar;

/// One value per bar; `None` marks an undefined entry (warm-up, guarded division).
pub type Column = Vec<Option<f64>>;

/// Name of the column every strategy must produce.
pub const SIGNAL_COLUMN: &str = "signal";

/// Name of the column the RSI indicator produces.
pub const RSI_COLUMN: &str = "rsi";

#[derive(Debug, Clone, PartialEq)]
pub struct PriceFrame<'a> {
    bars: &'a [PriceBar],
    columns: BTreeMap<String, Column>,
}

impl<'a> PriceFrame<'a> {
    pub fn new(bars: &'a [PriceBar]) -> Self {
        Self {
            bars,
            columns: BTreeMap::new(),
        }
    }

    pub fn bars(&self) -> &'a [PriceBar] {
        self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a copy of this frame with `name` set to `values`.
    ///
    /// Lengths are not checked here; see [`PriceFrame::misaligned_column`].
    pub fn with_column(&self, name: impl Into<String>, values: Column) -> Self {
        let mut next = self.clone();
        next.columns.insert(name.into(), values);
        next
    }

    /// First column (by name) whose length differs from the bar count, with
    /// that length.
    pub fn misaligned_column(&self) -> Option<(&str, usize)> {
        self.columns
            .iter()
            .find(|(_, values)| values.len() != self.bars.len())
            .map(|(name, values)| (name.as_str(), values.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars() -> Vec<PriceBar> {
        (1..=3)
            .map(|d| PriceBar {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, d)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: d as f64,
                volume: 0.0,
            })
            .collect()
    }

    #[test]
    fn with_column_leaves_original_untouched() {
        let bars = bars();
        let base = PriceFrame::new(&bars);
        let extended = base.with_column("x", vec![None, Some(1.0), Some(2.0)]);

        assert!(!base.has_column("x"));
        assert!(extended.has_column("x"));
        assert_eq!(extended.column("x").unwrap()[1], Some(1.0));
    }

    #[test]
    fn closes_follow_bars() {
        let bars = bars();
        let frame = PriceFrame::new(&bars);
        assert_eq!(frame.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(frame.len(), 3);
        assert!(!frame.is_empty());
    }

    #[test]
    fn misaligned_column_reports_short_series() {
        let bars = bars();
        let aligned = PriceFrame::new(&bars).with_column("a", vec![None; 3]);
        assert_eq!(aligned.misaligned_column(), None);

        let short = aligned.with_column("b", vec![Some(1.0); 2]);
        assert_eq!(short.misaligned_column(), Some(("b", 2)));
    }

    #[test]
    fn columns_iterate_by_name() {
        let bars = bars();
        let frame = PriceFrame::new(&bars)
            .with_column("sma_2", vec![None; 3])
            .with_column("rsi", vec![None; 3]);
        let names: Vec<&str> = frame.columns().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["rsi", "sma_2"]);
    }
}
