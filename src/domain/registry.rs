//! Name → transform lookup.
//!
//! Registries are populated by explicit registration calls; the built-in sets
//! are listed in [`PluginRegistry::builtin_indicators`] and
//! [`PluginRegistry::builtin_strategies`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::error::BacktestError;
use crate::domain::frame::PriceFrame;
use crate::domain::indicator::{rsi::Rsi, sma::Sma};
use crate::domain::strategy::SmaCross;
use crate::domain::transform::{Params, Transform, filter_params};

#[derive(Clone, Default)]
pub struct PluginRegistry {
    entries: Vec<(String, Arc<dyn Transform>)>,
    index: HashMap<String, usize>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin_indicators() -> Self {
        let mut registry = Self::new();
        registry.register("sma", Arc::new(Sma));
        registry.register("rsi", Arc::new(Rsi));
        registry
    }

    pub fn builtin_strategies() -> Self {
        let mut registry = Self::new();
        registry.register("sma_cross", Arc::new(SmaCross));
        registry
    }

    /// Associates `name` with `transform`. Returns `false` when the name was
    /// already present; the entry keeps its position and takes the new transform.
    pub fn register(&mut self, name: impl Into<String>, transform: Arc<dyn Transform>) -> bool {
        let name = name.into();
        match self.index.get(&name) {
            Some(&i) => {
                self.entries[i].1 = transform;
                false
            }
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, transform));
                true
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Transform>> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// First registered entry, used when a caller names no strategy.
    pub fn first(&self) -> Option<(&str, &Arc<dyn Transform>)> {
        self.entries.first().map(|(n, t)| (n.as_str(), t))
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs the transform registered under `name` with `params` narrowed to
    /// the keys it declares. `None` if the name is not registered.
    pub fn invoke<'a>(
        &self,
        name: &str,
        frame: &PriceFrame<'a>,
        params: &Params,
    ) -> Option<Result<PriceFrame<'a>, BacktestError>> {
        let transform = self.get(name)?;
        let params = filter_params(transform.as_ref(), params);
        Some(transform.apply(frame, &params))
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("names", &self.names())
            .finish()
    }
}
