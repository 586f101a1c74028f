//! Market-data capability consumed by the metrics calculator.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Source of closing-price histories and display names.
///
/// Implementations own fetching, caching and rate limiting; the numeric core
/// only sees the resulting price sequence.
pub trait MetricsProvider: Send + Sync {
    /// Daily closing prices for `symbol`, oldest first.
    fn price_history(&self, symbol: &str) -> Result<Vec<f64>>;

    /// Best-effort display name. `None` makes callers fall back to the symbol.
    fn display_name(&self, _symbol: &str) -> Option<String> {
        None
    }
}

impl<P: MetricsProvider + ?Sized> MetricsProvider for &P {
    fn price_history(&self, symbol: &str) -> Result<Vec<f64>> {
        (**self).price_history(symbol)
    }

    fn display_name(&self, symbol: &str) -> Option<String> {
        (**self).display_name(symbol)
    }
}

/// Stored history for one instrument.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct InstrumentHistory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub closes: Vec<f64>,
}

/// Provider backed by an in-memory symbol map.
///
/// The JSON form is an object keyed by symbol:
///
/// ```json
/// { "AAPL": { "name": "Apple Inc.", "closes": [189.1, 190.4, 188.7] } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct InMemoryProvider {
    histories: HashMap<String, InstrumentHistory>,
}

impl InMemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a history, replacing any previous one for the symbol.
    pub fn insert(&mut self, symbol: &str, name: Option<&str>, closes: Vec<f64>) {
        self.histories.insert(
            symbol.to_uppercase(),
            InstrumentHistory {
                name: name.map(str::to_string),
                closes,
            },
        );
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, symbol: &str, name: Option<&str>, closes: Vec<f64>) -> Self {
        self.insert(symbol, name, closes);
        self
    }

    /// Load a provider from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let provider: Self = serde_json::from_str(&content)?;
        // Keys are matched case-insensitively
        Ok(Self {
            histories: provider
                .histories
                .into_iter()
                .map(|(symbol, history)| (symbol.to_uppercase(), history))
                .collect(),
        })
    }

    /// Symbols with a stored history.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.histories.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }
}

impl MetricsProvider for InMemoryProvider {
    fn price_history(&self, symbol: &str) -> Result<Vec<f64>> {
        self.histories
            .get(&symbol.to_uppercase())
            .map(|h| h.closes.clone())
            .ok_or_else(|| Error::UpstreamFetch {
                symbol: symbol.to_string(),
                reason: "no price history available".to_string(),
            })
    }

    fn display_name(&self, symbol: &str) -> Option<String> {
        self.histories
            .get(&symbol.to_uppercase())
            .and_then(|h| h.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_in_memory_lookup_is_case_insensitive() {
        let provider = InMemoryProvider::new().with("aapl", Some("Apple Inc."), vec![1.0, 2.0]);

        assert_eq!(provider.price_history("AAPL").unwrap(), vec![1.0, 2.0]);
        assert_eq!(provider.display_name("Aapl"), Some("Apple Inc.".to_string()));
        assert_eq!(provider.symbols(), vec!["AAPL".to_string()]);
    }

    #[test]
    fn test_unknown_symbol_is_upstream_failure() {
        let provider = InMemoryProvider::new();
        let err = provider.price_history("MSFT").unwrap_err();

        assert!(matches!(err, Error::UpstreamFetch { ref symbol, .. } if symbol == "MSFT"));
        assert!(provider.display_name("MSFT").is_none());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"spy": {{"name": "SPDR S&P 500", "closes": [400.0, 401.5]}}, "BND": {{"closes": [72.0, 71.9]}}}}"#
        )
        .unwrap();

        let provider = InMemoryProvider::from_json_file(file.path()).unwrap();

        assert_eq!(provider.len(), 2);
        assert_eq!(provider.price_history("SPY").unwrap(), vec![400.0, 401.5]);
        assert!(provider.display_name("BND").is_none());
    }

    #[test]
    fn test_from_json_file_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = InMemoryProvider::from_json_file(file.path());
        assert!(matches!(result, Err(Error::Json(_))));
    }
}
