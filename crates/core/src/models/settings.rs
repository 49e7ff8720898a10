use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::errors::CoreError;

/// User-configurable analyzer settings.
///
/// Every field has a default, so a settings file only needs the keys it
/// overrides (an empty `{}` is valid).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    /// Ticker of the reference index for the comparison section.
    pub benchmark_symbol: String,

    /// Display name of the reference index.
    pub benchmark_name: String,

    /// Trailing window in calendar days for risk history and the benchmark.
    pub lookback_days: u32,

    /// Per-lookup timeout. A lookup that times out counts as unavailable.
    pub lookup_timeout_secs: u64,

    /// Maximum number of symbols looked up at the same time.
    pub max_concurrent_lookups: usize,

    /// Prefix for monetary values when rendering.
    pub currency_symbol: String,

    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "alphavantage"). Values: the API key string.
    pub api_keys: HashMap<String, String>,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            benchmark_symbol: "^NSEI".to_string(),
            benchmark_name: "NIFTY 50".to_string(),
            lookback_days: 365,
            lookup_timeout_secs: 15,
            max_concurrent_lookups: 4,
            currency_symbol: "₹".to_string(),
            api_keys: HashMap::new(),
        }
    }
}

impl AnalyzerSettings {
    /// Parse and validate settings from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a JSON settings file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.benchmark_symbol.trim().is_empty() {
            return Err(CoreError::InvalidSettings(
                "benchmark_symbol must not be empty".into(),
            ));
        }
        if self.lookback_days < 2 {
            return Err(CoreError::InvalidSettings(format!(
                "lookback_days must be at least 2, got {}",
                self.lookback_days
            )));
        }
        if self.lookup_timeout_secs == 0 {
            return Err(CoreError::InvalidSettings(
                "lookup_timeout_secs must be at least 1".into(),
            ));
        }
        if self.max_concurrent_lookups == 0 {
            return Err(CoreError::InvalidSettings(
                "max_concurrent_lookups must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
