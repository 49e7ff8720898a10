use std::collections::HashMap;

use super::alphavantage::AlphaVantageProvider;
use super::traits::MarketDataProvider;
use super::yahoo_finance::YahooFinanceProvider;

/// Ordered set of market data providers.
///
/// Registration order is fallback order: `MarketDataService` asks the first
/// provider and moves on to the next one only when a lookup fails.
pub struct ProviderRegistry {
    providers: Vec<Box<dyn MarketDataProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with all default providers pre-configured.
    pub fn new_with_defaults(api_keys: &HashMap<String, String>) -> Self {
        let mut registry = Self::new();

        // Yahoo Finance: no API key needed (primary)
        match YahooFinanceProvider::new() {
            Ok(yahoo) => registry.register(Box::new(yahoo)),
            Err(e) => tracing::warn!(error = %e, "Yahoo Finance provider unavailable"),
        }

        // Alpha Vantage: requires API key (fallback)
        if let Some(key) = api_keys.get("alphavantage") {
            registry.register(Box::new(AlphaVantageProvider::new(key.clone())));
        }

        registry
    }

    /// Register a new provider at the end of the fallback chain.
    pub fn register(&mut self, provider: Box<dyn MarketDataProvider>) {
        self.providers.push(provider);
    }

    /// All providers in fallback order.
    pub fn providers(&self) -> Vec<&dyn MarketDataProvider> {
        self.providers.iter().map(|p| p.as_ref()).collect()
    }

    /// Names of all providers in fallback order.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
