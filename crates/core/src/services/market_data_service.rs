use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::holding::UNKNOWN_SECTOR;
use crate::models::price::{LookbackWindow, PriceSeries, SymbolMarketData};
use crate::models::settings::AnalyzerSettings;
use crate::providers::registry::ProviderRegistry;

/// Fetches live prices, sectors and price history from the provider chain.
///
/// Every provider call runs under a timeout; a timeout counts as a failed
/// lookup and the next provider is tried. Failures never escape
/// `fetch_symbol_data` / `fetch_all`: they become `None` prices, the
/// `"Unknown"` sector or an empty history, and are logged at `warn`.
pub struct MarketDataService {
    registry: ProviderRegistry,
    timeout: Duration,
    max_concurrency: usize,
}

impl MarketDataService {
    pub fn new(registry: ProviderRegistry, timeout: Duration, max_concurrency: usize) -> Self {
        Self {
            registry,
            timeout,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn from_settings(registry: ProviderRegistry, settings: &AnalyzerSettings) -> Self {
        Self::new(
            registry,
            Duration::from_secs(settings.lookup_timeout_secs),
            settings.max_concurrent_lookups,
        )
    }

    /// Names of the configured providers, in fallback order.
    pub fn provider_names(&self) -> Vec<String> {
        self.registry.provider_names()
    }

    /// Latest price with automatic fallback across providers.
    ///
    /// Prices that are not finite or not strictly positive are rejected and
    /// the next provider is tried.
    pub async fn get_latest_price(&self, symbol: &str) -> Result<f64, CoreError> {
        let mut last_error = None;

        for provider in self.registry.providers() {
            tracing::debug!(provider = provider.name(), symbol, "fetching latest price");
            match self.with_timeout(symbol, provider.get_latest_price(symbol)).await {
                Ok(price) if price.is_finite() && price > 0.0 => return Ok(price),
                Ok(price) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!(
                            "Invalid price returned for {symbol}: {price} (must be finite and positive)"
                        ),
                    });
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or(CoreError::NoProvider))
    }

    /// Sector classification with automatic fallback across providers.
    pub async fn get_sector(&self, symbol: &str) -> Result<String, CoreError> {
        let mut last_error = None;

        for provider in self.registry.providers() {
            tracing::debug!(provider = provider.name(), symbol, "fetching sector");
            match self.with_timeout(symbol, provider.get_sector(symbol)).await {
                Ok(sector) if !sector.trim().is_empty() => return Ok(sector.trim().to_string()),
                Ok(_) => {
                    last_error = Some(CoreError::LookupUnavailable {
                        symbol: symbol.to_string(),
                        message: format!("{} returned an empty sector", provider.name()),
                    });
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or(CoreError::NoProvider))
    }

    /// Daily closes over `window`, ascending by date.
    ///
    /// An empty answer is not an error, but the next provider still gets a
    /// chance to supply data. The result is empty only if every provider that
    /// answered had nothing.
    pub async fn get_historical_closes(
        &self,
        symbol: &str,
        window: LookbackWindow,
    ) -> Result<PriceSeries, CoreError> {
        let mut last_error = None;
        let mut answered = false;

        for provider in self.registry.providers() {
            tracing::debug!(provider = provider.name(), symbol, "fetching price history");
            let lookup = provider.get_historical_closes(symbol, window.from, window.to);
            match self.with_timeout(symbol, lookup).await {
                Ok(points) => {
                    let series = PriceSeries::from_points(points);
                    if !series.is_empty() {
                        return Ok(series);
                    }
                    answered = true;
                }
                Err(e) => last_error = Some(e),
            }
        }

        if answered {
            return Ok(PriceSeries::new());
        }
        Err(last_error.unwrap_or(CoreError::NoProvider))
    }

    /// Price, sector and history for one symbol. Never fails.
    pub async fn fetch_symbol_data(&self, symbol: &str, window: LookbackWindow) -> SymbolMarketData {
        let (price, sector, history) = tokio::join!(
            self.get_latest_price(symbol),
            self.get_sector(symbol),
            self.get_historical_closes(symbol, window),
        );

        let live_price = match price {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(symbol, error = %e, "live price unavailable");
                None
            }
        };
        let sector = sector.unwrap_or_else(|e| {
            tracing::warn!(symbol, error = %e, "sector unavailable, using {UNKNOWN_SECTOR}");
            UNKNOWN_SECTOR.to_string()
        });
        let history = history.unwrap_or_else(|e| {
            tracing::warn!(symbol, error = %e, "price history unavailable");
            PriceSeries::new()
        });

        SymbolMarketData {
            symbol: symbol.to_string(),
            live_price,
            sector,
            history,
        }
    }

    /// Look up every distinct symbol with bounded concurrency.
    ///
    /// Results come back in completion order, so they are keyed by symbol:
    /// callers join them back to holding rows by symbol identity.
    pub async fn fetch_all(
        &self,
        symbols: &[String],
        window: LookbackWindow,
    ) -> HashMap<String, SymbolMarketData> {
        let mut seen = HashSet::new();
        let unique: Vec<&String> = symbols.iter().filter(|s| seen.insert(s.as_str())).collect();

        stream::iter(unique)
            .map(|symbol| self.fetch_symbol_data(symbol, window))
            .buffer_unordered(self.max_concurrency)
            .map(|data| (data.symbol.clone(), data))
            .collect()
            .await
    }

    /// Closes of the reference index over `window`. Empty on failure.
    pub async fn fetch_benchmark(&self, symbol: &str, window: LookbackWindow) -> PriceSeries {
        self.get_historical_closes(symbol, window)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(symbol, error = %e, "benchmark history unavailable");
                PriceSeries::new()
            })
    }

    async fn with_timeout<T, F>(&self, symbol: &str, lookup: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, CoreError>>,
    {
        tokio::time::timeout(self.timeout, lookup)
            .await
            .unwrap_or_else(|_| {
                Err(CoreError::LookupTimeout {
                    symbol: symbol.to_string(),
                    seconds: self.timeout.as_secs(),
                })
            })
    }
}
