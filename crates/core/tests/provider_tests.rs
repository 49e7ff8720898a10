// ═══════════════════════════════════════════════════════════════════
// Provider Tests — Registry ordering, default wiring, trait objects
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

use portfolio_analyzer_core::errors::CoreError;
use portfolio_analyzer_core::models::price::PricePoint;
use portfolio_analyzer_core::providers::alphavantage::AlphaVantageProvider;
use portfolio_analyzer_core::providers::registry::ProviderRegistry;
use portfolio_analyzer_core::providers::traits::MarketDataProvider;
use portfolio_analyzer_core::providers::yahoo_finance::YahooFinanceProvider;

// ═══════════════════════════════════════════════════════════════════
// Test Helpers — Mock Providers
// ═══════════════════════════════════════════════════════════════════

/// A mock provider that answers every lookup with fixed data.
struct MockProvider {
    name: String,
}

impl MockProvider {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_latest_price(&self, _symbol: &str) -> Result<f64, CoreError> {
        Ok(100.0)
    }

    async fn get_sector(&self, _symbol: &str) -> Result<String, CoreError> {
        Ok("Technology".into())
    }

    async fn get_historical_closes(
        &self,
        _symbol: &str,
        from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        Ok(vec![PricePoint::new(from, 99.0)])
    }
}

/// A mock provider that always fails.
struct FailingProvider;

#[async_trait]
impl MarketDataProvider for FailingProvider {
    fn name(&self) -> &str {
        "Failing"
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<f64, CoreError> {
        Err(CoreError::Api {
            provider: "Failing".into(),
            message: format!("cannot price {symbol}"),
        })
    }

    async fn get_sector(&self, symbol: &str) -> Result<String, CoreError> {
        Err(CoreError::LookupUnavailable {
            symbol: symbol.into(),
            message: "no sector".into(),
        })
    }

    async fn get_historical_closes(
        &self,
        symbol: &str,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        Err(CoreError::Network(format!("connection reset while fetching {symbol}")))
    }
}

// ═══════════════════════════════════════════════════════════════════
// ProviderRegistry
// ═══════════════════════════════════════════════════════════════════

mod registry {
    use super::*;

    #[test]
    fn new_is_empty() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.providers().is_empty());
    }

    #[test]
    fn default_is_empty() {
        assert!(ProviderRegistry::default().is_empty());
    }

    #[test]
    fn registration_order_is_fallback_order() {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(MockProvider::new("Primary")));
        registry.register(Box::new(FailingProvider));
        registry.register(Box::new(MockProvider::new("Tertiary")));

        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.provider_names(),
            vec!["Primary".to_string(), "Failing".to_string(), "Tertiary".to_string()]
        );
        let names: Vec<&str> = registry.providers().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Primary", "Failing", "Tertiary"]);
    }

    #[test]
    fn defaults_without_keys_only_use_yahoo() {
        let registry = ProviderRegistry::new_with_defaults(&HashMap::new());
        let names = registry.provider_names();
        assert!(!names.contains(&"Alpha Vantage".to_string()));
        assert!(names.len() <= 1);
    }

    #[test]
    fn defaults_with_alphavantage_key_append_fallback() {
        let mut keys = HashMap::new();
        keys.insert("alphavantage".to_string(), "demo".to_string());
        let registry = ProviderRegistry::new_with_defaults(&keys);
        let names = registry.provider_names();
        assert_eq!(names.last().map(String::as_str), Some("Alpha Vantage"));
    }

    #[test]
    fn unrelated_keys_are_ignored() {
        let mut keys = HashMap::new();
        keys.insert("unknown_provider".to_string(), "abc".to_string());
        let registry = ProviderRegistry::new_with_defaults(&keys);
        assert!(!registry
            .provider_names()
            .contains(&"Alpha Vantage".to_string()));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Concrete providers (no network)
// ═══════════════════════════════════════════════════════════════════

mod concrete {
    use super::*;

    #[test]
    fn alphavantage_name() {
        let provider = AlphaVantageProvider::new("demo".into());
        assert_eq!(provider.name(), "Alpha Vantage");
    }

    #[test]
    fn yahoo_name() {
        let provider = YahooFinanceProvider::new().expect("connector builds offline");
        assert_eq!(provider.name(), "Yahoo Finance");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Trait objects
// ═══════════════════════════════════════════════════════════════════

mod trait_objects {
    use super::*;

    #[tokio::test]
    async fn mock_answers_through_dyn_trait() {
        let provider: Box<dyn MarketDataProvider> = Box::new(MockProvider::new("Mock"));
        let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        assert_eq!(provider.get_latest_price("AAPL").await.unwrap(), 100.0);
        assert_eq!(provider.get_sector("AAPL").await.unwrap(), "Technology");
        let history = provider.get_historical_closes("AAPL", day, day).await.unwrap();
        assert_eq!(history, vec![PricePoint::new(day, 99.0)]);
    }

    #[tokio::test]
    async fn failing_provider_reports_errors() {
        let provider: Box<dyn MarketDataProvider> = Box::new(FailingProvider);
        let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        assert!(matches!(
            provider.get_latest_price("AAPL").await,
            Err(CoreError::Api { .. })
        ));
        assert!(matches!(
            provider.get_sector("AAPL").await,
            Err(CoreError::LookupUnavailable { .. })
        ));
        assert!(matches!(
            provider.get_historical_closes("AAPL", day, day).await,
            Err(CoreError::Network(_))
        ));
    }
}
