use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::price::PricePoint;

/// Trait abstraction for all market data sources.
///
/// Each API provider (Yahoo Finance, Alpha Vantage) implements this trait;
/// `MarketDataService` tries them in registry order.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Latest traded or closing price of a symbol in its listing currency.
    async fn get_latest_price(&self, symbol: &str) -> Result<f64, CoreError>;

    /// Sector classification of a symbol (e.g., "Technology").
    async fn get_sector(&self, symbol: &str) -> Result<String, CoreError>;

    /// Daily closes between `from` and `to` inclusive.
    /// May return an empty Vec when the symbol has no trading history there.
    async fn get_historical_closes(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError>;
}
