use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use time::OffsetDateTime;

use crate::errors::CoreError;
use crate::models::price::PricePoint;
use super::traits::MarketDataProvider;

const PROVIDER: &str = "Yahoo Finance";
const SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";
// The search endpoint rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) portfolio-analyzer";

/// Yahoo Finance provider for equities and indices.
///
/// - **Free**: No API key required.
/// - **Coverage**: Global equities, ETFs, indices (e.g. "^NSEI", "RELIANCE.NS").
/// - **Data**: Latest quote and daily history through the `yahoo_finance_api`
///   crate; sector through the public search endpoint, whose equity results
///   carry a `sector` field.
///
/// Prices are in the symbol's listing currency. No conversion is applied.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
    client: Client,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { connector, client })
    }

    /// Convert a `chrono::NaiveDate` to `time::OffsetDateTime` (midnight UTC).
    fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime, CoreError> {
        let invalid = |e: String| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Invalid date {date}: {e}"),
        };
        let month = time::Month::try_from(date.month() as u8).map_err(|e| invalid(e.to_string()))?;
        let odt = time::Date::from_calendar_date(date.year(), month, date.day() as u8)
            .map_err(|e| invalid(e.to_string()))?
            .with_hms(0, 0, 0)
            .map_err(|e| invalid(e.to_string()))?
            .assume_utc();
        Ok(odt)
    }

    /// Convert a unix timestamp (seconds) to `chrono::NaiveDate`.
    fn timestamp_to_naive_date(ts: i64) -> Option<NaiveDate> {
        chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
    }
}

// ── Search endpoint response types ──────────────────────────────────

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Deserialize)]
struct SearchQuote {
    symbol: Option<String>,
    sector: Option<String>,
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<f64, CoreError> {
        let resp = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to fetch latest quote for {symbol}: {e}"),
            })?;

        let quote = resp.last_quote().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("No quote data for {symbol}: {e}"),
        })?;

        Ok(quote.close)
    }

    async fn get_sector(&self, symbol: &str) -> Result<String, CoreError> {
        let resp: SearchResponse = self
            .client
            .get(SEARCH_URL)
            .query(&[("q", symbol), ("quotesCount", "5"), ("newsCount", "0")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse search result for {symbol}: {e}"),
            })?;

        resp.quotes
            .into_iter()
            .find(|q| {
                q.symbol
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(symbol))
            })
            .and_then(|q| q.sector)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| CoreError::LookupUnavailable {
                symbol: symbol.to_string(),
                message: "no sector classification in search results".into(),
            })
    }

    async fn get_historical_closes(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        let start = Self::to_offset_datetime(from)?;
        let end = Self::to_offset_datetime(to + chrono::Duration::days(1))?; // inclusive end

        let resp = self
            .connector
            .get_quote_history(symbol, start, end)
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to fetch history for {symbol}: {e}"),
            })?;

        let quotes = resp.quotes().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse quotes for {symbol}: {e}"),
        })?;

        let points: Vec<PricePoint> = quotes
            .iter()
            .filter_map(|q| {
                let date = Self::timestamp_to_naive_date(q.timestamp as i64)?;
                (date >= from && date <= to).then(|| PricePoint::new(date, q.close))
            })
            .collect();

        Ok(points)
    }
}
