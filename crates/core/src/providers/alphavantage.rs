use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::price::PricePoint;
use super::traits::MarketDataProvider;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER: &str = "Alpha Vantage";

/// Alpha Vantage API provider for stock/equity prices and fundamentals.
///
/// - **Free tier**: 25 requests/day (across ALL endpoints).
/// - **Requires**: API key (set via settings as "alphavantage").
/// - **Coverage**: 100k+ global equity symbols.
/// - **History**: compact daily series (last 100 trading days). That is
///   shorter than a one-year window, so this is a fallback only.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, api_key }
    }
}

// ── Alpha Vantage API response types ────────────────────────────────

#[derive(Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
}

#[derive(Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
}

#[derive(Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyData>>,
}

#[derive(Deserialize)]
struct DailyData {
    #[serde(rename = "4. close")]
    close: String,
}

#[derive(Deserialize)]
struct OverviewResponse {
    #[serde(rename = "Sector")]
    sector: Option<String>,
}

#[async_trait]
impl MarketDataProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<f64, CoreError> {
        let resp: GlobalQuoteResponse = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", &symbol.to_uppercase()),
                ("apikey", &self.api_key),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse quote for {symbol}: {e}"),
            })?;

        let price_str = resp
            .global_quote
            .and_then(|q| q.price)
            .ok_or_else(|| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("No quote data for {symbol}. API limit may be exceeded."),
            })?;

        price_str.parse().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Invalid price format for {symbol}: {e}"),
        })
    }

    async fn get_sector(&self, symbol: &str) -> Result<String, CoreError> {
        let resp: OverviewResponse = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", "OVERVIEW"),
                ("symbol", &symbol.to_uppercase()),
                ("apikey", &self.api_key),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse overview for {symbol}: {e}"),
            })?;

        // Unknown symbols come back as "{}"; the API also uses "None" for unclassified ones.
        resp.sector
            .filter(|s| !s.trim().is_empty() && s != "None")
            .map(|s| title_case(&s))
            .ok_or_else(|| CoreError::LookupUnavailable {
                symbol: symbol.to_string(),
                message: "no sector in company overview".into(),
            })
    }

    async fn get_historical_closes(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        let time_series = self.fetch_daily_series(symbol).await?;

        let mut points: Vec<PricePoint> = time_series
            .iter()
            .filter_map(|(date_str, data)| {
                let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;
                if date >= from && date <= to {
                    let price: f64 = data.close.parse().ok()?;
                    Some(PricePoint::new(date, price))
                } else {
                    None
                }
            })
            .collect();

        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}

impl AlphaVantageProvider {
    /// Fetch the daily time series for a stock symbol.
    /// Returns compact data (last 100 trading days).
    async fn fetch_daily_series(
        &self,
        symbol: &str,
    ) -> Result<HashMap<String, DailyData>, CoreError> {
        let resp: TimeSeriesResponse = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", &symbol.to_uppercase()),
                ("outputsize", "compact"),
                ("apikey", &self.api_key),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse time series for {symbol}: {e}"),
            })?;

        resp.time_series.ok_or_else(|| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("No time series data for {symbol}. API limit may be exceeded."),
        })
    }
}

/// "TECHNOLOGY" → "Technology", "LIFE SCIENCES" → "Life Sciences".
/// Overview sectors are upper-case while Yahoo's are title case.
pub(crate) fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
