pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use chrono::NaiveDate;
use models::{
    holding::{Holding, HoldingRow, UNKNOWN_SECTOR},
    price::LookbackWindow,
    report::AnalysisReport,
    settings::AnalyzerSettings,
};
use providers::registry::ProviderRegistry;
use services::{
    benchmark_service::BenchmarkService, holdings_normalizer::HoldingsNormalizer,
    market_data_service::MarketDataService, risk_service::RiskService,
    valuation_service::ValuationService,
};

use errors::CoreError;

/// Main entry point for the Portfolio Analyzer core library.
///
/// Holds the settings and the services needed for an analysis. Each call to
/// `analyze_upload` / `analyze_holdings` is one self-contained run: nothing
/// from a previous run is kept.
#[must_use]
pub struct PortfolioAnalyzer {
    settings: AnalyzerSettings,
    normalizer: HoldingsNormalizer,
    market_data: MarketDataService,
    valuation_service: ValuationService,
    risk_service: RiskService,
    benchmark_service: BenchmarkService,
}

impl std::fmt::Debug for PortfolioAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioAnalyzer")
            .field("benchmark", &self.settings.benchmark_symbol)
            .field("lookback_days", &self.settings.lookback_days)
            .field("providers", &self.market_data.provider_names())
            .finish()
    }
}

impl PortfolioAnalyzer {
    /// Create an analyzer with the default providers for the configured API keys.
    pub fn new(settings: AnalyzerSettings) -> Result<Self, CoreError> {
        let registry = ProviderRegistry::new_with_defaults(&settings.api_keys);
        Self::with_registry(settings, registry)
    }

    /// Create an analyzer backed by a caller-supplied provider chain.
    pub fn with_registry(settings: AnalyzerSettings, registry: ProviderRegistry) -> Result<Self, CoreError> {
        settings.validate()?;
        let market_data = MarketDataService::from_settings(registry, &settings);
        Ok(Self {
            settings,
            normalizer: HoldingsNormalizer::new(),
            market_data,
            valuation_service: ValuationService::new(),
            risk_service: RiskService::new(),
            benchmark_service: BenchmarkService::new(),
        })
    }

    #[must_use]
    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// Names of the market data providers, in fallback order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        self.market_data.provider_names()
    }

    /// Parse an uploaded holdings file and analyze it.
    ///
    /// Upload errors (`Parse`, `Schema`, `InvalidRow`) abort the run. Market
    /// data failures never do.
    pub async fn analyze_upload(
        &self,
        file_name: &str,
        bytes: &[u8],
        as_of: NaiveDate,
    ) -> Result<AnalysisReport, CoreError> {
        let holdings = self.normalizer.parse_upload(file_name, bytes)?;
        Ok(self.analyze_holdings(&holdings, as_of).await)
    }

    /// Analyze already-validated holdings as of the given date.
    pub async fn analyze_holdings(&self, holdings: &[Holding], as_of: NaiveDate) -> AnalysisReport {
        tracing::info!(holdings = holdings.len(), %as_of, "analysis started");
        let window = LookbackWindow::trailing(as_of, self.settings.lookback_days);

        let symbols: Vec<String> = holdings.iter().map(|h| h.symbol.clone()).collect();
        let (market, benchmark_series) = tokio::join!(
            self.market_data.fetch_all(&symbols, window),
            self.market_data
                .fetch_benchmark(&self.settings.benchmark_symbol, window),
        );

        // Join market data back to rows by symbol.
        let rows: Vec<HoldingRow> = holdings
            .iter()
            .map(|holding| match market.get(&holding.symbol) {
                Some(data) => self.valuation_service.compute_valuation(
                    holding,
                    data.live_price,
                    data.sector.as_str(),
                    as_of,
                ),
                None => self
                    .valuation_service
                    .compute_valuation(holding, None, UNKNOWN_SECTOR, as_of),
            })
            .collect();

        let summary = self.valuation_service.summarize(&rows, as_of);
        let sector_slices = self.risk_service.sector_slices(&summary.sector_allocation);

        let risk = self.risk_service.compute_risk_table(
            market
                .values()
                .map(|data| (data.symbol.as_str(), &data.history)),
        );
        let risk_trend = self.risk_service.trend_line(&risk);

        let benchmark = self.benchmark_service.outcome(
            &self.settings.benchmark_symbol,
            &benchmark_series,
            summary.total_invested,
            summary.total_current,
        );

        tracing::info!(
            priced = summary.priced_holdings,
            unpriced = summary.unpriced_symbols.len(),
            risk_records = risk.len(),
            "analysis finished"
        );

        AnalysisReport {
            as_of_date: as_of,
            holdings: rows,
            summary,
            sector_slices,
            risk,
            risk_trend,
            benchmark,
        }
    }
}
