use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::analytics::{BenchmarkOutcome, PortfolioSummary, RiskRecord};
use super::chart::{SectorSlice, TrendLine};
use super::holding::HoldingRow;

/// Everything one analysis run produces, ready for rendering.
///
/// Request-scoped: built once per upload and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub as_of_date: NaiveDate,

    /// Enriched holdings table, in upload order
    pub holdings: Vec<HoldingRow>,

    pub summary: PortfolioSummary,

    /// Sector pie, largest slice first
    pub sector_slices: Vec<SectorSlice>,

    /// One record per symbol with enough price history, sorted by symbol
    pub risk: Vec<RiskRecord>,

    /// Trend line for the risk/return scatter
    pub risk_trend: Option<TrendLine>,

    pub benchmark: BenchmarkOutcome,
}

impl AnalysisReport {
    /// Serialize the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, crate::errors::CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
