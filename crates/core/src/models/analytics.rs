use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Annualized risk figures for one symbol over the lookback window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRecord {
    pub symbol: String,

    /// Sample standard deviation of daily returns × √252
    pub volatility: f64,

    /// Mean daily return × 252
    pub annual_return: f64,

    /// Worst peak-to-trough decline as a fraction (≤ 0)
    pub max_drawdown: f64,

    /// Number of daily returns the figures were computed from
    pub observations: usize,
}

/// Aggregate figures across all holdings at the as-of date.
///
/// Totals only include rows that have a live price. Rows without one are
/// listed in `unpriced_symbols` and their cost is reported separately in
/// `excluded_invested`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Date this summary was computed for
    pub as_of_date: chrono::NaiveDate,

    /// Sum of `invested_value` over priced rows
    pub total_invested: f64,

    /// Sum of `current_value` over priced rows
    pub total_current: f64,

    /// `total_current - total_invested`
    pub total_profit_loss: f64,

    /// `total_profit_loss / total_invested * 100`, `None` when nothing was invested
    pub portfolio_return_pct: Option<f64>,

    /// Sector name → summed current value (priced rows only)
    pub sector_allocation: BTreeMap<String, f64>,

    /// Number of rows that contributed to the totals
    pub priced_holdings: usize,

    /// Symbols whose live price was unavailable, in upload order, deduplicated
    pub unpriced_symbols: Vec<String>,

    /// Invested value of the rows left out of the totals
    pub excluded_invested: f64,
}

/// Portfolio return set against the reference index over the lookback window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    /// Index ticker (e.g., "^NSEI")
    pub benchmark_symbol: String,

    /// First and last dates of the benchmark series used
    pub window_start: chrono::NaiveDate,
    pub window_end: chrono::NaiveDate,

    /// Simple return of the portfolio in percent, `None` when undefined
    pub portfolio_return_pct: Option<f64>,

    /// `(last - first) / first * 100` over the benchmark closes
    pub benchmark_return_pct: f64,
}

impl BenchmarkComparison {
    /// Portfolio return minus benchmark return, in percentage points.
    pub fn excess_return_pct(&self) -> Option<f64> {
        self.portfolio_return_pct
            .map(|p| p - self.benchmark_return_pct)
    }
}

/// Result of the comparison section. A missing benchmark only skips this section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BenchmarkOutcome {
    Compared(BenchmarkComparison),
    Unavailable { reason: String },
}

impl BenchmarkOutcome {
    pub fn comparison(&self) -> Option<&BenchmarkComparison> {
        match self {
            BenchmarkOutcome::Compared(c) => Some(c),
            BenchmarkOutcome::Unavailable { .. } => None,
        }
    }
}
