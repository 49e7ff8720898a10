use serde::{Deserialize, Serialize};

/// One slice of the sector allocation pie.
///
/// The core computes these; the frontend just renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorSlice {
    /// Sector name (e.g., "Technology", "Unknown")
    pub sector: String,

    /// Summed current value of the holdings in this sector
    pub value: f64,

    /// This sector's share of total current value × 100
    pub allocation_pct: f64,
}

/// Least-squares line through the risk/return scatter:
/// `annual_return ≈ slope × volatility + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn value_at(&self, volatility: f64) -> f64 {
        self.slope * volatility + self.intercept
    }
}
