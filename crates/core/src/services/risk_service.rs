use std::collections::BTreeMap;

use crate::models::analytics::RiskRecord;
use crate::models::chart::{SectorSlice, TrendLine};
use crate::models::holding::HoldingRow;
use crate::models::price::PriceSeries;

/// Typical number of trading days in a year, used to annualize daily figures.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Per-symbol risk figures and portfolio-level allocation.
#[derive(Debug, Default)]
pub struct RiskService;

impl RiskService {
    pub fn new() -> Self {
        Self
    }

    /// Annualized volatility, mean return and max drawdown for one symbol.
    ///
    /// Returns `None` when the series has fewer than two closes (no returns
    /// can be formed), so the symbol stays out of the risk table.
    pub fn compute_risk(&self, symbol: &str, series: &PriceSeries) -> Option<RiskRecord> {
        if series.len() < 2 {
            return None;
        }

        let closes = series.closes();
        let returns = daily_returns(&closes);
        if returns.is_empty() {
            return None;
        }

        Some(RiskRecord {
            symbol: symbol.to_string(),
            volatility: sample_std_dev(&returns) * TRADING_DAYS_PER_YEAR.sqrt(),
            annual_return: mean(&returns) * TRADING_DAYS_PER_YEAR,
            max_drawdown: max_drawdown(&closes),
            observations: returns.len(),
        })
    }

    /// Risk records for every symbol with usable history, sorted by symbol.
    pub fn compute_risk_table<'a, I>(&self, histories: I) -> Vec<RiskRecord>
    where
        I: IntoIterator<Item = (&'a str, &'a PriceSeries)>,
    {
        let mut records: Vec<RiskRecord> = histories
            .into_iter()
            .filter_map(|(symbol, series)| self.compute_risk(symbol, series))
            .collect();
        records.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        records
    }

    /// Pie slices from the sector allocation, largest first.
    pub fn sector_slices(&self, allocation: &BTreeMap<String, f64>) -> Vec<SectorSlice> {
        let total: f64 = allocation.values().sum();
        let mut slices: Vec<SectorSlice> = allocation
            .iter()
            .map(|(sector, &value)| SectorSlice {
                sector: sector.clone(),
                value,
                allocation_pct: if total > 0.0 { value / total * 100.0 } else { 0.0 },
            })
            .collect();
        slices.sort_by(|a, b| {
            b.value
                .partial_cmp(&a.value)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        slices
    }

    /// Ordinary least squares fit of annual return on volatility.
    ///
    /// `None` with fewer than two records or when every record has the same
    /// volatility (vertical line, slope undefined).
    pub fn trend_line(&self, records: &[RiskRecord]) -> Option<TrendLine> {
        if records.len() < 2 {
            return None;
        }
        let xs: Vec<f64> = records.iter().map(|r| r.volatility).collect();
        let ys: Vec<f64> = records.iter().map(|r| r.annual_return).collect();
        let (mean_x, mean_y) = (mean(&xs), mean(&ys));

        let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
        if sxx.abs() < f64::EPSILON {
            return None;
        }
        let sxy: f64 = xs
            .iter()
            .zip(&ys)
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();

        let slope = sxy / sxx;
        Some(TrendLine {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }
}

/// Sum of `current_value` per sector over priced rows.
/// Rows without a live price are skipped, never counted as zero.
pub fn sector_allocation(rows: &[HoldingRow]) -> BTreeMap<String, f64> {
    let mut allocation = BTreeMap::new();
    for row in rows {
        if let Some(current) = row.current_value {
            *allocation.entry(row.sector.clone()).or_insert(0.0) += current;
        }
    }
    allocation
}

/// Simple returns `(p[t] - p[t-1]) / p[t-1]` for each consecutive pair.
/// Pairs whose previous close is not positive are skipped.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Largest peak-to-trough decline as a fraction (0.0 or negative).
pub fn max_drawdown(closes: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &price in closes {
        peak = peak.max(price);
        if peak > 0.0 {
            worst = worst.min((price - peak) / peak);
        }
    }
    worst
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator). A single observation has
/// no spread to measure and yields 0.0.
fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0);
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_std_dev_uses_n_minus_one() {
        // mean 2, squared deviations 1 + 0 + 1 = 2, / (3 - 1) = 1
        assert!((sample_std_dev(&[1.0, 2.0, 3.0]) - 1.0).abs() < 1e-12);
        assert_eq!(sample_std_dev(&[0.05]), 0.0);
        assert_eq!(sample_std_dev(&[]), 0.0);
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }
}
