use chrono::NaiveDate;

use crate::models::analytics::PortfolioSummary;
use crate::models::holding::{Holding, HoldingRow};

/// Days per year used when converting a holding period to years.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Computes per-row valuation columns and the portfolio totals.
///
/// A missing live price leaves every price-dependent column `None`; those
/// rows are kept in the table but left out of totals and sector sums.
#[derive(Debug, Default)]
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Enrich one holding with its live price and sector.
    pub fn compute_valuation(
        &self,
        holding: &Holding,
        live_price: Option<f64>,
        sector: impl Into<String>,
        as_of: NaiveDate,
    ) -> HoldingRow {
        let invested_value = holding.invested_value();
        let years_held = years_between(holding.buy_date, as_of);

        let current_value = live_price.map(|price| price * holding.quantity);
        let profit_loss = current_value.map(|current| current - invested_value);
        let return_pct = profit_loss.and_then(|pl| percent_of(pl, invested_value));
        let cagr = live_price.map(|price| calculate_cagr(holding.buy_price, price, years_held));

        HoldingRow {
            symbol: holding.symbol.clone(),
            quantity: holding.quantity,
            buy_price: holding.buy_price,
            buy_date: holding.buy_date,
            live_price,
            current_value,
            invested_value,
            profit_loss,
            return_pct,
            years_held,
            cagr,
            sector: sector.into(),
        }
    }

    /// Totals over the priced rows, plus a record of what was left out.
    pub fn summarize(&self, rows: &[HoldingRow], as_of: NaiveDate) -> PortfolioSummary {
        let mut total_invested = 0.0;
        let mut total_current = 0.0;
        let mut priced_holdings = 0;
        let mut excluded_invested = 0.0;
        let mut unpriced_symbols: Vec<String> = Vec::new();

        for row in rows {
            match row.current_value {
                Some(current) => {
                    total_invested += row.invested_value;
                    total_current += current;
                    priced_holdings += 1;
                }
                None => {
                    excluded_invested += row.invested_value;
                    if !unpriced_symbols.contains(&row.symbol) {
                        unpriced_symbols.push(row.symbol.clone());
                    }
                }
            }
        }

        let total_profit_loss = total_current - total_invested;

        PortfolioSummary {
            as_of_date: as_of,
            total_invested,
            total_current,
            total_profit_loss,
            portfolio_return_pct: percent_of(total_profit_loss, total_invested),
            sector_allocation: super::risk_service::sector_allocation(rows),
            priced_holdings,
            unpriced_symbols,
            excluded_invested,
        }
    }
}

/// Compound annual growth rate as a fraction.
///
/// `(end / start)^(1 / years) - 1`, or `0.0` when `start <= 0` or
/// `years <= 0` (a holding bought today has no defined growth rate).
pub fn calculate_cagr(start_value: f64, end_value: f64, years: f64) -> f64 {
    if start_value > 0.0 && years > 0.0 {
        (end_value / start_value).powf(1.0 / years) - 1.0
    } else {
        0.0
    }
}

/// Holding period in years: whole days between the dates divided by 365.
/// Negative when `from` is after `to`.
pub fn years_between(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days() as f64 / DAYS_PER_YEAR
}

/// `part / whole * 100`, `None` when `whole` is zero.
pub fn percent_of(part: f64, whole: f64) -> Option<f64> {
    if whole == 0.0 {
        None
    } else {
        Some(part / whole * 100.0)
    }
}
