use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single closing price (date → price).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Trailing window of daily closes for one symbol, ascending by date.
///
/// Construction sorts the points and drops non-finite prices and duplicate
/// dates (the last point for a date wins), so consumers can rely on strict
/// date ordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(mut points: Vec<PricePoint>) -> Self {
        points.retain(|p| p.price.is_finite());
        // Stable sort keeps provider order within a date; dedup then keeps the last.
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }
        Self { points: deduped }
    }

    /// Build a series from bare closes, one per consecutive day from `start`.
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Self {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint::new(start + chrono::Duration::days(i as i64), price))
            .collect();
        Self::from_points(points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Date window for historical lookups, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookbackWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl LookbackWindow {
    /// The `days`-long window ending on `as_of`.
    pub fn trailing(as_of: NaiveDate, days: u32) -> Self {
        Self {
            from: as_of - chrono::Duration::days(i64::from(days)),
            to: as_of,
        }
    }
}

/// Everything the market data gateway returned for one symbol.
///
/// Lookup failures are already folded in: `live_price` is `None`, `sector`
/// falls back to `"Unknown"` and `history` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolMarketData {
    pub symbol: String,
    pub live_price: Option<f64>,
    pub sector: String,
    pub history: PriceSeries,
}
