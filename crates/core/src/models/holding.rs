use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sector name used whenever the market data gateway cannot classify a symbol.
pub const UNKNOWN_SECTOR: &str = "Unknown";

/// One validated position from the uploaded holdings file.
///
/// Produced by the holdings normalizer; everything downstream works from this
/// strongly-typed row instead of raw table cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker symbol, trimmed and uppercased (e.g., "AAPL", "RELIANCE.NS")
    pub symbol: String,

    /// Number of shares held
    pub quantity: f64,

    /// Price paid per share
    pub buy_price: f64,

    /// Date the position was opened
    pub buy_date: NaiveDate,
}

impl Holding {
    pub fn new(symbol: impl Into<String>, quantity: f64, buy_price: f64, buy_date: NaiveDate) -> Self {
        Self {
            symbol: symbol.into().trim().to_uppercase(),
            quantity,
            buy_price,
            buy_date,
        }
    }

    /// `buy_price * quantity`. Always known, independent of market data.
    pub fn invested_value(&self) -> f64 {
        self.buy_price * self.quantity
    }
}

/// A holding enriched with live market data and derived valuation columns.
///
/// Fields that depend on the live price are `None` when the price lookup
/// failed. `return_pct` is also `None` when `invested_value` is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingRow {
    pub symbol: String,
    pub quantity: f64,
    pub buy_price: f64,
    pub buy_date: NaiveDate,

    /// Latest market price, `None` when no provider could supply one
    pub live_price: Option<f64>,

    /// `live_price * quantity`
    pub current_value: Option<f64>,

    /// `buy_price * quantity`
    pub invested_value: f64,

    /// `current_value - invested_value`
    pub profit_loss: Option<f64>,

    /// `profit_loss / invested_value * 100`
    pub return_pct: Option<f64>,

    /// Days between buy date and the as-of date, divided by 365
    pub years_held: f64,

    /// Compound annual growth rate as a fraction (0.2247 = 22.47%)
    pub cagr: Option<f64>,

    /// Sector classification, `"Unknown"` when the lookup failed
    pub sector: String,
}

impl HoldingRow {
    /// Whether a live price was available for this row.
    pub fn is_priced(&self) -> bool {
        self.live_price.is_some()
    }
}
