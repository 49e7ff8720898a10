//! Plain-text rendering of an analysis report.

use portfolio_analyzer_core::models::analytics::{BenchmarkOutcome, RiskRecord};
use portfolio_analyzer_core::models::chart::TrendLine;
use portfolio_analyzer_core::models::holding::HoldingRow;
use portfolio_analyzer_core::models::report::AnalysisReport;
use portfolio_analyzer_core::models::settings::AnalyzerSettings;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

const NOT_AVAILABLE: &str = "n/a";

// ── Display rows ────────────────────────────────────────────────────

#[derive(Tabled)]
struct HoldingLine {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Quantity")]
    quantity: String,
    #[tabled(rename = "BuyPrice")]
    buy_price: String,
    #[tabled(rename = "BuyDate")]
    buy_date: String,
    #[tabled(rename = "LivePrice")]
    live_price: String,
    #[tabled(rename = "CurrentValue")]
    current_value: String,
    #[tabled(rename = "InvestedValue")]
    invested_value: String,
    #[tabled(rename = "P/L")]
    profit_loss: String,
    #[tabled(rename = "Returns%")]
    return_pct: String,
    #[tabled(rename = "Years")]
    years: String,
    #[tabled(rename = "CAGR")]
    cagr: String,
    #[tabled(rename = "Sector")]
    sector: String,
}

impl HoldingLine {
    fn from_row(row: &HoldingRow) -> Self {
        Self {
            symbol: row.symbol.clone(),
            quantity: trim_number(row.quantity),
            buy_price: format!("{:.2}", row.buy_price),
            buy_date: row.buy_date.to_string(),
            live_price: opt(row.live_price, |v| format!("{v:.2}")),
            current_value: opt(row.current_value, |v| money(v, "")),
            invested_value: money(row.invested_value, ""),
            profit_loss: opt(row.profit_loss, |v| money(v, "")),
            return_pct: opt(row.return_pct, |v| format!("{v:.2}")),
            years: format!("{:.2}", row.years_held),
            cagr: opt(row.cagr, |v| format!("{:.2}%", v * 100.0)),
            sector: row.sector.clone(),
        }
    }
}

#[derive(Tabled)]
struct SectorLine {
    #[tabled(rename = "Sector")]
    sector: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Allocation")]
    allocation: String,
}

#[derive(Tabled)]
struct RiskLine {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Volatility")]
    volatility: String,
    #[tabled(rename = "AnnualReturn")]
    annual_return: String,
    #[tabled(rename = "Trend")]
    trend: String,
    #[tabled(rename = "MaxDrawdown")]
    max_drawdown: String,
    #[tabled(rename = "Days")]
    observations: usize,
}

impl RiskLine {
    fn from_record(record: &RiskRecord, trend: Option<&TrendLine>) -> Self {
        Self {
            symbol: record.symbol.clone(),
            volatility: percent(record.volatility),
            annual_return: percent(record.annual_return),
            trend: trend
                .map(|t| percent(t.value_at(record.volatility)))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            max_drawdown: percent(record.max_drawdown),
            observations: record.observations,
        }
    }
}

#[derive(Tabled)]
struct KeyValue {
    #[tabled(rename = "Metric")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl KeyValue {
    fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

// ── Report ──────────────────────────────────────────────────────────

/// Render the full report as titled plain-text tables.
pub fn render_report(report: &AnalysisReport, settings: &AnalyzerSettings) -> String {
    let cur = settings.currency_symbol.as_str();
    let summary = &report.summary;

    let holdings: Vec<HoldingLine> = report.holdings.iter().map(HoldingLine::from_row).collect();

    let mut totals = vec![
        KeyValue::new("Total Invested", money(summary.total_invested, cur)),
        KeyValue::new("Current Value", money(summary.total_current, cur)),
        KeyValue::new("Total P/L", money(summary.total_profit_loss, cur)),
        KeyValue::new(
            "Return",
            opt(summary.portfolio_return_pct, |v| format!("{v:.2}%")),
        ),
    ];
    if !summary.unpriced_symbols.is_empty() {
        totals.push(KeyValue::new(
            "Excluded (no live price)",
            format!(
                "{} ({} invested)",
                summary.unpriced_symbols.join(", "),
                money(summary.excluded_invested, cur)
            ),
        ));
    }

    let sectors: Vec<SectorLine> = report
        .sector_slices
        .iter()
        .map(|slice| SectorLine {
            sector: slice.sector.clone(),
            value: money(slice.value, cur),
            allocation: format!("{:.2}%", slice.allocation_pct),
        })
        .collect();

    let risk: Vec<RiskLine> = report
        .risk
        .iter()
        .map(|record| RiskLine::from_record(record, report.risk_trend.as_ref()))
        .collect();
    let mut risk_section = table(&risk);
    if let Some(trend) = &report.risk_trend {
        risk_section.push_str(&format!(
            "\nTrend: AnnualReturn = {:.4} x Volatility {:+.4}",
            trend.slope, trend.intercept
        ));
    }

    let benchmark = match &report.benchmark {
        BenchmarkOutcome::Compared(c) => table(&[
            KeyValue::new(
                "Portfolio Return (1Y)",
                opt(c.portfolio_return_pct, |v| format!("{v:.2}%")),
            ),
            KeyValue::new(
                format!("{} Return (1Y)", settings.benchmark_name),
                format!("{:.2}%", c.benchmark_return_pct),
            ),
            KeyValue::new(
                "Excess Return",
                opt(c.excess_return_pct(), |v| format!("{v:+.2}%")),
            ),
            KeyValue::new("Window", format!("{} to {}", c.window_start, c.window_end)),
        ]),
        BenchmarkOutcome::Unavailable { reason } => format!("Comparison unavailable: {reason}"),
    };

    [
        format!("Portfolio Analyzer (as of {})", report.as_of_date),
        section("Holdings", table(&holdings)),
        section("Portfolio Summary", table(&totals)),
        section("Sector Allocation", table(&sectors)),
        section("Volatility & Risk", risk_section),
        section(
            &format!("Portfolio vs {} Comparison", settings.benchmark_name),
            benchmark,
        ),
    ]
    .join("\n\n")
}

fn section(title: &str, body: String) -> String {
    format!("{title}\n{body}")
}

fn table<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .with(Modify::new(Columns::first()).with(Alignment::left()))
        .to_string()
}

// ── Formatting helpers ──────────────────────────────────────────────

fn opt(value: Option<f64>, format: impl Fn(f64) -> String) -> String {
    value.map(format).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Two decimals with the currency prefix after the sign: `-₹12.50`.
/// Values that round to zero carry no sign.
fn money(value: f64, prefix: &str) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{prefix}{:.2}", rounded.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use portfolio_analyzer_core::models::analytics::{BenchmarkComparison, PortfolioSummary};
    use portfolio_analyzer_core::models::chart::SectorSlice;
    use std::collections::BTreeMap;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(symbol: &str, live_price: Option<f64>) -> HoldingRow {
        HoldingRow {
            symbol: symbol.into(),
            quantity: 10.0,
            buy_price: 100.0,
            buy_date: d(2023, 10, 18),
            live_price,
            current_value: live_price.map(|p| p * 10.0),
            invested_value: 1000.0,
            profit_loss: live_price.map(|p| p * 10.0 - 1000.0),
            return_pct: live_price.map(|p| (p * 10.0 - 1000.0) / 10.0),
            years_held: 2.0,
            cagr: live_price.map(|_| 0.2247),
            sector: "Technology".into(),
        }
    }

    fn report(benchmark: BenchmarkOutcome) -> AnalysisReport {
        AnalysisReport {
            as_of_date: d(2025, 10, 17),
            holdings: vec![row("INFY.NS", Some(150.0)), row("DELISTED", None)],
            summary: PortfolioSummary {
                as_of_date: d(2025, 10, 17),
                total_invested: 1000.0,
                total_current: 1500.0,
                total_profit_loss: 500.0,
                portfolio_return_pct: Some(50.0),
                sector_allocation: BTreeMap::from([("Technology".to_string(), 1500.0)]),
                priced_holdings: 1,
                unpriced_symbols: vec!["DELISTED".into()],
                excluded_invested: 1000.0,
            },
            sector_slices: vec![SectorSlice {
                sector: "Technology".into(),
                value: 1500.0,
                allocation_pct: 100.0,
            }],
            risk: vec![RiskRecord {
                symbol: "INFY.NS".into(),
                volatility: 0.2,
                annual_return: 0.15,
                max_drawdown: -0.1,
                observations: 250,
            }],
            risk_trend: Some(TrendLine {
                slope: 0.5,
                intercept: 0.02,
            }),
            benchmark,
        }
    }

    fn compared() -> BenchmarkOutcome {
        BenchmarkOutcome::Compared(BenchmarkComparison {
            benchmark_symbol: "^NSEI".into(),
            window_start: d(2024, 10, 17),
            window_end: d(2025, 10, 17),
            portfolio_return_pct: Some(50.0),
            benchmark_return_pct: 8.0,
        })
    }

    #[test]
    fn money_formats_two_decimals_with_prefix() {
        assert_eq!(money(1234567.891, "₹"), "₹1234567.89");
        assert_eq!(money(999.5, ""), "999.50");
        assert_eq!(money(-1500.0, "$"), "-$1500.00");
        assert_eq!(money(0.0, ""), "0.00");
    }

    #[test]
    fn money_rounding_to_zero_drops_sign() {
        assert_eq!(money(-0.001, "₹"), "₹0.00");
        assert_eq!(money(-0.004, ""), "0.00");
        assert_eq!(money(-0.006, ""), "-0.01");
    }

    #[test]
    fn missing_values_render_as_placeholder() {
        assert_eq!(opt(None, |v| v.to_string()), "n/a");
        assert_eq!(opt(Some(1.5), |v| format!("{v:.1}")), "1.5");
    }

    #[test]
    fn report_has_every_section_as_tables() {
        let text = render_report(&report(compared()), &AnalyzerSettings::default());

        for title in [
            "Holdings",
            "Portfolio Summary",
            "Sector Allocation",
            "Volatility & Risk",
            "Portfolio vs NIFTY 50 Comparison",
        ] {
            assert!(text.contains(title), "missing section {title}");
        }
        assert!(text.contains('╭'));
        assert!(text.contains("InvestedValue"));
        assert!(text.contains("₹1500.00"));
        assert!(text.contains("DELISTED"));
        assert!(text.contains("Excluded (no live price)"));
    }

    #[test]
    fn risk_rows_show_fitted_trend() {
        let text = render_report(&report(compared()), &AnalyzerSettings::default());
        // 0.5 * 0.2 + 0.02
        assert!(text.contains("12.00%"));
        assert!(text.contains("Trend: AnnualReturn = 0.5000 x Volatility +0.0200"));
    }

    #[test]
    fn benchmark_section_shows_excess_return() {
        let text = render_report(&report(compared()), &AnalyzerSettings::default());
        assert!(text.contains("Excess Return"));
        assert!(text.contains("+42.00%"));
        assert!(text.contains("2024-10-17 to 2025-10-17"));
    }

    #[test]
    fn unavailable_benchmark_renders_reason() {
        let outcome = BenchmarkOutcome::Unavailable {
            reason: "Data unavailable: no price history for benchmark ^NSEI".into(),
        };
        let text = render_report(&report(outcome), &AnalyzerSettings::default());
        assert!(text.contains("Comparison unavailable: Data unavailable"));
        assert!(!text.contains("Excess Return"));
    }
}
