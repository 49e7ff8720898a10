use crate::errors::CoreError;
use crate::models::analytics::{BenchmarkComparison, BenchmarkOutcome};
use crate::models::price::PriceSeries;

use super::valuation_service::percent_of;

/// Compares the portfolio's simple return with a reference index.
#[derive(Debug, Default)]
pub struct BenchmarkService;

impl BenchmarkService {
    pub fn new() -> Self {
        Self
    }

    /// Benchmark return over the first and last closes of `benchmark`, next to
    /// the portfolio's return on invested capital.
    ///
    /// Fails with `DataUnavailable` when the series is empty or starts at a
    /// non-positive price. A single close gives a 0% benchmark return.
    pub fn compare_to_benchmark(
        &self,
        benchmark_symbol: &str,
        benchmark: &PriceSeries,
        total_invested: f64,
        total_current: f64,
    ) -> Result<BenchmarkComparison, CoreError> {
        let (first, last) = match (benchmark.first(), benchmark.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(CoreError::DataUnavailable(format!(
                    "no price history for benchmark {benchmark_symbol}"
                )))
            }
        };

        let benchmark_return_pct = percent_of(last.price - first.price, first.price)
            .filter(|_| first.price > 0.0)
            .ok_or_else(|| {
                CoreError::DataUnavailable(format!(
                    "benchmark {benchmark_symbol} starts at a non-positive price ({})",
                    first.price
                ))
            })?;

        Ok(BenchmarkComparison {
            benchmark_symbol: benchmark_symbol.to_string(),
            window_start: first.date,
            window_end: last.date,
            portfolio_return_pct: percent_of(total_current - total_invested, total_invested),
            benchmark_return_pct,
        })
    }

    /// Same as `compare_to_benchmark`, folding the error into a skipped section.
    pub fn outcome(
        &self,
        benchmark_symbol: &str,
        benchmark: &PriceSeries,
        total_invested: f64,
        total_current: f64,
    ) -> BenchmarkOutcome {
        match self.compare_to_benchmark(benchmark_symbol, benchmark, total_invested, total_current) {
            Ok(comparison) => BenchmarkOutcome::Compared(comparison),
            Err(e) => {
                tracing::warn!(benchmark = benchmark_symbol, error = %e, "benchmark comparison skipped");
                BenchmarkOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}
