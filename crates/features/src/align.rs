//! Date alignment of return series.

use chrono::Datelike;
use polars::prelude::*;
use riskpeers_primitives::{Date, LogReturns};

/// Aligned return values sharing the same dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedReturns {
    /// Stock returns on the common dates.
    pub stock: Vec<f64>,
    /// Benchmark returns on the common dates.
    pub benchmark: Vec<f64>,
}

impl AlignedReturns {
    /// Number of common dates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stock.len()
    }

    /// Check if no dates are shared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stock.is_empty()
    }
}

fn day_numbers(dates: &[Date]) -> Vec<i32> {
    dates.iter().map(Datelike::num_days_from_ce).collect()
}

/// Inner-join two return series on date, keeping only dates present in
/// both, in ascending date order.
///
/// # Errors
/// Returns a polars error if the join cannot be evaluated.
pub fn align_returns(stock: &LogReturns, benchmark: &LogReturns) -> PolarsResult<AlignedReturns> {
    let stock_df = df! {
        "date" => day_numbers(stock.dates()),
        "stock" => stock.values(),
    }?;
    let bench_df = df! {
        "date" => day_numbers(benchmark.dates()),
        "benchmark" => benchmark.values(),
    }?;

    let joined = stock_df
        .lazy()
        .join(bench_df.lazy(), [col("date")], [col("date")], JoinArgs::new(JoinType::Inner))
        .sort(["date"], SortMultipleOptions::default())
        .collect()?;

    let stock = joined.column("stock")?.f64()?.into_no_null_iter().collect();
    let benchmark = joined.column("benchmark")?.f64()?.into_no_null_iter().collect();
    Ok(AlignedReturns { stock, benchmark })
}
