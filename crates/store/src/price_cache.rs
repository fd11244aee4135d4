//! CSV cache in front of a price provider.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDate, Utc};
use polars::prelude::*;
use riskpeers_primitives::{HistoryWindow, PricePoint, PriceSeries, Symbol};
use riskpeers_traits::{PriceProvider, ProviderError};

use crate::MarketCalendar;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors raised while reading or writing cached prices.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    /// A cached date could not be parsed.
    #[error("invalid cached date: {0}")]
    InvalidDate(String),

    /// Cached rows violate a price series invariant.
    #[error("invalid cached series: {0}")]
    InvalidSeries(#[from] riskpeers_primitives::PrimitiveError),
}

/// Write a price series as `date,close` CSV.
///
/// # Errors
/// Returns `CacheError` if the file cannot be written.
pub fn write_price_csv(path: &Path, series: &PriceSeries) -> Result<(), CacheError> {
    let dates: Vec<String> =
        series.points().iter().map(|p| p.date.format(DATE_FORMAT).to_string()).collect();
    let closes: Vec<f64> = series.points().iter().map(|p| p.close).collect();
    let mut df = DataFrame::new(vec![
        Column::new("date".into(), dates),
        Column::new("close".into(), closes),
    ])?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
    Ok(())
}

/// Read a `date,close` CSV written by [`write_price_csv`].
///
/// # Errors
/// Returns `CacheError` if the file is missing, malformed, or out of order.
pub fn read_price_csv(path: &Path) -> Result<PriceSeries, CacheError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let dates = df.column("date")?.str()?;
    let closes = df.column("close")?.cast(&DataType::Float64)?;
    let closes = closes.f64()?;

    let mut points = Vec::with_capacity(df.height());
    for (date, close) in dates.into_iter().zip(closes.into_iter()) {
        let (Some(date), Some(close)) = (date, close) else {
            continue;
        };
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
            .map_err(|_| CacheError::InvalidDate(date.to_string()))?;
        points.push(PricePoint::new(date, close));
    }
    Ok(PriceSeries::new(points)?)
}

/// Caches each fetched series as CSV and serves it until the next session
/// close makes it stale.
///
/// Files are named `<SYMBOL>_<lookback>d_<interval>.csv`.
#[derive(Debug, Clone)]
pub struct CachedPriceProvider<P> {
    inner: P,
    dir: PathBuf,
    calendar: MarketCalendar,
}

impl<P: PriceProvider> CachedPriceProvider<P> {
    /// Wrap `inner`, caching under `dir`.
    #[must_use]
    pub fn new(inner: P, dir: impl Into<PathBuf>) -> Self {
        Self::with_calendar(inner, dir, MarketCalendar::default())
    }

    /// Wrap `inner` with a custom calendar.
    #[must_use]
    pub fn with_calendar(inner: P, dir: impl Into<PathBuf>, calendar: MarketCalendar) -> Self {
        Self { inner, dir: dir.into(), calendar }
    }

    /// Cache file for a request.
    #[must_use]
    pub fn cache_path(&self, symbol: &Symbol, window: &HistoryWindow) -> PathBuf {
        self.dir.join(format!("{}_{}.csv", symbol, window.label()))
    }

    fn is_fresh(&self, path: &Path, now: DateTime<Utc>) -> bool {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .map(|modified| !self.calendar.is_stale(modified.into(), now))
            .unwrap_or(false)
    }

    /// Fetch through the cache as of `now`.
    ///
    /// # Errors
    /// Returns the inner provider's error when a refetch fails.
    pub fn fetch_prices_at(
        &self,
        symbol: &Symbol,
        window: &HistoryWindow,
        now: DateTime<Utc>,
    ) -> Result<PriceSeries, ProviderError> {
        let path = self.cache_path(symbol, window);
        if self.is_fresh(&path, now) {
            match read_price_csv(&path) {
                Ok(series) => {
                    tracing::debug!(%symbol, path = %path.display(), "price cache hit");
                    return Ok(series);
                }
                Err(e) => tracing::warn!(%symbol, error = %e, "discarding unreadable price cache"),
            }
        }

        let series = self.inner.fetch_prices(symbol, window)?;
        if let Err(e) = write_price_csv(&path, &series) {
            tracing::warn!(%symbol, error = %e, "failed to write price cache");
        }
        Ok(series)
    }
}

impl<P: PriceProvider> PriceProvider for CachedPriceProvider<P> {
    fn fetch_prices(
        &self,
        symbol: &Symbol,
        window: &HistoryWindow,
    ) -> Result<PriceSeries, ProviderError> {
        self.fetch_prices_at(symbol, window, Utc::now())
    }
}
