//! Price and return series definitions.

use serde::{Deserialize, Serialize};

use crate::{Date, PrimitiveError};

/// A single dated close price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observation date.
    pub date: Date,
    /// Close price.
    pub close: f64,
}

impl PricePoint {
    /// Create a new price point.
    #[must_use]
    pub const fn new(date: Date, close: f64) -> Self {
        Self { date, close }
    }
}

/// Close prices for one ticker, strictly ordered by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Create a price series.
    ///
    /// # Errors
    /// Returns an error if dates are not strictly increasing or a close
    /// price is not a positive finite number.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, PrimitiveError> {
        for point in &points {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(PrimitiveError::InvalidPrice { date: point.date, close: point.close });
            }
        }
        for pair in points.windows(2) {
            if pair[1].date == pair[0].date {
                return Err(PrimitiveError::DuplicateDate(pair[1].date));
            }
            if pair[1].date < pair[0].date {
                return Err(PrimitiveError::UnorderedDates { previous: pair[0].date, next: pair[1].date });
            }
        }
        Ok(Self { points })
    }

    /// Create a price series from `(date, close)` pairs.
    ///
    /// # Errors
    /// See [`PriceSeries::new`].
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Date, f64)>) -> Result<Self, PrimitiveError> {
        Self::new(pairs.into_iter().map(|(date, close)| PricePoint::new(date, close)).collect())
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The underlying observations.
    #[must_use]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Date of the most recent observation.
    #[must_use]
    pub fn last_date(&self) -> Option<Date> {
        self.points.last().map(|p| p.date)
    }

    /// Compute `ln(p[t] / p[t-1])` for each consecutive pair.
    ///
    /// Each return is dated at the later observation, so the output has
    /// one fewer element than the series.
    #[must_use]
    pub fn log_returns(&self) -> LogReturns {
        let (dates, values) = self
            .points
            .windows(2)
            .map(|pair| (pair[1].date, (pair[1].close / pair[0].close).ln()))
            .unzip();
        LogReturns { dates, values }
    }
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = PrimitiveError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(series: PriceSeries) -> Self {
        series.points
    }
}

/// Dated log returns derived from a [`PriceSeries`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogReturns {
    dates: Vec<Date>,
    values: Vec<f64>,
}

impl LogReturns {
    /// Number of return observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Return dates.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Return values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Sampling interval of a price history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    /// One observation per trading day.
    #[default]
    Daily,
    /// One observation per week.
    Weekly,
    /// One observation per month.
    Monthly,
}

impl Interval {
    /// Provider code for the interval.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Daily => "1d",
            Self::Weekly => "1wk",
            Self::Monthly => "1mo",
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Historical window requested from a price provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryWindow {
    /// Look-back length in calendar days.
    pub lookback_days: u32,
    /// Sampling interval.
    pub interval: Interval,
}

impl HistoryWindow {
    /// Create a new history window.
    #[must_use]
    pub const fn new(lookback_days: u32, interval: Interval) -> Self {
        Self { lookback_days, interval }
    }

    /// Short label such as `365d_1d`, used in cache keys.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}d_{}", self.lookback_days, self.interval)
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        // one year of daily closes
        Self::new(365, Interval::Daily)
    }
}
