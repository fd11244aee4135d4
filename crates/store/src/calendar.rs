//! US equity trading calendar used for cache freshness.

use chrono::{
    DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveTime, Offset, TimeDelta, TimeZone, Utc,
    Weekday,
};

const EASTERN_STANDARD_SECS: i32 = -5 * 3600;
const EASTERN_DAYLIGHT_SECS: i32 = -4 * 3600;

/// Whether US Eastern daylight saving time is in effect on `date`.
///
/// Daylight time runs from the second Sunday of March to the first Sunday
/// of November.
#[must_use]
pub fn is_eastern_dst(date: NaiveDate) -> bool {
    let year = date.year();
    let start = NaiveDate::from_weekday_of_month_opt(year, 3, Weekday::Sun, 2);
    let end = NaiveDate::from_weekday_of_month_opt(year, 11, Weekday::Sun, 1);
    match (start, end) {
        (Some(start), Some(end)) => date >= start && date < end,
        _ => false,
    }
}

/// UTC offset of US Eastern time on `date`.
#[must_use]
pub fn eastern_offset(date: NaiveDate) -> FixedOffset {
    let secs = if is_eastern_dst(date) { EASTERN_DAYLIGHT_SECS } else { EASTERN_STANDARD_SECS };
    FixedOffset::east_opt(secs).unwrap_or_else(|| Utc.fix())
}

/// `now` on the US Eastern wall clock.
///
/// The local date is taken at standard time before its offset is looked up,
/// so evenings before a switch keep the previous day's offset.
#[must_use]
pub fn to_eastern(now: DateTime<Utc>) -> DateTime<FixedOffset> {
    let standard = FixedOffset::east_opt(EASTERN_STANDARD_SECS).unwrap_or_else(|| Utc.fix());
    let date = now.with_timezone(&standard).date_naive();
    now.with_timezone(&eastern_offset(date))
}

/// Trading sessions on weekdays, closing at a fixed Eastern wall-clock time.
///
/// Exchange holidays are treated as sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketCalendar {
    close: NaiveTime,
}

impl MarketCalendar {
    /// Create a calendar closing at `close` Eastern time.
    #[must_use]
    pub const fn new(close: NaiveTime) -> Self {
        Self { close }
    }

    /// Session close time, Eastern wall clock.
    #[must_use]
    pub const fn close_time(&self) -> NaiveTime {
        self.close
    }

    /// Close of the most recent session that had completed by `now`.
    #[must_use]
    pub fn last_session_close(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local = to_eastern(now);
        let mut date = local.date_naive();
        if local.time() < self.close {
            date = date - Days::new(1);
        }
        while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            date = date - Days::new(1);
        }

        let offset = eastern_offset(date);
        let utc_naive =
            date.and_time(self.close) - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
        Utc.from_utc_datetime(&utc_naive)
    }

    /// Whether an artifact refreshed at `refreshed_at` predates the last
    /// completed session close as of `now`.
    #[must_use]
    pub fn is_stale(&self, refreshed_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        refreshed_at < self.last_session_close(now)
    }
}

impl Default for MarketCalendar {
    fn default() -> Self {
        Self::new(NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default())
    }
}
