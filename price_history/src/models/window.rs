//! Trailing date windows and the bounds a lookback period must respect.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Half-open calendar window `[start, end)` ending at "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LookbackWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl LookbackWindow {
    /// The `lookback_days` calendar days before `today`, excluding `today` itself.
    pub fn ending(today: NaiveDate, lookback_days: u32) -> Self {
        let start = today
            .checked_sub_days(Days::new(u64::from(lookback_days)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Midnight UTC at the start of the window.
    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// Midnight UTC at the (exclusive) end of the window.
    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.and_time(chrono::NaiveTime::MIN).and_utc()
    }
}

/// Inclusive range of lookback periods a caller may request, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LookbackBounds {
    pub min: u32,
    pub max: u32,
}

impl LookbackBounds {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, days: u32) -> bool {
        days > 0 && (self.min..=self.max).contains(&days)
    }
}

impl Default for LookbackBounds {
    fn default() -> Self {
        Self::new(10, 900)
    }
}
