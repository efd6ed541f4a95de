use std::fmt;

use serde::{Deserialize, Serialize};

/// Bar granularity of a history request.
///
/// Every request in this workspace asks for one bar per trading session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFrame {
    Day,
}

impl TimeFrame {
    pub const fn day() -> Self {
        TimeFrame::Day
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFrame::Day => f.write_str("1 day"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_timeframe_displays_as_one_day() {
        assert_eq!(TimeFrame::day().to_string(), "1 day");
    }

    #[test]
    fn serde_spelling() {
        assert_eq!(serde_json::to_string(&TimeFrame::Day).unwrap(), "\"day\"");
        assert_eq!(serde_json::from_str::<TimeFrame>("\"day\"").unwrap(), TimeFrame::day());
        assert!(serde_json::from_str::<TimeFrame>("\"minute\"").is_err());
    }
}
