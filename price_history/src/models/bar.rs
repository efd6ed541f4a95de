//! Canonical in-memory representation of a raw daily bar as a provider hands it over.
//!
//! This struct is the standard output for all [`DataProvider`](crate::providers::DataProvider)
//! implementations. It is turned into a [`PriceBar`](crate::models::price_bar::PriceBar) by the
//! [`HistoryNormalizer`](crate::normalizer::HistoryNormalizer).

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::timeframe::TimeFrame;

/// A single time-series bar (OHLCV) for a given timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// The timestamp for this bar (UTC).
    pub timestamp: DateTime<Utc>,

    /// Calendar date of the session in the exchange's own time zone.
    ///
    /// Providers resolve this because a UTC timestamp alone can land on the
    /// previous day for exchanges east of Greenwich.
    pub trading_date: NaiveDate,

    /// Opening price.
    pub open: f64,

    /// Highest price during the bar interval.
    pub high: f64,

    /// Lowest price during the bar interval.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Volume traded during the bar interval. Not all providers supply this.
    pub volume: Option<f64>,
}

/// Represents a complete set of time-series data for a single symbol.
///
/// This struct groups a vector of [`Bar`]s with their corresponding symbol
/// and [`TimeFrame`], making the data set self-describing.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "AAPL", "SPY").
    pub symbol: String,
    /// The time interval for each bar in the series.
    pub timeframe: TimeFrame,
    /// The collection of OHLCV bars.
    pub bars: Vec<Bar>,
}
