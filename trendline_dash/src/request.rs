//! The immutable request handed to a trendline-detection engine.

use std::sync::Arc;

use price_history::{NormalizedSeries, PriceBar, models::timeframe::TimeFrame};
use serde::{Serialize, Serializer, ser::SerializeStruct};
use thiserror::Error;

use crate::options::{MINIMUM_POINTS_FLOOR, TrendlineOptions};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Invalid options: minimum_points is {got}, must be at least {}", MINIMUM_POINTS_FLOOR)]
    InvalidOptions { got: u32 },

    #[error("Series for {symbol} has no bars")]
    EmptySeries { symbol: String },
}

/// Column identifiers the detection engine reads each field from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnBindings {
    pub date: &'static str,
    pub open: &'static str,
    pub high: &'static str,
    pub low: &'static str,
    pub close: &'static str,
}

impl ColumnBindings {
    pub const STANDARD: ColumnBindings = ColumnBindings {
        date: "Date",
        open: "Open",
        high: "High",
        low: "Low",
        close: "Close",
    };
}

/// A normalized series paired with detection options. Never mutated after [`build`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrendlineRequest {
    series: Arc<NormalizedSeries>,
    options: TrendlineOptions,
    time_interval: TimeFrame,
    columns: ColumnBindings,
}

impl TrendlineRequest {
    pub fn series(&self) -> &NormalizedSeries {
        &self.series
    }

    /// Shared handle to the series, for collaborators that outlive the request.
    pub fn shared_series(&self) -> Arc<NormalizedSeries> {
        Arc::clone(&self.series)
    }

    pub fn options(&self) -> &TrendlineOptions {
        &self.options
    }

    pub fn time_interval(&self) -> TimeFrame {
        self.time_interval
    }

    pub fn columns(&self) -> ColumnBindings {
        self.columns
    }
}

/// Builds a [`TrendlineRequest`].
///
/// ```
/// # use std::sync::Arc;
/// # use price_history::NormalizedSeries;
/// # use trendline_dash::{options::TrendlineOptions, request::{BuildError, TrendlineRequestBuilder}};
/// let series = Arc::new(NormalizedSeries::empty("SPY"));
/// let err = TrendlineRequestBuilder::new(series)
///     .options(TrendlineOptions { minimum_points: 1, ..Default::default() })
///     .build()
///     .unwrap_err();
/// assert_eq!(err, BuildError::InvalidOptions { got: 1 });
/// ```
#[derive(Debug, Clone)]
pub struct TrendlineRequestBuilder {
    series: Arc<NormalizedSeries>,
    options: TrendlineOptions,
}

impl TrendlineRequestBuilder {
    pub fn new(series: impl Into<Arc<NormalizedSeries>>) -> Self {
        Self {
            series: series.into(),
            options: TrendlineOptions::default(),
        }
    }

    pub fn options(mut self, options: TrendlineOptions) -> Self {
        self.options = options;
        self
    }

    /// Checks the options, then fixes the daily interval and the standard column bindings.
    pub fn build(self) -> Result<TrendlineRequest, BuildError> {
        check_options(&self.options)?;
        if self.series.is_empty() {
            return Err(BuildError::EmptySeries {
                symbol: self.series.symbol().to_string(),
            });
        }

        Ok(TrendlineRequest {
            series: self.series,
            options: self.options,
            time_interval: TimeFrame::day(),
            columns: ColumnBindings::STANDARD,
        })
    }
}

/// Rejects options a detection engine cannot honor.
pub fn check_options(options: &TrendlineOptions) -> Result<(), BuildError> {
    if options.minimum_points < MINIMUM_POINTS_FLOOR {
        return Err(BuildError::InvalidOptions {
            got: options.minimum_points,
        });
    }
    Ok(())
}

/// Shorthand for `TrendlineRequestBuilder::new(series).options(options).build()`.
pub fn build(
    series: impl Into<Arc<NormalizedSeries>>,
    options: TrendlineOptions,
) -> Result<TrendlineRequest, BuildError> {
    TrendlineRequestBuilder::new(series).options(options).build()
}

/// One row keyed by the bound column names.
struct BoundRow<'a> {
    columns: ColumnBindings,
    bar: &'a PriceBar,
}

impl Serialize for BoundRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Row", 5)?;
        s.serialize_field(self.columns.date, &self.bar.date)?;
        s.serialize_field(self.columns.open, &self.bar.open)?;
        s.serialize_field(self.columns.high, &self.bar.high)?;
        s.serialize_field(self.columns.low, &self.bar.low)?;
        s.serialize_field(self.columns.close, &self.bar.close)?;
        s.end()
    }
}

impl Serialize for TrendlineRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<BoundRow<'_>> = self
            .series
            .bars()
            .iter()
            .map(|bar| BoundRow {
                columns: self.columns,
                bar,
            })
            .collect();

        let mut s = serializer.serialize_struct("TrendlineRequest", 5)?;
        s.serialize_field("symbol", self.series.symbol())?;
        s.serialize_field("time_interval", &self.time_interval.to_string())?;
        s.serialize_field("columns", &self.columns)?;
        s.serialize_field("options", &self.options)?;
        s.serialize_field("rows", &rows)?;
        s.end()
    }
}
