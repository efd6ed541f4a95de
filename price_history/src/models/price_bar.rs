//! Normalized, pivot-ready daily price rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of OHLC prices for a symbol, in USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub symbol: String,
}

impl PriceBar {
    /// Whether open and close both sit inside the day's low/high range.
    ///
    /// Providers are trusted on this; nothing rejects an inconsistent bar.
    pub fn is_consistent(&self) -> bool {
        self.low <= self.high
            && (self.low..=self.high).contains(&self.open)
            && (self.low..=self.high).contains(&self.close)
    }
}

/// Daily bars for one symbol, strictly increasing by date.
///
/// Only [`HistoryNormalizer`](crate::normalizer::HistoryNormalizer) builds
/// non-empty series, so the ordering and single-symbol invariants always hold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl NormalizedSeries {
    pub(crate) fn from_ordered(symbol: String, bars: Vec<PriceBar>) -> Self {
        debug_assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
        debug_assert!(bars.iter().all(|b| b.symbol == symbol));
        Self { symbol, bars }
    }

    /// A series with no bars, the "no data" outcome.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// The date index, e.g. for a benchmark statistics engine.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }
}
