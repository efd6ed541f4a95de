//! Boundaries to the engines this crate hands work to.
//!
//! Trendline detection, chart rendering and benchmark statistics all live
//! outside this workspace. These traits pin down what goes in and what
//! comes back so the [`Pipeline`](crate::pipeline::Pipeline) can be driven
//! by any implementation, including test doubles.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{chart::PriceChart, request::TrendlineRequest};

/// Failure reported by an external engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{engine}: {message}")]
pub struct CollaboratorError {
    pub engine: &'static str,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(engine: &'static str, message: impl Into<String>) -> Self {
        Self {
            engine,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Support,
    Resistance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorPoint {
    pub date: NaiveDate,
    pub price: f64,
    pub is_pivot: bool,
}

/// One detected line through two or more anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendlineSegment {
    pub kind: LineKind,
    pub anchors: Vec<AnchorPoint>,
    pub is_breakout: bool,
}

impl TrendlineSegment {
    /// Engines must return at least two anchors per line.
    pub fn is_well_formed(&self) -> bool {
        self.anchors.len() >= 2 && self.anchors.windows(2).all(|w| w[0].date < w[1].date)
    }

    pub fn first_anchor(&self) -> Option<&AnchorPoint> {
        self.anchors.first()
    }

    pub fn last_anchor(&self) -> Option<&AnchorPoint> {
        self.anchors.last()
    }
}

pub trait TrendlineDetector {
    /// Detects lines over the request's series. Ordering of the result is the engine's.
    fn detect(&self, request: &TrendlineRequest) -> Result<Vec<TrendlineSegment>, CollaboratorError>;
}

/// Output of a chart renderer, opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedChart {
    /// e.g. `"text/html"` or `"image/svg+xml"`.
    pub media_type: String,
    pub body: String,
}

pub trait ChartRenderer {
    fn render(&self, chart: &PriceChart) -> Result<RenderedChart, CollaboratorError>;
}

/// One metric row, strategy (the symbol) next to the benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRow {
    pub metric: String,
    pub strategy: f64,
    pub benchmark: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsTable {
    pub symbol: String,
    pub benchmark: String,
    pub rows: Vec<StatRow>,
}

impl StatsTable {
    pub fn metric(&self, name: &str) -> Option<&StatRow> {
        self.rows.iter().find(|r| r.metric == name)
    }
}

/// Risk/return metrics of a symbol relative to a benchmark over a date index.
#[async_trait]
pub trait BenchmarkStats {
    async fn compute(
        &self,
        symbol: &str,
        dates: &[NaiveDate],
        benchmark: &str,
    ) -> Result<StatsTable, CollaboratorError>;
}
