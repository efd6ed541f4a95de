#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, TimeZone, Utc};
use price_history::{
    HistoryNormalizer, NormalizedSeries,
    models::{
        bar::{Bar, BarSeries},
        request_params::BarsRequestParams,
        timeframe::TimeFrame,
    },
    providers::{ApiSnafu, DataProvider, ProviderError},
};
use trendline_dash::{
    TrendlineRequest,
    chart::PriceChart,
    collaborators::{
        AnchorPoint, BenchmarkStats, ChartRenderer, CollaboratorError, LineKind, RenderedChart,
        StatRow, StatsTable, TrendlineDetector, TrendlineSegment,
    },
};

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
}

pub fn bar_on(date: NaiveDate, base: f64) -> Bar {
    let ts = Utc.from_utc_datetime(&date.and_hms_opt(13, 30, 0).unwrap());
    Bar {
        timestamp: ts,
        trading_date: date,
        open: base,
        high: base + 2.0,
        low: base - 1.0,
        close: base + 1.0,
        volume: None,
    }
}

/// `n` consecutive daily bars ending the day before `today()`.
pub fn bars(n: u64) -> Vec<Bar> {
    (1..=n)
        .rev()
        .map(|back| bar_on(today().checked_sub_days(Days::new(back)).unwrap(), 100.0 + back as f64))
        .collect()
}

pub fn series_of(symbol: &str, n: u64) -> NormalizedSeries {
    HistoryNormalizer::default().normalize(symbol, 30, bars(n))
}

/// Answers every request with the same bars (or the same failure) and counts calls.
pub struct FakeProvider {
    bars: Result<Vec<Bar>, u16>,
    pub calls: Mutex<Vec<BarsRequestParams>>,
}

impl FakeProvider {
    pub fn with_bars(bars: Vec<Bar>) -> Self {
        Self {
            bars: Ok(bars),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            bars: Err(status),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl DataProvider for FakeProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        let symbols = params.symbols.clone();
        self.calls.lock().unwrap().push(params);
        match &self.bars {
            Err(status) => ApiSnafu {
                status: *status,
                message: "upstream unavailable",
            }
            .fail(),
            Ok(bars) if bars.is_empty() => Ok(vec![]),
            Ok(bars) => Ok(symbols
                .into_iter()
                .map(|symbol| BarSeries {
                    symbol,
                    timeframe: TimeFrame::day(),
                    bars: bars.clone(),
                })
                .collect()),
        }
    }
}

/// Draws one support line through the first and last bar; records what it saw.
#[derive(Default)]
pub struct FirstLastDetector {
    pub seen: Mutex<Vec<TrendlineRequest>>,
    pub fail: bool,
}

impl TrendlineDetector for FirstLastDetector {
    fn detect(&self, request: &TrendlineRequest) -> Result<Vec<TrendlineSegment>, CollaboratorError> {
        self.seen.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(CollaboratorError::new("detector", "engine crashed"));
        }
        let bars = request.series().bars();
        let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
            return Ok(vec![]);
        };
        let anchor = |date, price| AnchorPoint {
            date,
            price,
            is_pivot: true,
        };
        Ok(vec![
            TrendlineSegment {
                kind: LineKind::Support,
                anchors: vec![anchor(first.date, first.low), anchor(last.date, last.low)],
                is_breakout: false,
            },
            // Single-anchor garbage the pipeline must drop.
            TrendlineSegment {
                kind: LineKind::Resistance,
                anchors: vec![anchor(first.date, first.high)],
                is_breakout: false,
            },
        ])
    }
}

#[derive(Default)]
pub struct RecordingRenderer {
    pub charts: Mutex<Vec<PriceChart>>,
}

impl ChartRenderer for RecordingRenderer {
    fn render(&self, chart: &PriceChart) -> Result<RenderedChart, CollaboratorError> {
        self.charts.lock().unwrap().push(chart.clone());
        Ok(RenderedChart {
            media_type: "application/json".into(),
            body: serde_json::to_string(chart).map_err(|e| CollaboratorError::new("renderer", e.to_string()))?,
        })
    }
}

#[derive(Default)]
pub struct FakeStats {
    pub calls: Mutex<Vec<(String, usize, String)>>,
}

#[async_trait]
impl BenchmarkStats for FakeStats {
    async fn compute(
        &self,
        symbol: &str,
        dates: &[NaiveDate],
        benchmark: &str,
    ) -> Result<StatsTable, CollaboratorError> {
        self.calls
            .lock()
            .unwrap()
            .push((symbol.to_string(), dates.len(), benchmark.to_string()));
        Ok(StatsTable {
            symbol: symbol.to_string(),
            benchmark: benchmark.to_string(),
            rows: vec![StatRow {
                metric: "Sharpe".into(),
                strategy: 1.2,
                benchmark: 0.9,
            }],
        })
    }
}
