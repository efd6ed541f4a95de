use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct ChartEnvelope {
    pub chart: Chart,
}

#[derive(Deserialize, Debug)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    pub meta: ChartMeta,
    /// Missing entirely when the range holds no sessions.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: String,
    pub currency: Option<String>,
    pub exchange_timezone_name: Option<String>,
    #[serde(default)]
    pub gmtoffset: i32,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
    #[serde(default)]
    pub adjclose: Vec<AdjClose>,
}

/// Column-oriented prices; holidays and halts show up as `null`.
#[derive(Deserialize, Debug, Default)]
pub struct Quote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

#[derive(Deserialize, Debug, Default)]
pub struct AdjClose {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

/// One fully-populated row pulled out of the columnar payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub timestamp: DateTime<Utc>,
    pub trading_date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

/// Either a named IANA zone or the fixed offset Yahoo reports alongside it.
enum ExchangeZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl ExchangeZone {
    fn from_meta(meta: &ChartMeta) -> Self {
        meta.exchange_timezone_name
            .as_deref()
            .and_then(|name| Tz::from_str(name).ok())
            .map(ExchangeZone::Named)
            .or_else(|| FixedOffset::east_opt(meta.gmtoffset).map(ExchangeZone::Fixed))
            .unwrap_or(ExchangeZone::Named(Tz::UTC))
    }

    fn local_date(&self, ts: DateTime<Utc>) -> NaiveDate {
        match self {
            ExchangeZone::Named(tz) => ts.with_timezone(tz).date_naive(),
            ExchangeZone::Fixed(off) => ts.with_timezone(off).date_naive(),
        }
    }
}

fn at<T: Copy>(col: &[Option<T>], i: usize) -> Option<T> {
    col.get(i).copied().flatten()
}

impl ChartResult {
    /// Zips the columns into rows, skipping any session with a missing price.
    ///
    /// With `auto_adjust`, open/high/low are scaled by `adjclose / close` and the
    /// adjusted close replaces the raw one, so splits and dividends don't show up
    /// as price gaps.
    pub fn rows(&self, auto_adjust: bool) -> Vec<ChartRow> {
        let zone = ExchangeZone::from_meta(&self.meta);
        let quote = self.indicators.quote.first();
        let adj = self.indicators.adjclose.first().map(|a| a.adjclose.as_slice());

        let Some(quote) = quote else {
            return Vec::new();
        };

        self.timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &secs)| {
                let timestamp = Utc.timestamp_opt(secs, 0).single()?;
                let (open, high, low, close) = (
                    at(&quote.open, i)?,
                    at(&quote.high, i)?,
                    at(&quote.low, i)?,
                    at(&quote.close, i)?,
                );
                let factor = match adj.and_then(|a| at(a, i)) {
                    Some(adj_close) if auto_adjust && close != 0.0 => adj_close / close,
                    _ => 1.0,
                };
                Some(ChartRow {
                    timestamp,
                    trading_date: zone.local_date(timestamp),
                    open: open * factor,
                    high: high * factor,
                    low: low * factor,
                    close: close * factor,
                    volume: at(&quote.volume, i),
                })
            })
            .collect()
    }
}
