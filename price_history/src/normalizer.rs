//! Turns provider rows into a [`NormalizedSeries`].
//!
//! [`HistoryNormalizer::normalize`] is a pure transform over rows that were
//! already fetched. [`HistoryNormalizer::fetch`] wraps it with input
//! validation and a single provider call, and reports an empty result as
//! [`HistoryError::NoData`] instead of handing it downstream.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::{
    errors::HistoryError,
    models::{
        bar::Bar,
        price_bar::{NormalizedSeries, PriceBar},
        request_params::BarsRequestParams,
        window::{LookbackBounds, LookbackWindow},
    },
    providers::DataProvider,
};

/// Read access to one provider row, whatever its wire shape.
pub trait PriceRecord {
    fn date(&self) -> NaiveDate;
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
}

impl PriceRecord for Bar {
    fn date(&self) -> NaiveDate {
        self.trading_date
    }
    fn open(&self) -> f64 {
        self.open
    }
    fn high(&self) -> f64 {
        self.high
    }
    fn low(&self) -> f64 {
        self.low
    }
    fn close(&self) -> f64 {
        self.close
    }
}

impl PriceRecord for PriceBar {
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn open(&self) -> f64 {
        self.open
    }
    fn high(&self) -> f64 {
        self.high
    }
    fn low(&self) -> f64 {
        self.low
    }
    fn close(&self) -> f64 {
        self.close
    }
}

impl<R: PriceRecord> PriceRecord for &R {
    fn date(&self) -> NaiveDate {
        (*self).date()
    }
    fn open(&self) -> f64 {
        (*self).open()
    }
    fn high(&self) -> f64 {
        (*self).high()
    }
    fn low(&self) -> f64 {
        (*self).low()
    }
    fn close(&self) -> f64 {
        (*self).close()
    }
}

/// Trims and uppercases a ticker, rejecting blanks.
pub fn normalize_symbol(raw: &str) -> Result<String, HistoryError> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(HistoryError::EmptySymbol);
    }
    Ok(symbol)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryNormalizer {
    bounds: LookbackBounds,
}

impl HistoryNormalizer {
    pub fn new(bounds: LookbackBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> LookbackBounds {
        self.bounds
    }

    /// Tags every row with `symbol` and orders the rows by date.
    ///
    /// No resampling or gap filling happens. Rows arriving out of order are
    /// stably sorted; when several rows share a date only the first one the
    /// provider sent is kept, so the output dates are strictly increasing.
    /// Empty input yields an empty series.
    pub fn normalize<I>(&self, symbol: &str, lookback_days: u32, raw_rows: I) -> NormalizedSeries
    where
        I: IntoIterator,
        I::Item: PriceRecord,
    {
        let mut bars: Vec<PriceBar> = raw_rows
            .into_iter()
            .map(|row| PriceBar {
                date: row.date(),
                open: row.open(),
                high: row.high(),
                low: row.low(),
                close: row.close(),
                symbol: symbol.to_string(),
            })
            .collect();

        if !bars.is_sorted_by_key(|b| b.date) {
            debug!(%symbol, "provider rows arrived out of date order");
            bars.sort_by_key(|b| b.date);
        }

        let received = bars.len();
        bars.dedup_by_key(|b| b.date);
        if bars.len() < received {
            warn!(%symbol, dropped = received - bars.len(), "dropped rows repeating a date");
        }
        debug!(%symbol, lookback_days, bars = bars.len(), "normalized price history");

        NormalizedSeries::from_ordered(symbol.to_string(), bars)
    }

    /// Validates inputs, fetches daily bars for `[today - lookback_days, today)` and normalizes them.
    pub async fn fetch<P>(
        &self,
        provider: &P,
        symbol: &str,
        lookback_days: u32,
        today: NaiveDate,
    ) -> Result<NormalizedSeries, HistoryError>
    where
        P: DataProvider + ?Sized + Sync,
    {
        let symbol = normalize_symbol(symbol)?;
        if !self.bounds.contains(lookback_days) {
            return Err(HistoryError::LookbackOutOfRange {
                days: lookback_days,
                min: self.bounds.min,
                max: self.bounds.max,
            });
        }

        let window = LookbackWindow::ending(today, lookback_days);
        let params = BarsRequestParams::daily(symbol.clone(), &window);

        let fetched = provider
            .fetch_bars(params)
            .await
            .map_err(|source| HistoryError::Provider {
                symbol: symbol.clone(),
                source,
            })?;

        // Providers key series by their own spelling of the symbol; fall back to
        // the only series when there is exactly one.
        let raw = match fetched.iter().position(|s| s.symbol.eq_ignore_ascii_case(&symbol)) {
            Some(i) => fetched.into_iter().nth(i),
            None if fetched.len() == 1 => fetched.into_iter().next(),
            None => None,
        };
        let rows: Vec<Bar> = raw
            .map(|s| s.bars)
            .unwrap_or_default()
            .into_iter()
            .filter(|b| window.contains(b.trading_date))
            .collect();

        let series = self.normalize(&symbol, lookback_days, &rows);
        if series.is_empty() {
            warn!(%symbol, start = %window.start, end = %window.end, "no price data");
            return Err(HistoryError::NoData {
                symbol,
                start: window.start,
                end: window.end,
            });
        }

        info!(%symbol, bars = series.len(), lookback_days, "fetched price history");
        Ok(series)
    }
}
