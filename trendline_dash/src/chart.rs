//! What to draw, described as plain data for a [`ChartRenderer`](crate::collaborators::ChartRenderer).

use chrono::NaiveDate;
use price_history::NormalizedSeries;
use serde::Serialize;

use crate::collaborators::TrendlineSegment;

pub const X_AXIS_LABEL: &str = "Date";
pub const Y_AXIS_LABEL: &str = "Opening Price (USD)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceChart {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub legend: String,
    /// Opening prices by date.
    pub line: Vec<LinePoint>,
    pub candles: Vec<Candle>,
    pub trendlines: Vec<TrendlineSegment>,
}

impl PriceChart {
    pub fn for_series(series: &NormalizedSeries, period_days: u32) -> Self {
        let bars = series.bars();
        Self {
            title: chart_title(series.symbol(), period_days),
            x_label: X_AXIS_LABEL,
            y_label: Y_AXIS_LABEL,
            legend: series.symbol().to_string(),
            line: bars
                .iter()
                .map(|b| LinePoint {
                    date: b.date,
                    value: b.open,
                })
                .collect(),
            candles: bars
                .iter()
                .map(|b| Candle {
                    date: b.date,
                    open: b.open,
                    high: b.high,
                    low: b.low,
                    close: b.close,
                })
                .collect(),
            trendlines: Vec::new(),
        }
    }

    pub fn with_trendlines(mut self, segments: Vec<TrendlineSegment>) -> Self {
        self.trendlines = segments;
        self
    }
}

pub fn chart_title(symbol: &str, period_days: u32) -> String {
    format!("{symbol} stock price evolution for the last {period_days} days")
}

pub fn page_heading(symbol: &str, period_days: u32) -> String {
    format!("Stock price for {symbol} over the last {period_days} days")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles() {
        assert_eq!(
            chart_title("SPY", 365),
            "SPY stock price evolution for the last 365 days"
        );
        assert_eq!(page_heading("QQQ", 252), "Stock price for QQQ over the last 252 days");
    }

    #[test]
    fn empty_series_gives_empty_chart() {
        let chart = PriceChart::for_series(&NormalizedSeries::empty("SPY"), 30);
        assert!(chart.line.is_empty());
        assert!(chart.candles.is_empty());
        assert_eq!(chart.legend, "SPY");
        assert_eq!(chart.y_label, "Opening Price (USD)");
    }
}
