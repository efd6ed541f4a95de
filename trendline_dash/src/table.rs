//! Tabular dump of a normalized series.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use price_history::NormalizedSeries;
use serde::Serialize;
use thiserror::Error;

const HEADERS: [&str; 6] = ["Symbol", "Date", "Open", "High", "Low", "Close"];

#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output was not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("CSV writer could not be flushed: {0}")]
    Flush(#[from] csv::IntoInnerError<csv::Writer<Vec<u8>>>),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableFormat {
    #[default]
    Text,
    Csv,
    Json,
}

impl FromStr for TableFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "table" => Ok(TableFormat::Text),
            "csv" => Ok(TableFormat::Csv),
            "json" => Ok(TableFormat::Json),
            other => Err(format!("unknown format '{other}', expected text, csv or json")),
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TableFormat::Text => "text",
            TableFormat::Csv => "csv",
            TableFormat::Json => "json",
        })
    }
}

#[derive(Serialize)]
struct Record<'a> {
    #[serde(rename = "Symbol")]
    symbol: &'a str,
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
}

fn records(series: &NormalizedSeries) -> impl Iterator<Item = Record<'_>> {
    series.bars().iter().map(|b| Record {
        symbol: &b.symbol,
        date: b.date,
        open: b.open,
        high: b.high,
        low: b.low,
        close: b.close,
    })
}

pub fn render(series: &NormalizedSeries, format: TableFormat) -> Result<String, TableError> {
    match format {
        TableFormat::Text => Ok(render_text(series)),
        TableFormat::Csv => render_csv(series),
        TableFormat::Json => Ok(serde_json::to_string_pretty(&records(series).collect::<Vec<_>>())?),
    }
}

fn render_csv(series: &NormalizedSeries) -> Result<String, TableError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    if series.is_empty() {
        wtr.write_record(HEADERS)?;
    }
    for record in records(series) {
        wtr.serialize(record)?;
    }
    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn render_text(series: &NormalizedSeries) -> String {
    let cells: Vec<[String; 6]> = records(series)
        .map(|r| {
            [
                r.symbol.to_string(),
                r.date.to_string(),
                format!("{:.2}", r.open),
                format!("{:.2}", r.high),
                format!("{:.2}", r.low),
                format!("{:.2}", r.close),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths)
        .map(|(h, w)| format!("{h:<w$}"))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');
    for row in &cells {
        // Text columns left-aligned, prices right-aligned.
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (cell, w))| {
                if i < 2 {
                    format!("{cell:<w$}")
                } else {
                    format!("{cell:>w$}")
                }
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}
