use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::{
    models::{
        request_params::{BarsRequestParams, ProviderParams},
        timeframe::TimeFrame,
    },
};

/// Specifies the corporate action adjustment for stock data.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    Raw,
    Split,
    Dividend,
    /// Split and dividend adjusted, what charting expects.
    #[default]
    All,
}

impl Adjustment {
    fn as_str(self) -> &'static str {
        match self {
            Adjustment::Raw => "raw",
            Adjustment::Split => "split",
            Adjustment::Dividend => "dividend",
            Adjustment::All => "all",
        }
    }
}

/// Specifies the source feed for stock data.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    Sip,
    Iex,
    Otc,
}

impl Feed {
    fn as_str(self) -> &'static str {
        match self {
            Feed::Sip => "sip",
            Feed::Iex => "iex",
            Feed::Otc => "otc",
        }
    }
}

/// Alpaca-specific parameters for a bars request.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AlpacaBarsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<Adjustment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<Feed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

fn timeframe_param(tf: TimeFrame) -> &'static str {
    match tf {
        TimeFrame::Day => "1Day",
    }
}

/// Builds the query string pairs for `GET /v2/stocks/bars`, without a page token.
pub fn construct_params(params: &BarsRequestParams) -> Vec<(String, String)> {
    let alpaca = match &params.provider_specific {
        ProviderParams::Alpaca(p) => p.clone(),
        ProviderParams::None => AlpacaBarsParams::default(),
    };

    let mut query = vec![
        ("symbols".to_string(), params.symbols.join(",")),
        ("timeframe".to_string(), timeframe_param(params.timeframe).to_string()),
        (
            "start".to_string(),
            params.start.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        (
            "end".to_string(),
            params.end.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        (
            "adjustment".to_string(),
            alpaca.adjustment.unwrap_or_default().as_str().to_string(),
        ),
        // Chronological order is what the normalizer expects.
        ("sort".to_string(), "asc".to_string()),
    ];
    if let Some(feed) = alpaca.feed {
        query.push(("feed".to_string(), feed.as_str().to_string()));
    }
    if let Some(limit) = alpaca.limit {
        query.push(("limit".to_string(), limit.to_string()));
    }
    query
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::window::LookbackWindow;

    fn value<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
        query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn daily_query() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let params = BarsRequestParams::daily("MSFT", &LookbackWindow::ending(today, 31));
        let query = construct_params(&params);

        assert_eq!(value(&query, "symbols"), Some("MSFT"));
        assert_eq!(value(&query, "timeframe"), Some("1Day"));
        assert_eq!(value(&query, "start"), Some("2024-01-01T00:00:00Z"));
        assert_eq!(value(&query, "end"), Some("2024-02-01T00:00:00Z"));
        assert_eq!(value(&query, "adjustment"), Some("all"));
        assert_eq!(value(&query, "sort"), Some("asc"));
        assert_eq!(value(&query, "feed"), None);
    }

    #[test]
    fn provider_specific_overrides() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let mut params = BarsRequestParams::daily("MSFT", &LookbackWindow::ending(today, 31));
        params.provider_specific = ProviderParams::Alpaca(AlpacaBarsParams {
            adjustment: Some(Adjustment::Raw),
            feed: Some(Feed::Iex),
            limit: Some(500),
        });
        let query = construct_params(&params);

        assert_eq!(value(&query, "adjustment"), Some("raw"));
        assert_eq!(value(&query, "feed"), Some("iex"));
        assert_eq!(value(&query, "limit"), Some("500"));
    }
}
