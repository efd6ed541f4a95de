use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use shared_utils::env::optional_env_var;
use tracing::{debug, warn};

use crate::{
    models::{
        bar::{Bar, BarSeries},
        request_params::BarsRequestParams,
        timeframe::TimeFrame,
    },
    providers::{
        ApiSnafu, DataProvider, ProviderError, ProviderInitError,
        yahoo_chart::response::{ChartEnvelope, ChartRow},
    },
};

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

// The endpoint throttles requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) trendline-dash";

pub struct YahooChartProvider {
    client: Client,
    base_url: String,
    auto_adjust: bool,
}

impl YahooChartProvider {
    /// Creates a provider against the public chart endpoint.
    ///
    /// `YAHOO_CHART_URL` overrides the base URL. Prices are split/dividend
    /// adjusted unless [`with_auto_adjust`](Self::with_auto_adjust) turns it off.
    pub fn new() -> Result<Self, ProviderInitError> {
        let base_url = optional_env_var("YAHOO_CHART_URL").unwrap_or_else(|| BASE_URL.to_string());
        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderInitError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));
        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auto_adjust: true,
        })
    }

    pub fn with_auto_adjust(mut self, auto_adjust: bool) -> Self {
        self.auto_adjust = auto_adjust;
        self
    }

    async fn fetch_symbol(
        &self,
        symbol: &str,
        interval: &str,
        params: &BarsRequestParams,
    ) -> Result<Option<BarSeries>, ProviderError> {
        let url = format!("{}/{}", self.base_url, symbol);
        let query = [
            ("period1", params.start.timestamp().to_string()),
            ("period2", params.end.timestamp().to_string()),
            ("interval", interval.to_string()),
            ("includeAdjustedClose", "true".to_string()),
        ];
        debug!(%symbol, %url, start = %params.start, end = %params.end, "requesting chart");

        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();

        // Unknown and delisted symbols come back as 404; that is "no data", not a failure.
        if status == StatusCode::NOT_FOUND {
            warn!(%symbol, "chart endpoint does not know this symbol");
            return Ok(None);
        }
        if !status.is_success() {
            let error_msg = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return ApiSnafu {
                status: status.as_u16(),
                message: error_msg,
            }
            .fail();
        }

        let envelope = response.json::<ChartEnvelope>().await?;
        if let Some(err) = envelope.chart.error {
            return ApiSnafu {
                status: status.as_u16(),
                message: format!("{}: {}", err.code, err.description.unwrap_or_default()),
            }
            .fail();
        }

        let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(None);
        };
        let bars: Vec<Bar> = result.rows(self.auto_adjust).into_iter().map(into_bar).collect();

        Ok(Some(BarSeries {
            symbol: symbol.to_string(),
            timeframe: params.timeframe,
            bars,
        }))
    }
}

fn into_bar(row: ChartRow) -> Bar {
    Bar {
        timestamp: row.timestamp,
        trading_date: row.trading_date,
        open: row.open,
        high: row.high,
        low: row.low,
        close: row.close,
        volume: row.volume,
    }
}

/// The chart endpoint's `interval` value for a timeframe.
pub fn interval_param(tf: TimeFrame) -> &'static str {
    match tf {
        TimeFrame::Day => "1d",
    }
}

#[async_trait]
impl DataProvider for YahooChartProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        let interval = interval_param(params.timeframe);

        let mut result = Vec::with_capacity(params.symbols.len());
        for symbol in &params.symbols {
            if let Some(series) = self.fetch_symbol(symbol, interval, &params).await? {
                result.push(series);
            }
        }
        Ok(result)
    }
}
