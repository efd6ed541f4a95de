use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::America::New_York;
use indexmap::IndexMap;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::{get_env_var, optional_env_var};
use tracing::debug;

use crate::{
    models::{
        bar::{Bar, BarSeries},
        request_params::BarsRequestParams,
    },
    providers::{
        ApiSnafu, DataProvider, ProviderError, ProviderInitError,
        alpaca_rest::{
            params::construct_params,
            response::{AlpacaBar, AlpacaResponse},
        },
    },
};

const BASE_URL: &str = "https://data.alpaca.markets/v2/stocks/bars";

pub struct AlpacaProvider {
    client: Client,
    base_url: String,
    _api_key: SecretString,
    _secret_key: SecretString,
}

impl AlpacaProvider {
    /// Creates a new Alpaca provider.
    ///
    /// Reads API keys from the `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`
    /// environment variables. `APCA_DATA_URL` overrides the bars endpoint.
    pub fn new() -> Result<Self, ProviderInitError> {
        let api_key = SecretString::new(get_env_var("APCA_API_KEY_ID")?.into());
        let secret_key = SecretString::new(get_env_var("APCA_API_SECRET_KEY")?.into());

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "APCA-API-KEY-ID",
            header::HeaderValue::from_str(api_key.expose_secret())?,
        );
        let mut secret = header::HeaderValue::from_str(secret_key.expose_secret())?;
        secret.set_sensitive(true);
        headers.insert("APCA-API-SECRET-KEY", secret);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: optional_env_var("APCA_DATA_URL").unwrap_or_else(|| BASE_URL.to_string()),
            _api_key: api_key,
            _secret_key: secret_key,
        })
    }
}

/// US equity sessions are dated in New York time; Alpaca stamps daily bars at local midnight.
fn session_date(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&New_York).date_naive()
}

fn into_bar(ab: AlpacaBar) -> Bar {
    Bar {
        timestamp: ab.timestamp,
        trading_date: session_date(ab.timestamp),
        open: ab.open,
        high: ab.high,
        low: ab.low,
        close: ab.close,
        volume: Some(ab.volume),
    }
}

#[async_trait]
impl DataProvider for AlpacaProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        let mut all_bars: IndexMap<String, Vec<AlpacaBar>> = IndexMap::new();
        let mut next_page_token: Option<String> = None;

        loop {
            let mut query_params = construct_params(&params);
            if let Some(token) = &next_page_token {
                query_params.push(("page_token".to_string(), token.clone()));
            }

            let response = self
                .client
                .get(&self.base_url)
                .query(&query_params)
                .send()
                .await?;

            let status = response.status();
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

            let alpaca_response = response.json::<AlpacaResponse>().await?;

            // Merge the bars from the current page into our collection.
            for (symbol, bars) in alpaca_response.bars.unwrap_or_default() {
                all_bars.entry(symbol).or_default().extend(bars);
            }

            // If there's a next page token, use it for the next iteration. Otherwise, we're done.
            match alpaca_response.next_page_token {
                Some(token) => {
                    debug!(page_token = %token, "following Alpaca pagination");
                    next_page_token = Some(token);
                }
                None => break,
            }
        }

        // Convert the accumulated bars into the final Vec<BarSeries>
        let result = all_bars
            .into_iter()
            .map(|(symbol, alpaca_bars)| BarSeries {
                symbol,
                timeframe: params.timeframe,
                bars: alpaca_bars.into_iter().map(into_bar).collect(),
            })
            .collect();

        Ok(result)
    }
}
