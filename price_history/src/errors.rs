use chrono::NaiveDate;
use thiserror::Error;

use crate::providers::ProviderError;

/// Why a history fetch produced no usable series.
///
/// `NoData` and `Provider` are kept apart so callers can tell an unknown or
/// delisted symbol from an outage, even when both end the interaction.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The symbol was blank after trimming.
    #[error("Symbol must not be empty")]
    EmptySymbol,

    /// The lookback period falls outside the allowed range.
    #[error("Lookback of {days} days is outside the allowed range {min}..={max}")]
    LookbackOutOfRange { days: u32, min: u32, max: u32 },

    /// The provider answered, but had no bars for the symbol in the window.
    #[error("No data for {symbol} between {start} and {end}")]
    NoData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// The provider itself failed (network error, throttling, bad credentials).
    #[error("Fetching {symbol} failed: {source}")]
    Provider {
        symbol: String,
        #[source]
        source: ProviderError,
    },
}
