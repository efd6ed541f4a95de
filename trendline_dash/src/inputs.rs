//! What a user chose, and how a profile turns those choices into pipeline inputs.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    options::{OptionKey, OptionOverrides, TrendlineOptions},
    profile::DashboardProfile,
};

/// Everything the UI shell would read from its widgets, passed in explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInputs {
    /// Text-box symbol; blank falls back to the profile default only when
    /// `use_default_symbol` is set, otherwise it ends the interaction.
    pub symbol: String,
    pub use_default_symbol: bool,
    /// Page URL; a non-blank `symbol` query parameter wins over the text box.
    pub page_url: Option<String>,
    pub period_days: Option<u32>,
    pub overrides: OptionOverrides,
    pub view_statistics: bool,
}

/// Inputs after profile policy has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInputs {
    /// Still raw; the history normalizer trims, uppercases and rejects blanks.
    pub symbol: String,
    pub period_days: u32,
    pub options: TrendlineOptions,
    pub view_statistics: bool,
}

/// Reads `symbol` from a URL or bare query string (`?symbol=aapl&x=1`).
pub fn symbol_from_query(url: &str) -> Option<String> {
    let query = match url.split_once('?') {
        Some((_, q)) => q,
        None if url.contains('=') => url,
        None => return None,
    };
    let query = query.split('#').next().unwrap_or_default();

    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).ok()?;
    pairs
        .into_iter()
        .find(|(k, _)| k == "symbol")
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Overrides the user set on options the profile keeps fixed.
pub fn fixed_overrides(profile: &DashboardProfile, overrides: &OptionOverrides) -> Vec<OptionKey> {
    overrides
        .keys()
        .into_iter()
        .filter(|k| !profile.is_adjustable(*k))
        .collect()
}

/// Applies profile policy. Overrides of fixed options are ignored with a warning.
pub fn resolve(profile: &DashboardProfile, inputs: &UserInputs) -> ResolvedInputs {
    let from_query = inputs.page_url.as_deref().and_then(symbol_from_query);
    let symbol = match from_query {
        Some(s) => s,
        None if inputs.symbol.trim().is_empty() && inputs.use_default_symbol => {
            profile.default_symbol.clone()
        }
        None => inputs.symbol.clone(),
    };

    let options = profile
        .trendlines
        .defaults
        .with_overrides(&inputs.overrides, |k| profile.is_adjustable(k));
    for key in fixed_overrides(profile, &inputs.overrides) {
        warn!(option = key.as_str(), profile = %profile.name, "ignoring override of a fixed option");
    }

    let view_statistics = inputs.view_statistics && profile.statistics.available;
    if inputs.view_statistics && !view_statistics {
        debug!(profile = %profile.name, "statistics are not offered by this profile");
    }

    ResolvedInputs {
        symbol,
        period_days: inputs.period_days.unwrap_or(profile.period.default),
        options,
        view_statistics,
    }
}
