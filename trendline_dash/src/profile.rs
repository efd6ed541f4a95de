//! Dashboard profiles: everything that differed between the near-duplicate dashboards.
//!
//! A profile fixes the default symbol, the period slider's bounds and
//! default, the provider, whether trendlines are detected (and which of
//! their options a user may change), and whether benchmark statistics are
//! offered.
//!
//! Entrypoints:
//! - Built-in presets: [`DashboardProfile::preset`]
//! - Parse + validate from a TOML string: [`DashboardProfile::from_toml_str`]
//! - Parse + validate from a file path: [`load_profile_path`]

use std::path::Path;

use price_history::{models::window::LookbackBounds, providers::ProviderId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::{MINIMUM_POINTS_FLOOR, OptionKey, TrendlineOptions};

pub const DEFAULT_BENCHMARK: &str = "SPY";

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse profile TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown profile preset '{0}', expected one of: price, trendlines, stats")]
    UnknownPreset(String),

    #[error("invalid profile '{name}': {reason}")]
    Invalid { name: String, reason: String },
}

/// The lookback slider: inclusive bounds plus the starting value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeriodSettings {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

impl PeriodSettings {
    pub fn bounds(&self) -> LookbackBounds {
        LookbackBounds::new(self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrendlineSettings {
    pub enabled: bool,
    pub defaults: TrendlineOptions,
    /// Options a user may change; everything else stays at `defaults`.
    pub adjustable: Vec<OptionKey>,
}

impl Default for TrendlineSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            defaults: TrendlineOptions::default(),
            adjustable: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatisticsSettings {
    /// Whether the "view statistics" toggle is offered at all.
    pub available: bool,
    pub benchmark: String,
}

impl Default for StatisticsSettings {
    fn default() -> Self {
        Self {
            available: false,
            benchmark: DEFAULT_BENCHMARK.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardProfile {
    pub name: String,
    pub default_symbol: String,
    pub period: PeriodSettings,
    #[serde(default)]
    pub provider: ProviderId,
    #[serde(default)]
    pub trendlines: TrendlineSettings,
    #[serde(default)]
    pub statistics: StatisticsSettings,
}

impl Default for DashboardProfile {
    fn default() -> Self {
        Self::price()
    }
}

impl DashboardProfile {
    /// Plain price chart with a data dump, no trendlines or statistics.
    pub fn price() -> Self {
        Self {
            name: "price".into(),
            default_symbol: "SPY".into(),
            period: PeriodSettings {
                min: 10,
                max: 900,
                default: 365,
            },
            provider: ProviderId::Yahoo,
            trendlines: TrendlineSettings::default(),
            statistics: StatisticsSettings::default(),
        }
    }

    /// Trendline chart with the pivot checkboxes exposed.
    pub fn trendlines() -> Self {
        Self {
            name: "trendlines".into(),
            default_symbol: "MSFT".into(),
            period: PeriodSettings {
                min: 10,
                max: 900,
                default: 252,
            },
            provider: ProviderId::Yahoo,
            trendlines: TrendlineSettings {
                enabled: true,
                defaults: TrendlineOptions::default(),
                adjustable: vec![
                    OptionKey::FirstPointMustBePivot,
                    OptionKey::LastPointMustBePivot,
                    OptionKey::AllPointsMustBePivots,
                    OptionKey::MustIncludeGlobalExtremum,
                ],
            },
            statistics: StatisticsSettings::default(),
        }
    }

    /// Trendlines plus the benchmark statistics toggle.
    pub fn stats() -> Self {
        Self {
            name: "stats".into(),
            default_symbol: "QQQ".into(),
            period: PeriodSettings {
                min: 10,
                max: 730,
                default: 252,
            },
            statistics: StatisticsSettings {
                available: true,
                benchmark: DEFAULT_BENCHMARK.into(),
            },
            ..Self::trendlines()
        }
    }

    pub fn preset(name: &str) -> Result<Self, ProfileError> {
        match name.trim().to_lowercase().as_str() {
            "price" => Ok(Self::price()),
            "trendlines" => Ok(Self::trendlines()),
            "stats" => Ok(Self::stats()),
            other => Err(ProfileError::UnknownPreset(other.to_string())),
        }
    }

    pub fn is_adjustable(&self, key: OptionKey) -> bool {
        self.trendlines.adjustable.contains(&key)
    }

    /// Parse a profile from TOML, then normalize and validate it.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ProfileError> {
        let mut profile: DashboardProfile = toml::from_str(toml_str)?;
        profile.normalize();
        profile.validate()?;
        Ok(profile)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Trims names, uppercases symbols and drops repeated adjustable keys.
    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.default_symbol = self.default_symbol.trim().to_uppercase();
        self.statistics.benchmark = self.statistics.benchmark.trim().to_uppercase();

        let mut seen = Vec::with_capacity(self.trendlines.adjustable.len());
        self.trendlines.adjustable.retain(|k| {
            if seen.contains(k) {
                false
            } else {
                seen.push(*k);
                true
            }
        });
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        let invalid = |reason: String| ProfileError::Invalid {
            name: self.name.clone(),
            reason,
        };

        if self.name.is_empty() {
            return Err(invalid("name cannot be empty".into()));
        }
        if self.default_symbol.is_empty() {
            return Err(invalid("default_symbol cannot be empty".into()));
        }
        let p = self.period;
        if p.min == 0 {
            return Err(invalid("period.min must be at least 1".into()));
        }
        if !(p.min <= p.default && p.default <= p.max) {
            return Err(invalid(format!(
                "period.default {} must lie within {}..={}",
                p.default, p.min, p.max
            )));
        }
        if self.trendlines.defaults.minimum_points < MINIMUM_POINTS_FLOOR {
            return Err(invalid(format!(
                "trendlines.defaults.minimum_points must be at least {MINIMUM_POINTS_FLOOR}"
            )));
        }
        if self.statistics.available && self.statistics.benchmark.is_empty() {
            return Err(invalid("statistics.benchmark cannot be empty".into()));
        }
        Ok(())
    }
}

/// Read a profile TOML file from disk, parse, and validate it.
pub fn load_profile_path(path: impl AsRef<Path>) -> Result<DashboardProfile, ProfileError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ProfileError::Read {
        path: path.display().to_string(),
        source,
    })?;
    DashboardProfile::from_toml_str(&text)
}
