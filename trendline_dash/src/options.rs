//! Trendline-detection options and the user overrides layered on top of them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Detection engines refuse lines through fewer anchors than this.
pub const MINIMUM_POINTS_FLOOR: u32 = 2;

/// Options handed verbatim to the trendline-detection engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrendlineOptions {
    pub first_point_must_be_pivot: bool,
    pub last_point_must_be_pivot: bool,
    pub all_points_must_be_pivots: bool,
    pub must_include_global_extremum: bool,
    pub minimum_points: u32,
    pub ignore_breakout_lines: bool,
    /// Only scan bars from this date on; `None` scans the whole series.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_from_date: Option<NaiveDate>,
}

impl Default for TrendlineOptions {
    fn default() -> Self {
        Self {
            first_point_must_be_pivot: true,
            last_point_must_be_pivot: true,
            all_points_must_be_pivots: true,
            must_include_global_extremum: false,
            minimum_points: 3,
            ignore_breakout_lines: true,
            scan_from_date: None,
        }
    }
}

/// Names of the individual options, used by profiles to mark which ones a user may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKey {
    FirstPointMustBePivot,
    LastPointMustBePivot,
    AllPointsMustBePivots,
    MustIncludeGlobalExtremum,
    MinimumPoints,
    IgnoreBreakoutLines,
    ScanFromDate,
}

impl OptionKey {
    /// The option's field name, as spelled in profiles and requests.
    pub fn as_str(self) -> &'static str {
        match self {
            OptionKey::FirstPointMustBePivot => "first_point_must_be_pivot",
            OptionKey::LastPointMustBePivot => "last_point_must_be_pivot",
            OptionKey::AllPointsMustBePivots => "all_points_must_be_pivots",
            OptionKey::MustIncludeGlobalExtremum => "must_include_global_extremum",
            OptionKey::MinimumPoints => "minimum_points",
            OptionKey::IgnoreBreakoutLines => "ignore_breakout_lines",
            OptionKey::ScanFromDate => "scan_from_date",
        }
    }
}

/// Values a user picked in the UI; `None` keeps the profile default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionOverrides {
    pub first_point_must_be_pivot: Option<bool>,
    pub last_point_must_be_pivot: Option<bool>,
    pub all_points_must_be_pivots: Option<bool>,
    pub must_include_global_extremum: Option<bool>,
    pub minimum_points: Option<u32>,
    pub ignore_breakout_lines: Option<bool>,
    pub scan_from_date: Option<NaiveDate>,
}

impl OptionOverrides {
    /// Keys the user actually set.
    pub fn keys(&self) -> Vec<OptionKey> {
        let mut keys = Vec::new();
        if self.first_point_must_be_pivot.is_some() {
            keys.push(OptionKey::FirstPointMustBePivot);
        }
        if self.last_point_must_be_pivot.is_some() {
            keys.push(OptionKey::LastPointMustBePivot);
        }
        if self.all_points_must_be_pivots.is_some() {
            keys.push(OptionKey::AllPointsMustBePivots);
        }
        if self.must_include_global_extremum.is_some() {
            keys.push(OptionKey::MustIncludeGlobalExtremum);
        }
        if self.minimum_points.is_some() {
            keys.push(OptionKey::MinimumPoints);
        }
        if self.ignore_breakout_lines.is_some() {
            keys.push(OptionKey::IgnoreBreakoutLines);
        }
        if self.scan_from_date.is_some() {
            keys.push(OptionKey::ScanFromDate);
        }
        keys
    }
}

impl TrendlineOptions {
    /// Applies the overrides whose key `allowed` accepts, leaving the rest at `self`.
    pub fn with_overrides(
        &self,
        overrides: &OptionOverrides,
        allowed: impl Fn(OptionKey) -> bool,
    ) -> TrendlineOptions {
        fn pick<T: Clone>(current: &T, over: &Option<T>, ok: bool) -> T {
            match over {
                Some(v) if ok => v.clone(),
                _ => current.clone(),
            }
        }

        TrendlineOptions {
            first_point_must_be_pivot: pick(
                &self.first_point_must_be_pivot,
                &overrides.first_point_must_be_pivot,
                allowed(OptionKey::FirstPointMustBePivot),
            ),
            last_point_must_be_pivot: pick(
                &self.last_point_must_be_pivot,
                &overrides.last_point_must_be_pivot,
                allowed(OptionKey::LastPointMustBePivot),
            ),
            all_points_must_be_pivots: pick(
                &self.all_points_must_be_pivots,
                &overrides.all_points_must_be_pivots,
                allowed(OptionKey::AllPointsMustBePivots),
            ),
            must_include_global_extremum: pick(
                &self.must_include_global_extremum,
                &overrides.must_include_global_extremum,
                allowed(OptionKey::MustIncludeGlobalExtremum),
            ),
            minimum_points: pick(
                &self.minimum_points,
                &overrides.minimum_points,
                allowed(OptionKey::MinimumPoints),
            ),
            ignore_breakout_lines: pick(
                &self.ignore_breakout_lines,
                &overrides.ignore_breakout_lines,
                allowed(OptionKey::IgnoreBreakoutLines),
            ),
            scan_from_date: match overrides.scan_from_date {
                Some(d) if allowed(OptionKey::ScanFromDate) => Some(d),
                _ => self.scan_from_date,
            },
        }
    }
}
