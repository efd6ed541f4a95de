use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use price_history::providers::{ProviderId, build_provider};
use tracing_subscriber::EnvFilter;
use trendline_dash::{
    inputs::{UserInputs, fixed_overrides},
    options::OptionOverrides,
    pipeline::{Pipeline, PipelineError},
    profile::{DashboardProfile, load_profile_path},
    table::{self, TableFormat},
};

#[derive(Parser)]
#[command(version, about = "Daily price history and trendline-detection requests")]
struct Cli {
    /// Built-in profile: price, trendlines or stats
    #[arg(long, default_value = "price")]
    profile: String,

    /// TOML profile file; takes precedence over --profile
    #[arg(long, value_name = "FILE")]
    profile_file: Option<PathBuf>,

    /// Price provider: yahoo or alpaca (defaults to the profile's)
    #[arg(long)]
    provider: Option<ProviderId>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Fetch and print the normalized daily series
    History {
        #[command(flatten)]
        selection: Selection,

        /// Output format: text, csv or json
        #[arg(long, default_value = "text")]
        format: TableFormat,
    },

    /// Print the trendline-detection request as JSON
    Request {
        #[command(flatten)]
        selection: Selection,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Print the effective profile as TOML
    ShowProfile,
}

#[derive(Args)]
struct Selection {
    /// Ticker symbol (defaults to the profile's)
    #[arg(long)]
    symbol: Option<String>,

    /// Page URL carrying a `symbol` query parameter; wins over --symbol
    #[arg(long)]
    url: Option<String>,

    /// Lookback period in days (defaults to the profile's)
    #[arg(long)]
    period: Option<u32>,
}

#[derive(Args)]
struct OptionArgs {
    #[arg(long, value_name = "BOOL")]
    first_point_must_be_pivot: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    last_point_must_be_pivot: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    all_points_must_be_pivots: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    must_include_global_extremum: Option<bool>,
    #[arg(long, value_name = "N")]
    minimum_points: Option<u32>,
    #[arg(long, value_name = "BOOL")]
    ignore_breakout_lines: Option<bool>,
    /// Only scan bars from this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    scan_from_date: Option<NaiveDate>,
}

impl From<OptionArgs> for OptionOverrides {
    fn from(a: OptionArgs) -> Self {
        OptionOverrides {
            first_point_must_be_pivot: a.first_point_must_be_pivot,
            last_point_must_be_pivot: a.last_point_must_be_pivot,
            all_points_must_be_pivots: a.all_points_must_be_pivots,
            must_include_global_extremum: a.must_include_global_extremum,
            minimum_points: a.minimum_points,
            ignore_breakout_lines: a.ignore_breakout_lines,
            scan_from_date: a.scan_from_date,
        }
    }
}

impl Selection {
    fn into_inputs(self, overrides: OptionOverrides) -> UserInputs {
        UserInputs {
            use_default_symbol: self.symbol.is_none() && self.url.is_none(),
            symbol: self.symbol.unwrap_or_default(),
            page_url: self.url,
            period_days: self.period,
            overrides,
            view_statistics: false,
        }
    }
}

fn load_profile(cli: &Cli) -> Result<DashboardProfile> {
    let mut profile = match &cli.profile_file {
        Some(path) => load_profile_path(path)
            .with_context(|| format!("loading profile {}", path.display()))?,
        None => DashboardProfile::preset(&cli.profile)?,
    };
    if let Some(provider) = cli.provider {
        profile.provider = provider;
    }
    Ok(profile)
}

fn user_facing(err: PipelineError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

/// Refuses option flags the profile keeps fixed instead of silently dropping them.
fn check_option_flags(profile: &DashboardProfile, overrides: &OptionOverrides) -> Result<()> {
    let fixed = fixed_overrides(profile, overrides);
    if fixed.is_empty() {
        return Ok(());
    }
    let flags: Vec<String> = fixed
        .iter()
        .map(|k| format!("--{}", k.as_str().replace('_', "-")))
        .collect();
    bail!(
        "profile '{}' keeps {} fixed; list the option under trendlines.adjustable in a --profile-file to change it",
        profile.name,
        flags.join(", ")
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = load_profile(&cli)?;
    let today = Local::now().date_naive();

    match cli.cmd {
        Cmd::ShowProfile => {
            print!("{}", profile.to_toml_string()?);
        }

        Cmd::History { selection, format } => {
            let provider = build_provider(profile.provider)?;
            let pipeline = Pipeline::new(&profile, provider.as_ref());
            let inputs = selection.into_inputs(OptionOverrides::default());

            let prepared = pipeline.prepare(&inputs, today).await.map_err(user_facing)?;
            eprintln!("{}", prepared.heading);
            print!("{}", table::render(&prepared.series, format)?);
            if format == TableFormat::Json {
                println!();
            }
        }

        Cmd::Request { selection, options } => {
            if !profile.trendlines.enabled {
                bail!(
                    "profile '{}' does not detect trendlines; try --profile trendlines",
                    profile.name
                );
            }
            let overrides = OptionOverrides::from(options);
            check_option_flags(&profile, &overrides)?;

            let provider = build_provider(profile.provider)?;
            let pipeline = Pipeline::new(&profile, provider.as_ref());
            let inputs = selection.into_inputs(overrides);

            let prepared = pipeline.prepare(&inputs, today).await.map_err(user_facing)?;
            let request = prepared
                .request
                .context("trendline profile produced no request")?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn request_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "trendline-dash",
            "--profile",
            "trendlines",
            "request",
            "--symbol",
            "msft",
            "--minimum-points",
            "4",
            "--first-point-must-be-pivot",
            "false",
            "--scan-from-date",
            "2024-01-02",
        ])
        .unwrap();

        let Cmd::Request { selection, options } = cli.cmd else {
            panic!("expected request subcommand");
        };
        let inputs = selection.into_inputs(options.into());
        assert_eq!(inputs.symbol, "msft");
        assert!(!inputs.use_default_symbol);
        assert_eq!(inputs.overrides.minimum_points, Some(4));
        assert_eq!(inputs.overrides.first_point_must_be_pivot, Some(false));
        assert_eq!(
            inputs.overrides.scan_from_date,
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
    }

    #[test]
    fn missing_symbol_falls_back_to_profile_default() {
        let cli = Cli::try_parse_from(["trendline-dash", "history", "--format", "csv"]).unwrap();
        let Cmd::History { selection, format } = cli.cmd else {
            panic!("expected history subcommand");
        };
        assert_eq!(format, TableFormat::Csv);
        assert!(selection.into_inputs(OptionOverrides::default()).use_default_symbol);
    }

    #[test]
    fn provider_flag_overrides_profile() {
        let cli = Cli::try_parse_from(["trendline-dash", "--provider", "alpaca", "show-profile"])
            .unwrap();
        assert_eq!(load_profile(&cli).unwrap().provider, ProviderId::Alpaca);
    }

    fn request_overrides(args: &[&str]) -> (DashboardProfile, OptionOverrides) {
        let cli = Cli::try_parse_from(args).unwrap();
        let profile = load_profile(&cli).unwrap();
        let Cmd::Request { options, .. } = cli.cmd else {
            panic!("expected request subcommand");
        };
        (profile, options.into())
    }

    #[test]
    fn flags_for_fixed_options_are_rejected() {
        let (profile, overrides) = request_overrides(&[
            "trendline-dash",
            "--profile",
            "trendlines",
            "request",
            "--minimum-points",
            "1",
            "--scan-from-date",
            "2024-01-02",
        ]);

        let err = check_option_flags(&profile, &overrides).unwrap_err().to_string();
        assert!(err.contains("--minimum-points"), "{err}");
        assert!(err.contains("--scan-from-date"), "{err}");
        assert!(err.contains("'trendlines'"), "{err}");
    }

    #[test]
    fn flags_for_adjustable_options_pass() {
        let (profile, overrides) = request_overrides(&[
            "trendline-dash",
            "--profile",
            "stats",
            "request",
            "--first-point-must-be-pivot",
            "false",
            "--must-include-global-extremum",
            "true",
        ]);

        assert!(check_option_flags(&profile, &overrides).is_ok());
    }

    #[test]
    fn pipeline_failures_keep_their_source() {
        let provider_err = price_history::providers::ApiSnafu {
            status: 429u16,
            message: "rate limited",
        }
        .build();
        let err = user_facing(PipelineError::History(price_history::HistoryError::Provider {
            symbol: "MSFT".into(),
            source: provider_err,
        }));

        assert!(err.to_string().starts_with("The price provider could not be reached"));
        assert!(err.downcast_ref::<PipelineError>().is_some());
        let chain: Vec<String> = err.chain().map(ToString::to_string).collect();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[2], "API error (429): rate limited");
    }
}
