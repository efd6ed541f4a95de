//! One linear pass per user interaction:
//! resolve inputs → fetch + normalize → build request → detect → chart → statistics.
//!
//! Nothing is cached or shared between passes. Any failure ends the pass
//! before later collaborators are touched.

use std::sync::Arc;

use chrono::NaiveDate;
use price_history::{HistoryError, HistoryNormalizer, NormalizedSeries, providers::DataProvider};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    chart::{PriceChart, page_heading},
    collaborators::{
        BenchmarkStats, ChartRenderer, CollaboratorError, RenderedChart, StatsTable,
        TrendlineDetector, TrendlineSegment,
    },
    inputs::{ResolvedInputs, UserInputs, resolve},
    profile::DashboardProfile,
    request::{BuildError, TrendlineRequest, TrendlineRequestBuilder, check_options},
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Request(#[from] BuildError),

    #[error("Trendline detection failed: {0}")]
    Detection(#[source] CollaboratorError),

    #[error("Chart rendering failed: {0}")]
    Render(#[source] CollaboratorError),

    #[error("Benchmark statistics failed: {0}")]
    Statistics(#[source] CollaboratorError),
}

/// How an interaction ended, coarse enough to pick a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    EmptySymbol,
    InvalidPeriod,
    NoData,
    ProviderFailure,
    InvalidOptions,
    Collaborator,
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::History(HistoryError::EmptySymbol) => FailureKind::EmptySymbol,
            PipelineError::History(HistoryError::LookbackOutOfRange { .. }) => {
                FailureKind::InvalidPeriod
            }
            PipelineError::History(HistoryError::NoData { .. })
            | PipelineError::Request(BuildError::EmptySeries { .. }) => FailureKind::NoData,
            PipelineError::History(HistoryError::Provider { .. }) => FailureKind::ProviderFailure,
            PipelineError::Request(BuildError::InvalidOptions { .. }) => FailureKind::InvalidOptions,
            PipelineError::Detection(_)
            | PipelineError::Render(_)
            | PipelineError::Statistics(_) => FailureKind::Collaborator,
        }
    }

    /// Warning text for the UI shell.
    pub fn user_message(&self) -> String {
        match self.kind() {
            FailureKind::EmptySymbol => "Please enter a symbol.".to_string(),
            FailureKind::NoData => format!("No data available. {self}"),
            FailureKind::ProviderFailure => {
                format!("The price provider could not be reached, try again later. {self}")
            }
            FailureKind::InvalidPeriod | FailureKind::InvalidOptions | FailureKind::Collaborator => {
                self.to_string()
            }
        }
    }
}

/// Everything up to and including the trendline request.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub heading: String,
    pub inputs: ResolvedInputs,
    pub series: Arc<NormalizedSeries>,
    /// Present when the profile detects trendlines.
    pub request: Option<TrendlineRequest>,
}

/// The outputs of one complete pass.
#[derive(Debug, Clone)]
pub struct Interaction {
    pub heading: String,
    pub series: Arc<NormalizedSeries>,
    pub request: Option<TrendlineRequest>,
    pub segments: Vec<TrendlineSegment>,
    pub chart: PriceChart,
    pub rendered: Option<RenderedChart>,
    pub stats: Option<StatsTable>,
}

pub struct Pipeline<'a> {
    profile: &'a DashboardProfile,
    provider: &'a (dyn DataProvider + Send + Sync),
    detector: Option<&'a dyn TrendlineDetector>,
    renderer: Option<&'a dyn ChartRenderer>,
    stats: Option<&'a (dyn BenchmarkStats + Send + Sync)>,
}

impl<'a> Pipeline<'a> {
    pub fn new(profile: &'a DashboardProfile, provider: &'a (dyn DataProvider + Send + Sync)) -> Self {
        Self {
            profile,
            provider,
            detector: None,
            renderer: None,
            stats: None,
        }
    }

    pub fn with_detector(mut self, detector: &'a dyn TrendlineDetector) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_renderer(mut self, renderer: &'a dyn ChartRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_stats(mut self, stats: &'a (dyn BenchmarkStats + Send + Sync)) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Resolves inputs, fetches the series and, for trendline profiles, builds the request.
    ///
    /// Options are checked before the fetch so a bad `minimum_points` costs no network call.
    pub async fn prepare(
        &self,
        inputs: &UserInputs,
        today: NaiveDate,
    ) -> Result<Prepared, PipelineError> {
        let resolved = resolve(self.profile, inputs);
        if self.profile.trendlines.enabled {
            check_options(&resolved.options)?;
        }

        let normalizer = HistoryNormalizer::new(self.profile.period.bounds());
        let series = Arc::new(
            normalizer
                .fetch(self.provider, &resolved.symbol, resolved.period_days, today)
                .await?,
        );

        let request = if self.profile.trendlines.enabled {
            Some(
                TrendlineRequestBuilder::new(Arc::clone(&series))
                    .options(resolved.options.clone())
                    .build()?,
            )
        } else {
            None
        };

        Ok(Prepared {
            heading: page_heading(series.symbol(), resolved.period_days),
            inputs: resolved,
            series,
            request,
        })
    }

    /// Runs a whole interaction.
    pub async fn run(
        &self,
        inputs: &UserInputs,
        today: NaiveDate,
    ) -> Result<Interaction, PipelineError> {
        let Prepared {
            heading,
            inputs: resolved,
            series,
            request,
        } = self.prepare(inputs, today).await?;

        let segments = match (&request, self.detector) {
            (Some(req), Some(detector)) => {
                let found = detector.detect(req).map_err(PipelineError::Detection)?;
                let total = found.len();
                let kept: Vec<TrendlineSegment> =
                    found.into_iter().filter(TrendlineSegment::is_well_formed).collect();
                if kept.len() < total {
                    warn!(dropped = total - kept.len(), "detector returned malformed segments");
                }
                kept
            }
            (Some(_), None) => {
                warn!(profile = %self.profile.name, "no trendline detector wired, skipping detection");
                Vec::new()
            }
            (None, _) => Vec::new(),
        };

        let chart = PriceChart::for_series(&series, resolved.period_days)
            .with_trendlines(segments.clone());
        let rendered = self
            .renderer
            .map(|r| r.render(&chart))
            .transpose()
            .map_err(PipelineError::Render)?;

        let stats = match (resolved.view_statistics, self.stats) {
            (true, Some(engine)) => Some(
                engine
                    .compute(
                        series.symbol(),
                        &series.dates(),
                        &self.profile.statistics.benchmark,
                    )
                    .await
                    .map_err(PipelineError::Statistics)?,
            ),
            (true, None) => {
                warn!("statistics requested but no statistics engine wired");
                None
            }
            (false, _) => None,
        };

        info!(
            symbol = series.symbol(),
            bars = series.len(),
            trendlines = segments.len(),
            stats = stats.is_some(),
            "interaction complete"
        );

        Ok(Interaction {
            heading,
            series,
            request,
            segments,
            chart,
            rendered,
            stats,
        })
    }
}
