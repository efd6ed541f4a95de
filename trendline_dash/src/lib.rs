//! Turns a ticker and a lookback period into a trendline-detection request,
//! and drives detection, charting and benchmark statistics through
//! pluggable collaborators.

pub mod chart;
pub mod collaborators;
pub mod inputs;
pub mod options;
pub mod pipeline;
pub mod profile;
pub mod request;
pub mod table;

pub use options::TrendlineOptions;
pub use pipeline::{Interaction, Pipeline, PipelineError};
pub use request::{BuildError, TrendlineRequest, TrendlineRequestBuilder, build};
