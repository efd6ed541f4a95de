//! Daily price history for a symbol: provider access and normalization into
//! a pivot-ready series.

pub mod errors;
pub mod models;
pub mod normalizer;
pub mod providers;

pub use errors::HistoryError;
pub use models::price_bar::{NormalizedSeries, PriceBar};
pub use normalizer::{HistoryNormalizer, PriceRecord};
