//! Alpaca v2 stock bars REST provider.

pub mod params;
pub mod provider;
pub mod response;
