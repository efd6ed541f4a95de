//! Yahoo Finance public chart endpoint (`/v8/finance/chart/{symbol}`).

pub mod provider;
pub mod response;
