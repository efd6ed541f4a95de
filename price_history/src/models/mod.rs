pub mod bar;
pub mod price_bar;
pub mod request_params;
pub mod timeframe;
pub mod window;
