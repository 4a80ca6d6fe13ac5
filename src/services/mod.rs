pub mod rsi_service;
pub mod series_fetcher;
