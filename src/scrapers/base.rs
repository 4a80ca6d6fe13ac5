use crate::models::series::DailyClose;
use crate::errors::Result;
use async_trait::async_trait;

/// History window requested from a price provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    /// Lookback range, e.g. "6mo"
    pub range: String,
    /// Bar interval, e.g. "1d"
    pub interval: String,
    /// Dividend/split adjusted closes instead of raw closes
    pub adjusted: bool,
}

impl Default for HistoryRequest {
    fn default() -> Self {
        Self {
            range: "6mo".to_string(),
            interval: "1d".to_string(),
            adjusted: false,
        }
    }
}

/// Base trait for daily price scrapers
#[async_trait]
pub trait PriceScraper {
    /// Get the provider code this scraper is for
    fn provider_code(&self) -> &'static str;

    /// Fetch daily closes for an exchange-qualified symbol.
    /// Rows may be unordered and may carry missing closes.
    async fn fetch_daily_closes(&self, symbol: &str, request: &HistoryRequest) -> Result<Vec<DailyClose>>;
}
