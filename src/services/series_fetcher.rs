use log::warn;
use std::sync::Arc;

use crate::models::series::{FetchOutcome, PriceSeries};
use crate::scrapers::base::{HistoryRequest, PriceScraper};

/// 价格序列获取：调用抓取器并规整数据，任何失败都转换为 `NoData`
pub struct SeriesFetcher {
    scraper: Arc<dyn PriceScraper + Send + Sync>,
    request: HistoryRequest,
}

impl SeriesFetcher {
    pub fn new(scraper: Arc<dyn PriceScraper + Send + Sync>, request: HistoryRequest) -> Self {
        Self { scraper, request }
    }

    pub async fn fetch(&self, symbol: &str) -> FetchOutcome {
        match self.scraper.fetch_daily_closes(symbol, &self.request).await {
            Ok(rows) => {
                let series = PriceSeries::from_daily_closes(rows);
                if series.is_empty() {
                    warn!("{}: no price data returned by {}", symbol, self.scraper.provider_code());
                    FetchOutcome::NoData {
                        reason: "empty history".to_string(),
                    }
                } else {
                    FetchOutcome::Series(series)
                }
            }
            Err(e) => {
                warn!("{}: failed to fetch from {}: {}", symbol, self.scraper.provider_code(), e);
                FetchOutcome::NoData {
                    reason: e.to_string(),
                }
            }
        }
    }
}
