use crate::models::series::DailyClose;
use crate::errors::{Result, RsiHubError};
use crate::scrapers::base::{HistoryRequest, PriceScraper};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use log::debug;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

// Yahoo Finance chart 接口的响应结构
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i32,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

/// Yahoo Finance 日线数据抓取器
pub struct YahooScraper {
    client: Client,
    base_url: String,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl YahooScraper {
    /// 创建新的抓取器，`timeout` 为单次请求的超时时间
    pub fn new(timeout: Duration, min_interval: Duration) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout, min_interval)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration, min_interval: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0")
            .build()
            .map_err(RsiHubError::RequestError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            min_interval,
            last_request: Mutex::new(None),
        })
    }

    /// 等待请求频率限制
    async fn wait_for_rate_limit(&self) {
        let now = Instant::now();
        let should_wait = {
            let mut last = match self.last_request.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let should_wait = (*last)
                .map(|instant| instant.elapsed())
                .filter(|elapsed| *elapsed < self.min_interval)
                .map(|elapsed| self.min_interval - elapsed);
            *last = Some(now);
            should_wait
        };

        if let Some(wait_time) = should_wait {
            debug!("Waiting {:?} to respect rate limit", wait_time);
            tokio::time::sleep(wait_time).await;
        }
    }
}

/// 解析 chart 接口的响应文本
pub fn parse_chart_response(text: &str, adjusted: bool) -> Result<Vec<DailyClose>> {
    let response: ChartResponse = serde_json::from_str(text)?;

    if let Some(error) = response.chart.error {
        return Err(RsiHubError::ProviderError(format!(
            "{} - {}", error.code, error.description
        )));
    }

    let data = match response.chart.result.and_then(|r| r.into_iter().next()) {
        Some(data) => data,
        None => return Ok(Vec::new()),
    };

    let timestamps = data.timestamp.unwrap_or_default();
    if timestamps.is_empty() {
        return Ok(Vec::new());
    }

    let closes: Vec<Option<f64>> = if adjusted {
        data.indicators
            .adjclose
            .and_then(|a| a.into_iter().next())
            .map(|a| a.adjclose)
            .ok_or_else(|| RsiHubError::ProviderError("No adjusted close data".to_string()))?
    } else {
        data.indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .ok_or_else(|| RsiHubError::ProviderError("No quote data".to_string()))?
    };

    let offset = FixedOffset::east_opt(data.meta.gmtoffset).ok_or_else(|| {
        RsiHubError::ProviderError(format!("Invalid gmtoffset: {}", data.meta.gmtoffset))
    })?;

    let mut rows = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let utc = DateTime::from_timestamp(*ts, 0)
            .ok_or_else(|| RsiHubError::ProviderError(format!("Invalid timestamp: {}", ts)))?;
        // 日线统一为交易所本地日期的零点
        let local_date = utc.with_timezone(&offset).date_naive();
        let timestamp = match local_date.and_hms_opt(0, 0, 0) {
            Some(t) => t,
            None => continue,
        };
        rows.push(DailyClose {
            timestamp,
            close: closes.get(i).copied().flatten(),
        });
    }

    Ok(rows)
}

#[async_trait]
impl PriceScraper for YahooScraper {
    fn provider_code(&self) -> &'static str {
        "YAHOO"
    }

    async fn fetch_daily_closes(&self, symbol: &str, request: &HistoryRequest) -> Result<Vec<DailyClose>> {
        debug!("Fetching {} daily history for {}", request.range, symbol);

        // 限制请求频率
        self.wait_for_rate_limit().await;

        let response = self.client
            .get(format!("{}/{}", self.base_url, symbol))
            .query(&[
                ("range", request.range.as_str()),
                ("interval", request.interval.as_str()),
                ("includeAdjustedClose", "true"),
                ("events", "div,splits"),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        // 未知代码时接口返回404，但body中带有error对象
        if !status.is_success() {
            return match parse_chart_response(&text, request.adjusted) {
                Err(e @ RsiHubError::ProviderError(_)) => Err(e),
                _ => Err(RsiHubError::ProviderError(format!("HTTP status {}", status))),
            };
        }

        let rows = parse_chart_response(&text, request.adjusted)?;
        debug!("Got {} daily rows for {}", rows.len(), symbol);
        Ok(rows)
    }
}
