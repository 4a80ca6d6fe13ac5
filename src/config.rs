use std::path::PathBuf;
use std::time::Duration;

use crate::indicators::{Precision, DEFAULT_PERIOD};
use crate::models::result::OutputFormat;
use crate::models::ticker::{Segment, SegmentTable};
use crate::scrapers::base::HistoryRequest;

pub struct Config {
    pub debug_mode: bool,
    pub debug_ticker_limit: usize,
    pub tickers_path: PathBuf,
    pub result_dir: PathBuf,
    pub symbol_suffix: String,
    pub period: usize,
    /// 保留的RSI历史条数，None 表示不输出历史（只计算最新值）
    pub history_limit: Option<usize>,
    pub precision: Precision,
    pub adjusted_prices: bool,
    pub lookback_range: String,
    pub interval: String,
    pub request_timeout: Duration,
    pub min_request_interval: Duration,
    pub output_format: OutputFormat,
    /// 运行结束后是否写回当日结果文件
    pub persist: bool,
    pub segments: SegmentTable,
}

impl Config {
    pub fn new() -> Self {
        Self {
            debug_mode: false,
            debug_ticker_limit: 10,
            tickers_path: PathBuf::from("tickers.json"),
            result_dir: PathBuf::from("result"),
            symbol_suffix: ".T".to_string(),
            period: DEFAULT_PERIOD,
            history_limit: Some(30),
            precision: Precision::default(),
            adjusted_prices: false,
            lookback_range: "6mo".to_string(),
            interval: "1d".to_string(),
            request_timeout: Duration::from_secs(30),
            min_request_interval: Duration::from_millis(500),
            output_format: OutputFormat::Compact,
            persist: true,
            segments: SegmentTable::default(),
        }
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    pub fn with_debug_ticker_limit(mut self, limit: usize) -> Self {
        self.debug_ticker_limit = limit;
        self
    }

    pub fn with_tickers_path(mut self, path: &str) -> Self {
        self.tickers_path = PathBuf::from(path);
        self
    }

    pub fn with_result_dir(mut self, dir: &str) -> Self {
        self.result_dir = PathBuf::from(dir);
        self
    }

    pub fn with_symbol_suffix(mut self, suffix: &str) -> Self {
        self.symbol_suffix = suffix.to_string();
        self
    }

    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_rsi_decimals(mut self, decimals: u32) -> Self {
        self.precision.rsi = decimals;
        self
    }

    pub fn with_adjusted_prices(mut self, adjusted: bool) -> Self {
        self.adjusted_prices = adjusted;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    pub fn with_segment_labels(mut self, segment: Segment, labels: &[&str]) -> Self {
        self.segments = self.segments.with_labels(segment, labels);
        self
    }

    /// 构造抓取请求参数
    pub fn history_request(&self) -> HistoryRequest {
        HistoryRequest {
            range: self.lookback_range.clone(),
            interval: self.interval.clone(),
            adjusted: self.adjusted_prices,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
