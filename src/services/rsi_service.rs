use crate::config::Config;
use crate::errors::Result;
use crate::indicators::{rsi_history, rsi_latest};
use crate::models::result::{ResultDocument, TickerResult};
use crate::models::series::PriceSeries;
use crate::models::ticker::{Segment, TickerMeta};
use crate::scrapers::base::PriceScraper;
use crate::services::series_fetcher::SeriesFetcher;
use crate::store::{load_ticker_master, ResultStore};
use crate::util;
use chrono::{DateTime, NaiveDate, Utc};
use log::{error, info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

/// 合并结果：本次计算的股票覆盖旧值，未处理的股票保留旧值
pub fn merge_results(
    previous: BTreeMap<String, TickerResult>,
    new_entries: BTreeMap<String, TickerResult>,
) -> BTreeMap<String, TickerResult> {
    let mut merged = previous;
    merged.extend(new_entries);
    merged
}

/// RSI服务，处理股票筛选、价格获取、指标计算和结果合并
pub struct RsiService {
    config: Config,
    fetcher: SeriesFetcher,
    store: ResultStore,
}

impl RsiService {
    /// 创建新的RSI服务实例
    pub fn new(config: Config, scraper: Arc<dyn PriceScraper + Send + Sync>) -> Self {
        let fetcher = SeriesFetcher::new(scraper, config.history_request());
        let store = ResultStore::new(&config.result_dir);
        Self { config, fetcher, store }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// 以当前UTC日期为结果日期运行
    pub async fn run(&self, mode: &str) -> Result<ResultDocument> {
        self.run_at(mode, Utc::now().date_naive(), Utc::now).await
    }

    /// 处理指定模式下的所有股票，合并到 `store_date` 的结果中。
    ///
    /// `clock` 在合并完成后读取，作为 `date_modified`。
    pub async fn run_at<F>(&self, mode: &str, store_date: NaiveDate, clock: F) -> Result<ResultDocument>
    where
        F: Fn() -> DateTime<Utc>,
    {
        let tickers = self.load_tickers();
        let previous = self.load_previous(&store_date);

        let segment = Segment::from_mode(mode);
        if segment.is_none() {
            warn!("Unknown mode {:?}, no tickers will be processed", mode);
        }

        let total = tickers.len();
        let mut new_entries = BTreeMap::new();
        let mut processed = 0usize;

        for (count, meta) in tickers.iter().enumerate() {
            match segment {
                Some(s) if self.config.segments.matches(s, &meta.class) => {}
                _ => continue,
            }

            // 调试模式：只处理前N个股票
            if self.config.debug_mode && processed >= self.config.debug_ticker_limit {
                info!("DEBUG MODE: stopping after {} tickers", processed);
                break;
            }
            processed += 1;

            info!("{}/{} t:{} {} {}", count + 1, total, meta.ticker, meta.name, meta.class);

            if let Some(result) = self.process_ticker(meta).await {
                new_entries.insert(meta.ticker.clone(), result);
            }
        }

        info!("Computed RSI for {} of {} examined tickers", new_entries.len(), processed);

        let result = merge_results(previous, new_entries);
        let finished_at = clock();
        let document = ResultDocument::new(util::format_timestamp(&finished_at.naive_utc()), result);

        if self.config.persist {
            if let Err(e) = self.store.save(&store_date, &document) {
                error!("Failed to save result for {}: {}", util::date_key(&store_date), e);
            }
        }

        Ok(document)
    }

    /// 处理单个股票，数据不足或获取失败时返回 None
    pub async fn process_ticker(&self, meta: &TickerMeta) -> Option<TickerResult> {
        let symbol = format!("{}{}", meta.ticker, self.config.symbol_suffix);
        let outcome = self.fetcher.fetch(&symbol).await;

        let series = match outcome.series() {
            Some(series) if series.len() >= self.config.period => series,
            _ => {
                info!("  - prices too short for RSI calculation: {}", symbol);
                return None;
            }
        };

        let result = self.build_result(&meta.ticker, series);
        if result.is_none() {
            info!("  - no RSI value produced: {}", symbol);
        }
        result
    }

    fn build_result(&self, ticker: &str, series: &PriceSeries) -> Option<TickerResult> {
        let prices = series.prices();
        let price = series.last_close()?;

        match self.config.history_limit {
            Some(limit) => {
                let (current, mut history) =
                    rsi_history(&prices, &series.dates(), self.config.period, self.config.precision);
                let rsi = current?;
                util::limit_history(&mut history, limit, ticker);
                Some(TickerResult {
                    rsi: Some(rsi),
                    price,
                    end_date: series.end_date(),
                    history: Some(history),
                })
            }
            None => {
                let rsi = rsi_latest(&prices, self.config.period)
                    .map(|v| util::round_half_up(v, self.config.precision.rsi))?;
                Some(TickerResult {
                    rsi: Some(rsi),
                    price,
                    end_date: series.end_date(),
                    history: None,
                })
            }
        }
    }

    fn load_tickers(&self) -> Vec<TickerMeta> {
        let path = &self.config.tickers_path;
        match load_ticker_master(path) {
            Ok(Some(tickers)) => tickers,
            Ok(None) => {
                warn!("Ticker master {} not found, nothing to process", path.display());
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to read ticker master {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    fn load_previous(&self, date: &NaiveDate) -> BTreeMap<String, TickerResult> {
        match self.store.load(date) {
            Ok(Some(document)) => document.result,
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!("Ignoring unreadable result for {}: {}", util::date_key(date), e);
                BTreeMap::new()
            }
        }
    }
}
