use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rsi_datahub::config::Config;
use rsi_datahub::errors::{Result, RsiHubError};
use rsi_datahub::models::result::OutputFormat;
use rsi_datahub::models::series::DailyClose;
use rsi_datahub::models::ticker::Segment;
use rsi_datahub::scrapers::base::{HistoryRequest, PriceScraper};
use rsi_datahub::services::rsi_service::RsiService;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// 固定数据的抓取器，记录被请求的代码
struct FakeScraper {
    series: HashMap<String, Vec<f64>>,
    requested: Mutex<Vec<String>>,
    delay: std::time::Duration,
    completed: AtomicI64,
}

impl FakeScraper {
    fn new(series: &[(&str, Vec<f64>)]) -> Self {
        Self {
            series: series.iter().map(|(s, p)| (s.to_string(), p.clone())).collect(),
            requested: Mutex::new(Vec::new()),
            delay: std::time::Duration::ZERO,
            completed: AtomicI64::new(0),
        }
    }

    fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = delay;
        self
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    fn completed(&self) -> i64 {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceScraper for FakeScraper {
    fn provider_code(&self) -> &'static str {
        "FAKE"
    }

    async fn fetch_daily_closes(&self, symbol: &str, _request: &HistoryRequest) -> Result<Vec<DailyClose>> {
        self.requested.lock().unwrap().push(symbol.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        let prices = self
            .series
            .get(symbol)
            .ok_or_else(|| RsiHubError::ProviderError(format!("unknown symbol {}", symbol)))?;
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        Ok(prices
            .iter()
            .enumerate()
            .map(|(i, p)| DailyClose {
                timestamp: start + Duration::days(i as i64),
                close: Some(*p),
            })
            .collect())
    }
}

/// 临时目录，包含 tickers.json 和 result/
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(tickers: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("tickers.json"), tickers).unwrap();
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn config(&self) -> Config {
        Config::new()
            .with_tickers_path(self.root().join("tickers.json").to_str().unwrap())
            .with_result_dir(self.root().join("result").to_str().unwrap())
    }

    fn result_file(&self) -> PathBuf {
        self.root().join("result").join("20240510.json")
    }
}

const TICKERS: &str = r#"{
    "A": {"name": "Alpha", "class": "Prime"},
    "B": {"name": "Beta", "class": "Standard"},
    "C": {"name": "Gamma", "class": "Prime"}
}"#;

fn rising(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + i as f64).collect()
}

fn reference() -> Vec<f64> {
    vec![10.0, 11.0, 12.0, 11.0, 10.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0, 18.0]
}

fn store_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 10, 7, 30, 0).unwrap()
}

#[tokio::test]
async fn test_mode_filters_by_segment() {
    let ws = Workspace::new(TICKERS);
    let scraper = Arc::new(FakeScraper::new(&[
        ("A.T", rising(20)),
        ("B.T", rising(20)),
        ("C.T", rising(20)),
    ]));

    let service = RsiService::new(ws.config().with_persist(false), scraper.clone());
    let doc = service.run_at("P", store_date(), now).await.unwrap();
    assert_eq!(scraper.requested(), vec!["A.T", "C.T"]);
    assert_eq!(doc.result.keys().collect::<Vec<_>>(), vec!["A", "C"]);

    let doc = service.run_at("S", store_date(), now).await.unwrap();
    assert_eq!(doc.result.keys().collect::<Vec<_>>(), vec!["B"]);

    let doc = service.run_at("X", store_date(), now).await.unwrap();
    assert!(doc.result.is_empty());
    assert_eq!(scraper.requested().len(), 3);
    assert!(!ws.result_file().exists());
}

#[tokio::test]
async fn test_runs_on_same_day_merge() {
    let ws = Workspace::new(TICKERS);
    let scraper = Arc::new(FakeScraper::new(&[
        ("A.T", reference()),
        ("B.T", rising(20)),
        ("C.T", rising(20)),
    ]));
    let service = RsiService::new(ws.config(), scraper);

    let first = service.run_at("P", store_date(), now).await.unwrap();
    assert_eq!(first.result.len(), 2);
    assert!(ws.result_file().exists());

    let second = service.run_at("S", store_date(), now).await.unwrap();
    assert_eq!(second.result.keys().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    assert_eq!(second.result["A"], first.result["A"]);

    let a = &second.result["A"];
    assert_eq!(a.rsi, Some(78.6));
    assert_eq!(a.price, 18.0);
    assert_eq!(a.end_date, "2024-01-15T00:00:00");
    assert_eq!(a.history.as_ref().map(|h| h.len()), Some(1));
    assert_eq!(second.date_modified, "2024-05-10T07:30:00");

    let stored = service.store().load(&store_date()).unwrap().unwrap();
    assert_eq!(stored, second);
}

#[tokio::test]
async fn test_history_is_bounded_to_most_recent() {
    let ws = Workspace::new(r#"{"A": {"name": "Alpha", "class": "Prime"}}"#);
    let scraper = Arc::new(FakeScraper::new(&[("A.T", rising(60))]));
    let service = RsiService::new(ws.config().with_persist(false), scraper);

    let doc = service.run_at("P", store_date(), now).await.unwrap();
    let history = doc.result["A"].history.clone().unwrap();
    assert_eq!(history.len(), 30);
    assert_eq!(history.last().unwrap().date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    assert_eq!(history.first().unwrap().date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    assert!(history.windows(2).all(|w| w[0].date < w[1].date));
    assert_eq!(history.last().unwrap().price, 159.0);
}

#[tokio::test]
async fn test_latest_only_mode_omits_history() {
    let ws = Workspace::new(r#"{"A": {"name": "Alpha", "class": "Prime"}}"#);
    let scraper = Arc::new(FakeScraper::new(&[("A.T", reference())]));
    let config = ws
        .config()
        .with_persist(false)
        .with_history_limit(None)
        .with_rsi_decimals(2);
    let service = RsiService::new(config, scraper);

    let doc = service.run_at("P", store_date(), now).await.unwrap();
    assert_eq!(doc.result["A"].rsi, Some(78.57));
    assert!(doc.result["A"].history.is_none());
}

#[tokio::test]
async fn test_failed_and_short_tickers_are_skipped() {
    let ws = Workspace::new(TICKERS);
    // B 数据不足，C 抓取失败
    let scraper = Arc::new(FakeScraper::new(&[("A.T", rising(15)), ("B.T", rising(13))]));
    let config = ws
        .config()
        .with_persist(false)
        .with_segment_labels(Segment::Prime, &["Prime", "Standard"]);
    let service = RsiService::new(config, scraper.clone());

    let doc = service.run_at("P", store_date(), now).await.unwrap();
    assert_eq!(scraper.requested(), vec!["A.T", "B.T", "C.T"]);
    assert_eq!(doc.result.keys().collect::<Vec<_>>(), vec!["A"]);
    assert_eq!(doc.result["A"].rsi, Some(100.0));
}

#[tokio::test]
async fn test_corrupt_previous_result_starts_empty() {
    let ws = Workspace::new(TICKERS);
    fs::create_dir_all(ws.root().join("result")).unwrap();
    fs::write(ws.result_file(), "not json").unwrap();

    let scraper = Arc::new(FakeScraper::new(&[("B.T", rising(20))]));
    let service = RsiService::new(ws.config(), scraper);

    let doc = service.run_at("S", store_date(), now).await.unwrap();
    assert_eq!(doc.result.keys().collect::<Vec<_>>(), vec!["B"]);
    let stored = service.store().load(&store_date()).unwrap().unwrap();
    assert_eq!(stored, doc);
}

#[tokio::test]
async fn test_missing_ticker_master_produces_previous_result() {
    let ws = Workspace::new(TICKERS);
    fs::remove_file(ws.root().join("tickers.json")).unwrap();
    fs::create_dir_all(ws.root().join("result")).unwrap();
    fs::write(
        ws.result_file(),
        r#"{"date_modified":"2024-05-10T01:00:00","result":{"Z":{"rsi":12.3,"price":50.0,"end_date":"2024-05-09T00:00:00"}}}"#,
    )
    .unwrap();

    let scraper = Arc::new(FakeScraper::new(&[]));
    let service = RsiService::new(ws.config().with_persist(false), scraper.clone());

    let doc = service.run_at("P", store_date(), now).await.unwrap();
    assert!(scraper.requested().is_empty());
    assert_eq!(doc.result.len(), 1);
    assert_eq!(doc.result["Z"].rsi, Some(12.3));
    assert_eq!(doc.date_modified, "2024-05-10T07:30:00");
}

#[tokio::test]
async fn test_debug_limit_caps_processed_tickers() {
    let ws = Workspace::new(TICKERS);
    let scraper = Arc::new(FakeScraper::new(&[("A.T", rising(20)), ("C.T", rising(20))]));
    let config = ws
        .config()
        .with_persist(false)
        .with_debug_mode(true)
        .with_debug_ticker_limit(1);
    let service = RsiService::new(config, scraper.clone());

    let doc = service.run_at("P", store_date(), now).await.unwrap();
    assert_eq!(scraper.requested(), vec!["A.T"]);
    assert_eq!(doc.result.len(), 1);
}

#[tokio::test]
async fn test_date_modified_is_taken_after_all_fetches() {
    let ws = Workspace::new(TICKERS);
    let scraper = Arc::new(
        FakeScraper::new(&[("A.T", rising(20)), ("C.T", rising(20))])
            .with_delay(std::time::Duration::from_millis(20)),
    );
    let service = RsiService::new(ws.config(), scraper.clone());

    // 每完成一次抓取时钟前进一秒
    let clock = || now() + Duration::seconds(scraper.completed());
    let doc = service.run_at("P", store_date(), clock).await.unwrap();

    assert_eq!(scraper.completed(), 2);
    assert_eq!(doc.date_modified, "2024-05-10T07:30:02");
    let stored = service.store().load(&store_date()).unwrap().unwrap();
    assert_eq!(stored.date_modified, "2024-05-10T07:30:02");
}

#[tokio::test]
async fn test_configured_output_format_renders_document() {
    let ws = Workspace::new(r#"{"A": {"name": "Alpha", "class": "Prime"}}"#);
    let scraper = Arc::new(FakeScraper::new(&[("A.T", reference())]));
    let config = ws.config().with_persist(false).with_output_format(OutputFormat::Pretty);
    let service = RsiService::new(config, scraper);
    assert_eq!(service.config().output_format, OutputFormat::Pretty);

    let doc = service.run_at("P", store_date(), now).await.unwrap();
    let text = doc.to_json(service.config().output_format).unwrap();
    assert!(text.contains("\n  \"date_modified\": \"2024-05-10T07:30:00\""));
    assert_eq!(serde_json::from_str::<serde_json::Value>(&text).unwrap()["result"]["A"]["rsi"], 78.6);
}
