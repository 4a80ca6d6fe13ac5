pub mod tickers;

use chrono::NaiveDate;
use log::{info, warn};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::models::result::{OutputFormat, ResultDocument, TickerResult};
use crate::util;

pub use tickers::load_ticker_master;

// 文件中的原始结构，逐条校验后再转换为 ResultDocument
#[derive(Debug, Deserialize)]
struct StoredDocument {
    #[serde(default)]
    date_modified: String,
    #[serde(default)]
    result: Map<String, Value>,
}

/// 按UTC日期保存的结果文件（`<dir>/<YYYYMMDD>.json`）
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, date: &NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.json", util::date_key(date)))
    }

    /// 加载指定日期的结果；文件不存在时返回 None。
    ///
    /// 无法解析的单条记录会被丢弃并记录警告，整个文件无法解析时返回错误。
    pub fn load(&self, date: &NaiveDate) -> Result<Option<ResultDocument>> {
        let path = self.path_for(date);
        if !path.exists() {
            info!("No existing result found at {}", path.display());
            return Ok(None);
        }

        info!("Loading existing result from {}", path.display());
        let text = fs::read_to_string(&path)?;
        let stored: StoredDocument = serde_json::from_str(&text)?;

        let mut result = BTreeMap::new();
        for (ticker, value) in stored.result {
            match serde_json::from_value::<TickerResult>(value) {
                Ok(entry) => {
                    result.insert(ticker, entry);
                }
                Err(e) => warn!("Dropping malformed stored result for {}: {}", ticker, e),
            }
        }

        Ok(Some(ResultDocument::new(stored.date_modified, result)))
    }

    /// 保存结果（先写临时文件再重命名，避免中途失败破坏已有文件）
    pub fn save(&self, date: &NaiveDate, document: &ResultDocument) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(date);
        let tmp_path = path.with_extension("json.tmp");
        let text = document.to_json(OutputFormat::Compact)?;
        fs::write(&tmp_path, text + "\n")?;
        fs::rename(&tmp_path, &path)?;

        info!("Saved {} results to {}", document.result.len(), path.display());
        Ok(path)
    }
}
