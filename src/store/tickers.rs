use log::{info, warn};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::errors::Result;
use crate::models::ticker::TickerMeta;

/// 加载股票主数据，保持文件中的顺序。
///
/// 文件不存在时返回 `Ok(None)`；缺少 name/class 的记录会被跳过。
pub fn load_ticker_master(path: &Path) -> Result<Option<Vec<TickerMeta>>> {
    if !path.exists() {
        return Ok(None);
    }

    let text = fs::read_to_string(path)?;
    let raw: Map<String, Value> = serde_json::from_str(&text)?;

    let mut tickers = Vec::with_capacity(raw.len());
    for (ticker, value) in raw {
        match serde_json::from_value::<TickerMeta>(value) {
            Ok(mut meta) => {
                meta.ticker = ticker;
                tickers.push(meta);
            }
            Err(e) => warn!("Skipping malformed ticker record {}: {}", ticker, e),
        }
    }

    info!("Loaded {} tickers from {}", tickers.len(), path.display());
    Ok(Some(tickers))
}
