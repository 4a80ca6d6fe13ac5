use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::Result;

/// 单日RSI数据点，序列化为紧凑键 d/p/r
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiPoint {
    #[serde(rename = "d", alias = "date")]
    pub date: NaiveDate,
    #[serde(rename = "p", alias = "price")]
    pub price: f64,
    #[serde(rename = "r", alias = "rsi")]
    pub rsi: f64,
}

/// 单只股票的计算结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerResult {
    pub rsi: Option<f64>,
    pub price: f64,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<RsiPoint>>,
}

/// The per-day document: what the store persists and what a run prints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDocument {
    pub date_modified: String,
    pub result: BTreeMap<String, TickerResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// 无空白的单行JSON
    Compact,
    /// 缩进格式
    Pretty,
}

impl ResultDocument {
    pub fn new(date_modified: String, result: BTreeMap<String, TickerResult>) -> Self {
        Self { date_modified, result }
    }

    pub fn to_json(&self, format: OutputFormat) -> Result<String> {
        let text = match format {
            OutputFormat::Compact => serde_json::to_string(self)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(self)?,
        };
        Ok(text)
    }
}
