use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::errors::Result;

// 日期转换工具

/// 结果文件名使用的日期键（YYYYMMDD）
pub fn date_key(date: &NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()
}

pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(date_str, "%Y-%m-%d")?)
}

// 限制历史记录数量，只保留最近的 max_records 条（数据按日期升序）
pub fn limit_history<T>(history: &mut Vec<T>, max_records: usize, ticker: &str) {
    if history.len() > max_records {
        debug!("Limiting {} RSI history records to {} for {}",
               history.len(), max_records, ticker);
        let excess = history.len() - max_records;
        history.drain(..excess);
    }
}

/// Rounds half away from zero on the shortest decimal representation of
/// `value`, so `2.25` becomes `2.3` even though the nearest f64 sits below it.
///
/// Non-finite values and values outside the `Decimal` range are returned as is.
pub fn round_half_up(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    match Decimal::from_str(&value.to_string()) {
        Ok(exact) => exact
            .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
            .to_string()
            .parse::<f64>()
            .unwrap_or(value),
        Err(_) => value,
    }
}
