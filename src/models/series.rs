use chrono::{NaiveDate, NaiveDateTime};

use crate::util;

/// 抓取器返回的原始日线收盘价（收盘价可能缺失）
#[derive(Debug, Clone, PartialEq)]
pub struct DailyClose {
    /// 交易所本地时间
    pub timestamp: NaiveDateTime,
    pub close: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp: NaiveDateTime,
    pub close: f64,
}

impl PricePoint {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Daily closing prices, ascending by date, one row per date, every close finite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// 规整原始数据：去掉缺失/NaN收盘价，按时间升序，同一天只保留最后一条
    pub fn from_daily_closes(rows: Vec<DailyClose>) -> Self {
        let mut points: Vec<PricePoint> = rows
            .into_iter()
            .filter_map(|row| match row.close {
                Some(close) if close.is_finite() => Some(PricePoint {
                    timestamp: row.timestamp,
                    close,
                }),
                _ => None,
            })
            .collect();

        points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date() == point.date() => *last = point,
                _ => deduped.push(point),
            }
        }

        Self { points: deduped }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date()).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }

    /// 最后一条有效数据的时间戳，无数据时为 "0"
    pub fn end_date(&self) -> String {
        self.points
            .last()
            .map(|p| util::format_timestamp(&p.timestamp))
            .unwrap_or_else(|| NO_DATA_END_DATE.to_string())
    }
}

pub const NO_DATA_END_DATE: &str = "0";

/// Result of fetching one symbol. Provider failures never leave the fetcher
/// as errors; they arrive here as `NoData`.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Series(PriceSeries),
    NoData { reason: String },
}

impl FetchOutcome {
    pub fn series(&self) -> Option<&PriceSeries> {
        match self {
            FetchOutcome::Series(series) => Some(series),
            FetchOutcome::NoData { .. } => None,
        }
    }

    /// `(last_timestamp, prices, dates)`，失败时为 `("0", [], [])`
    pub fn into_parts(self) -> (String, Vec<f64>, Vec<NaiveDate>) {
        match self {
            FetchOutcome::Series(series) => (series.end_date(), series.prices(), series.dates()),
            FetchOutcome::NoData { .. } => (NO_DATA_END_DATE.to_string(), Vec::new(), Vec::new()),
        }
    }
}
