//! Relative Strength Index over a simple (non-smoothed) trailing window.
//!
//! For a window of `period` day-over-day deltas, average gain and average
//! loss are plain means with opposite-sign deltas counted as zero:
//!
//! ```text
//! RSI = 100                         if avg_loss == 0
//! RSI = 100 - 100 / (1 + gain/loss) otherwise
//! ```

use chrono::NaiveDate;

use super::pairwise_sum;
use crate::models::result::RsiPoint;
use crate::util::round_half_up;

pub const DEFAULT_PERIOD: usize = 14;

/// 输出精度（小数位数）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    pub price: u32,
    pub rsi: u32,
}

impl Default for Precision {
    fn default() -> Self {
        Self { price: 1, rsi: 1 }
    }
}

fn deltas(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| w[1] - w[0]).collect()
}

// 单个窗口的RSI（未舍入）
fn window_rsi(window: &[f64]) -> f64 {
    let n = window.len() as f64;
    let gains: Vec<f64> = window.iter().map(|&d| if d > 0.0 { d } else { 0.0 }).collect();
    let losses: Vec<f64> = window.iter().map(|&d| if d < 0.0 { -d } else { 0.0 }).collect();

    let avg_gain = pairwise_sum(&gains) / n;
    let avg_loss = pairwise_sum(&losses) / n;

    if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }
}

/// Current RSI from the most recent `period` deltas, unrounded.
///
/// Returns `None` when fewer than `period` prices are available. A series of
/// exactly `period` prices only has `period - 1` deltas; the window then
/// shrinks to what exists.
pub fn rsi_latest(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period || prices.len() < 2 {
        return None;
    }
    let deltas = deltas(prices);
    let start = deltas.len().saturating_sub(period);
    Some(window_rsi(&deltas[start..]))
}

/// 计算每日RSI历史
///
/// 对每个 `i in period..len`，使用 `deltas[i-period..i]`（即价格 `i-period..=i`）
/// 计算RSI。返回 (最新RSI, 历史数据点)，价格和RSI按 `precision` 四舍五入。
/// `dates` 与 `prices` 按下标一一对应。
pub fn rsi_history(
    prices: &[f64],
    dates: &[NaiveDate],
    period: usize,
    precision: Precision,
) -> (Option<f64>, Vec<RsiPoint>) {
    debug_assert_eq!(prices.len(), dates.len());
    let len = prices.len().min(dates.len());
    if period == 0 || len < period {
        return (None, Vec::new());
    }

    let deltas = deltas(&prices[..len]);
    let history: Vec<RsiPoint> = (period..len)
        .map(|i| RsiPoint {
            date: dates[i],
            price: round_half_up(prices[i], precision.price),
            rsi: round_half_up(window_rsi(&deltas[i - period..i]), precision.rsi),
        })
        .collect();

    let current = history.last().map(|p| p.rsi);
    (current, history)
}
