pub mod rsi;

pub use rsi::{rsi_history, rsi_latest, Precision, DEFAULT_PERIOD};

const PAIRWISE_BLOCK: usize = 128;

/// Sums with 8-lane unrolled pairwise summation.
///
/// The addition order is fixed (eight running lanes, folded as
/// `((r0+r1)+(r2+r3))+((r4+r5)+(r6+r7))`, then the tail added in sequence;
/// slices longer than 128 are split recursively), which keeps window means
/// bit-identical to the published RSI outputs.
pub(crate) fn pairwise_sum(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 8 {
        let mut res = 0.0;
        for &v in values {
            res += v;
        }
        res
    } else if n <= PAIRWISE_BLOCK {
        let mut r = [0.0f64; 8];
        r.copy_from_slice(&values[..8]);
        let mut i = 8;
        while i < n - n % 8 {
            for (lane, v) in r.iter_mut().zip(&values[i..i + 8]) {
                *lane += *v;
            }
            i += 8;
        }
        let mut res = ((r[0] + r[1]) + (r[2] + r[3])) + ((r[4] + r[5]) + (r[6] + r[7]));
        while i < n {
            res += values[i];
            i += 1;
        }
        res
    } else {
        let mut half = n / 2;
        half -= half % 8;
        pairwise_sum(&values[..half]) + pairwise_sum(&values[half..])
    }
}
