// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
// MACD line   = EMA(fast) - EMA(slow)
// Signal line = EMA(macd_line, signal_period)
// Histogram   = MACD - Signal
//
// With the standard 12/26/9 configuration the first full result needs
// 26 + 9 - 1 = 34 closes: the slow EMA yields its first value at close 26 and
// the signal EMA consumes 9 MACD values from there.

use serde::{Deserialize, Serialize};

use super::ema::ema_series;
use super::{IndicatorError, Result};

/// Most recent MACD reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Compute the latest MACD, signal line, and histogram.
///
/// # Edge cases
/// - `fast >= slow` or a zero period => `InvalidPeriod`
/// - `closes.len() < slow + signal_period - 1` => `InsufficientData`
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal_period: usize) -> Result<MacdResult> {
    if fast == 0 || signal_period == 0 {
        return Err(IndicatorError::InvalidPeriod { min: 1 });
    }
    if slow <= fast {
        // The slow leg must be strictly longer or the difference is meaningless.
        return Err(IndicatorError::InvalidPeriod { min: fast + 1 });
    }

    let needed = slow + signal_period - 1;
    if closes.len() < needed {
        return Err(IndicatorError::InsufficientData {
            needed,
            got: closes.len(),
        });
    }

    let fast_series = ema_series(closes, fast)?;
    let slow_series = ema_series(closes, slow)?;

    // Align the two series on the slow leg: slow_series[i] corresponds to
    // close index `slow - 1 + i`, which is fast_series[(slow - fast) + i].
    let offset = slow - fast;
    let macd_series: Vec<f64> = slow_series
        .iter()
        .enumerate()
        .map(|(i, &s)| fast_series[offset + i] - s)
        .collect();

    let signal_series = ema_series(&macd_series, signal_period)?;

    let macd = *macd_series.last().expect("non-empty by length check");
    let signal = *signal_series.last().expect("non-empty by length check");

    Ok(MacdResult {
        macd,
        signal,
        histogram: macd - signal,
    })
}
