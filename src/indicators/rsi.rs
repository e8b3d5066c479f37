// =============================================================================
// Relative Strength Index (RSI) — simple-average (Cutler) variant
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Average the gains and the losses over the last `window` deltas
//          with a plain arithmetic mean (no Wilder smoothing, so the value
//          depends only on the trailing window and is order-independent
//          across runs).
// Step 3 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Thresholds:  RSI > 70 => overbought,  RSI < 30 => oversold.

use super::{IndicatorError, Result};

/// RSI over the last `window` price changes, in [0, 100].
///
/// # Edge cases
/// - `window == 0` => `InvalidPeriod`
/// - `closes.len() < window + 1` => `InsufficientData` (need `window` deltas)
/// - Average loss of zero (only gains) => 100.0
/// - No movement at all (both averages zero) => 50.0 (neutral)
/// - Non-finite inputs => `NotFinite`
pub fn rsi(closes: &[f64], window: usize) -> Result<f64> {
    if window == 0 {
        return Err(IndicatorError::InvalidPeriod { min: 1 });
    }
    if closes.len() < window + 1 {
        return Err(IndicatorError::InsufficientData {
            needed: window + 1,
            got: closes.len(),
        });
    }

    let tail = &closes[closes.len() - window - 1..];
    let (sum_gain, sum_loss) = tail.windows(2).fold((0.0_f64, 0.0_f64), |(g, l), w| {
        let delta = w[1] - w[0];
        if delta > 0.0 {
            (g + delta, l)
        } else {
            (g, l + delta.abs())
        }
    });

    let window_f = window as f64;
    let avg_gain = sum_gain / window_f;
    let avg_loss = sum_loss / window_f;

    let value = if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // No movement at all.
    } else if avg_loss == 0.0 {
        100.0 // All gains, no losses.
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(IndicatorError::NotFinite)
    }
}
