// =============================================================================
// Rolling Volatility — sample standard deviation of simple returns
// =============================================================================
//
// return_t = close_t / close_{t-1} - 1
// volatility = sqrt( Σ (r - mean)^2 / (window - 1) )
//
// The sample (n-1) denominator matches how the trailing window is an estimate
// of the full return distribution, not the population itself.

use super::{IndicatorError, Result};

/// Sample standard deviation of the last `window` simple returns.
///
/// # Edge cases
/// - `window < 2` => `InvalidPeriod` (a single return has no deviation)
/// - `closes.len() < window + 1` => `InsufficientData`
/// - A zero close inside the window => `NotFinite` (return undefined)
pub fn volatility(closes: &[f64], window: usize) -> Result<f64> {
    if window < 2 {
        return Err(IndicatorError::InvalidPeriod { min: 2 });
    }
    if closes.len() < window + 1 {
        return Err(IndicatorError::InsufficientData {
            needed: window + 1,
            got: closes.len(),
        });
    }

    let tail = &closes[closes.len() - window - 1..];
    let returns: Vec<f64> = tail.windows(2).map(|w| w[1] / w[0] - 1.0).collect();

    if returns.iter().any(|r| !r.is_finite()) {
        return Err(IndicatorError::NotFinite);
    }

    let mean = returns.iter().sum::<f64>() / window as f64;
    let variance =
        returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (window as f64 - 1.0);
    let std_dev = variance.sqrt();

    if std_dev.is_finite() {
        Ok(std_dev)
    } else {
        Err(IndicatorError::NotFinite)
    }
}
