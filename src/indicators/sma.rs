// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// Arithmetic mean of the last `window` closes.  The most recent value is the
// only one the pipeline needs, so no full series is produced.

use super::{IndicatorError, Result};

/// SMA of the last `window` values of `closes`.
///
/// # Edge cases
/// - `window == 0` => `InvalidPeriod`
/// - `closes.len() < window` => `InsufficientData`
/// - Non-finite inputs (NaN/inf closes) => `NotFinite`
pub fn sma(closes: &[f64], window: usize) -> Result<f64> {
    if window == 0 {
        return Err(IndicatorError::InvalidPeriod { min: 1 });
    }
    if closes.len() < window {
        return Err(IndicatorError::InsufficientData {
            needed: window,
            got: closes.len(),
        });
    }

    let sum: f64 = closes[closes.len() - window..].iter().sum();
    let mean = sum / window as f64;
    if mean.is_finite() {
        Ok(mean)
    } else {
        Err(IndicatorError::NotFinite)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_empty_input() {
        assert!(matches!(
            sma(&[], 3),
            Err(IndicatorError::InsufficientData { needed: 3, got: 0 })
        ));
    }

    #[test]
    fn sma_window_zero() {
        assert!(matches!(
            sma(&[1.0, 2.0], 0),
            Err(IndicatorError::InvalidPeriod { min: 1 })
        ));
    }

    #[test]
    fn sma_insufficient_data() {
        assert!(matches!(
            sma(&[1.0, 2.0], 5),
            Err(IndicatorError::InsufficientData { needed: 5, got: 2 })
        ));
    }

    #[test]
    fn sma_constant_series_equals_constant() {
        let closes = vec![42.5; 20];
        assert!((sma(&closes, 20).unwrap() - 42.5).abs() < 1e-12);
        assert!((sma(&closes, 7).unwrap() - 42.5).abs() < 1e-12);
    }

    #[test]
    fn sma_known_value() {
        // Closes [10,11,12,13,14,15], window 3 => (13+14+15)/3 = 14.
        let closes = vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0];
        assert!((sma(&closes, 3).unwrap() - 14.0).abs() < 1e-12);
    }

    #[test]
    fn sma_window_equals_length() {
        let closes = vec![2.0, 4.0, 6.0];
        assert!((sma(&closes, 3).unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn sma_rejects_nan() {
        let closes = vec![1.0, f64::NAN, 3.0];
        assert_eq!(sma(&closes, 3), Err(IndicatorError::NotFinite));
    }
}
