// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average.
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The very first EMA value is seeded with the SMA of the first `period`
// closes, so the output series starts at input index `period - 1`.

use super::{IndicatorError, Result};

/// Compute the EMA series for `values` with look-back `period`.
///
/// The returned vector has `values.len() - period + 1` elements; element `i`
/// corresponds to input index `period - 1 + i`.
///
/// # Edge cases
/// - `period == 0` => `InvalidPeriod`
/// - `values.len() < period` => `InsufficientData`
/// - A non-finite intermediate value => `NotFinite` (the series would be
///   poisoned from that point on, so nothing is returned)
pub fn ema_series(values: &[f64], period: usize) -> Result<Vec<f64>> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod { min: 1 });
    }
    if values.len() < period {
        return Err(IndicatorError::InsufficientData {
            needed: period,
            got: values.len(),
        });
    }

    let multiplier = 2.0 / (period + 1) as f64;

    // Seed: SMA of the first `period` values.
    let seed: f64 = values[..period].iter().sum::<f64>() / period as f64;
    if !seed.is_finite() {
        return Err(IndicatorError::NotFinite);
    }

    let mut result = Vec::with_capacity(values.len() - period + 1);
    result.push(seed);

    let mut prev = seed;
    for &value in &values[period..] {
        let ema = value * multiplier + prev * (1.0 - multiplier);
        if !ema.is_finite() {
            return Err(IndicatorError::NotFinite);
        }
        result.push(ema);
        prev = ema;
    }

    Ok(result)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_empty_input() {
        assert!(matches!(
            ema_series(&[], 5),
            Err(IndicatorError::InsufficientData { needed: 5, got: 0 })
        ));
    }

    #[test]
    fn ema_period_zero() {
        assert!(matches!(
            ema_series(&[1.0, 2.0, 3.0], 0),
            Err(IndicatorError::InvalidPeriod { min: 1 })
        ));
    }

    #[test]
    fn ema_period_equals_length_is_seed() {
        let closes = vec![2.0, 4.0, 6.0];
        let series = ema_series(&closes, 3).unwrap();
        assert_eq!(series.len(), 1);
        // Seed is the SMA = (2+4+6)/3 = 4.0
        assert!((series[0] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn ema_known_values() {
        // 5-period EMA of [1..10]: seed SMA = 3.0, multiplier = 2/6 = 1/3.
        let closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let series = ema_series(&closes, 5).unwrap();
        assert_eq!(series.len(), 6);

        let mult = 2.0 / 6.0;
        let mut expected = 3.0;
        let mut expected_vec = vec![expected];
        for &c in &closes[5..] {
            expected = c * mult + expected * (1.0 - mult);
            expected_vec.push(expected);
        }
        for (a, b) in series.iter().zip(expected_vec.iter()) {
            assert!((a - b).abs() < 1e-12, "got {a}, expected {b}");
        }
    }

    #[test]
    fn ema_constant_series_stays_constant() {
        let closes = vec![77.0; 30];
        for &v in &ema_series(&closes, 9).unwrap() {
            assert!((v - 77.0).abs() < 1e-12);
        }
    }

    #[test]
    fn ema_rejects_nan() {
        let closes = vec![1.0, 2.0, 3.0, f64::NAN, 5.0];
        assert_eq!(ema_series(&closes, 3), Err(IndicatorError::NotFinite));
    }

    #[test]
    fn ema_output_length() {
        let closes: Vec<f64> = (1..=40).map(|x| (x as f64).sin() + 10.0).collect();
        let series = ema_series(&closes, 12).unwrap();
        assert_eq!(series.len(), 40 - 12 + 1);
    }
}
