// =============================================================================
// Liquidity Filter — volume and volatility gate
// =============================================================================
//
// A ticker must be liquid enough to fill a market order near the quote and
// volatile enough that a swing position can actually move.  Too volatile and
// the weekly bars are dominated by noise, so the band has an upper edge too.
//
// Pure predicate over a snapshot; `None` means pass, `Some(reason)` blocks.

use tracing::debug;

use crate::config::FilterParams;
use crate::indicators::IndicatorSnapshot;

pub struct LiquidityFilter;

impl LiquidityFilter {
    /// Evaluate the filter for one snapshot. Returns `None` when the ticker
    /// passes, or `Some(reason)` describing the first failing check.
    pub fn evaluate(snapshot: &IndicatorSnapshot, params: &FilterParams) -> Option<String> {
        if snapshot.avg_volume < params.volume_threshold {
            return Some(format!(
                "volume: trailing avg {:.0} < {:.0} threshold",
                snapshot.avg_volume, params.volume_threshold
            ));
        }

        if snapshot.volatility < params.min_volatility {
            return Some(format!(
                "volatility: {:.4} below {:.4} floor",
                snapshot.volatility, params.min_volatility
            ));
        }

        if snapshot.volatility > params.max_volatility {
            return Some(format!(
                "volatility: {:.4} above {:.4} ceiling",
                snapshot.volatility, params.max_volatility
            ));
        }

        debug!(
            symbol = %snapshot.symbol,
            avg_volume = snapshot.avg_volume,
            volatility = snapshot.volatility,
            "liquidity filter passed"
        );
        None
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(avg_volume: f64, volatility: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            symbol: "TEST".to_string(),
            timestamp: 0,
            close: 100.0,
            sma: 95.0,
            macd: 1.0,
            macd_signal: 0.5,
            rsi: 60.0,
            volatility,
            avg_volume,
        }
    }

    fn params() -> FilterParams {
        FilterParams {
            volume_threshold: 1_000_000.0,
            min_volatility: 0.02,
            max_volatility: 0.25,
        }
    }

    #[test]
    fn passes_inside_band() {
        assert!(LiquidityFilter::evaluate(&snapshot(2_000_000.0, 0.05), &params()).is_none());
    }

    #[test]
    fn rejects_thin_volume_even_with_good_indicators() {
        // The snapshot carries bullish indicator values, but volume alone
        // must block it.
        let reason = LiquidityFilter::evaluate(&snapshot(999_999.0, 0.05), &params());
        assert!(reason.unwrap().starts_with("volume"));
    }

    #[test]
    fn rejects_volatility_below_floor() {
        let reason = LiquidityFilter::evaluate(&snapshot(2_000_000.0, 0.001), &params());
        assert!(reason.unwrap().contains("below"));
    }

    #[test]
    fn rejects_volatility_above_ceiling() {
        let reason = LiquidityFilter::evaluate(&snapshot(2_000_000.0, 0.40), &params());
        assert!(reason.unwrap().contains("ceiling"));
    }

    #[test]
    fn band_edges_are_inclusive() {
        let p = params();
        assert!(LiquidityFilter::evaluate(&snapshot(1_000_000.0, 0.02), &p).is_none());
        assert!(LiquidityFilter::evaluate(&snapshot(1_000_000.0, 0.25), &p).is_none());
    }
}
