// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators used by the signal
// pipeline.  Every public function returns `Result<_, IndicatorError>` so
// callers are forced to handle insufficient-data and numerical-edge-case
// scenarios; a ticker whose history is too short is skipped, never defaulted.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod volatility;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::IndicatorParams;
use crate::types::PriceBar;

/// Why an indicator could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("insufficient data: need {needed} bars, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("indicator period must be at least {min}")]
    InvalidPeriod { min: usize },

    #[error("calculation produced a non-finite value")]
    NotFinite,
}

pub type Result<T> = std::result::Result<T, IndicatorError>;

/// All indicator values for one symbol at one point in time.
///
/// Derived from a bar window ending at `timestamp`; every value depends only
/// on bars at or before that time.  Recomputed on each run and persisted to
/// the snapshot store so the next run can detect crossings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    /// Timestamp of the final bar in the window (UNIX ms).
    pub timestamp: i64,
    pub close: f64,
    pub sma: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub rsi: f64,
    /// Sample standard deviation of simple returns.
    pub volatility: f64,
    /// Trailing mean volume, consumed by the liquidity filter.
    pub avg_volume: f64,
}

impl IndicatorSnapshot {
    /// Compute a snapshot from a chronological bar series.
    ///
    /// The SMA window shrinks to the available history when the series is
    /// shorter than the configured window (matching how a young listing with
    /// only 15 weekly bars still gets a 15-bar SMA), but the series as a
    /// whole must satisfy `params.min_history()`.
    pub fn compute(symbol: &str, bars: &[PriceBar], params: &IndicatorParams) -> Result<Self> {
        let needed = params.min_history();
        if bars.len() < needed {
            return Err(IndicatorError::InsufficientData {
                needed,
                got: bars.len(),
            });
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let last = bars.last().expect("min_history is at least 1");

        let sma_window = params.sma_window.min(closes.len());
        let sma = sma::sma(&closes, sma_window)?;

        let macd = macd::macd(
            &closes,
            params.macd_fast,
            params.macd_slow,
            params.macd_signal,
        )?;

        let rsi = rsi::rsi(&closes, params.rsi_window)?;
        let volatility = volatility::volatility(&closes, params.volatility_window)?;
        let avg_volume = average_volume(bars, params.volume_window)?;

        Ok(Self {
            symbol: symbol.to_string(),
            timestamp: last.timestamp,
            close: last.close,
            sma,
            macd: macd.macd,
            macd_signal: macd.signal,
            rsi,
            volatility,
            avg_volume,
        })
    }
}

/// Trailing mean volume over the last `window` bars.
pub fn average_volume(bars: &[PriceBar], window: usize) -> Result<f64> {
    if window == 0 {
        return Err(IndicatorError::InvalidPeriod { min: 1 });
    }
    if bars.len() < window {
        return Err(IndicatorError::InsufficientData {
            needed: window,
            got: bars.len(),
        });
    }

    let sum: f64 = bars[bars.len() - window..].iter().map(|b| b.volume).sum();
    let mean = sum / window as f64;
    if mean.is_finite() {
        Ok(mean)
    } else {
        Err(IndicatorError::NotFinite)
    }
}
