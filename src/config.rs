// =============================================================================
// Runtime Configuration — engine settings with atomic save
// =============================================================================
//
// Central configuration hub for the Sentinel engine.  Every tunable parameter
// lives here so a deployment can be re-tuned by editing one JSON file.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{AccountMode, TradingMode};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_symbols() -> Vec<String> {
    vec![
        "AAPL".to_string(),
        "MSFT".to_string(),
        "AMZN".to_string(),
        "GOOGL".to_string(),
        "NVDA".to_string(),
    ]
}

fn default_order_quantity() -> f64 {
    10.0
}

fn default_pause_between_symbols_secs() -> u64 {
    2
}

fn default_poll_interval_secs() -> u64 {
    300
}

fn default_max_orders_per_day() -> u32 {
    25
}

fn default_history_base_url() -> String {
    "https://data.sentinel.example.com".to_string()
}

fn default_broker_base_url() -> String {
    "https://broker.sentinel.example.com".to_string()
}

fn default_history_range() -> String {
    "2y".to_string()
}

fn default_history_interval() -> String {
    "1wk".to_string()
}

fn default_sma_window() -> usize {
    20
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_rsi_window() -> usize {
    14
}

fn default_volatility_window() -> usize {
    10
}

fn default_volume_window() -> usize {
    10
}

fn default_volume_threshold() -> f64 {
    1_000_000.0
}

fn default_min_volatility() -> f64 {
    0.02
}

fn default_max_volatility() -> f64 {
    0.25
}

fn default_rsi_bull_level() -> f64 {
    50.0
}

fn default_rsi_oversold() -> f64 {
    30.0
}

fn default_rsi_overbought() -> f64 {
    70.0
}

fn default_session_open_utc() -> String {
    "13:30".to_string()
}

fn default_session_close_utc() -> String {
    "20:00".to_string()
}

// =============================================================================
// Parameter groups
// =============================================================================

/// Look-back windows for the indicator engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorParams {
    /// SMA window in bars. Shrinks to the available history when shorter.
    #[serde(default = "default_sma_window")]
    pub sma_window: usize,

    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    #[serde(default = "default_rsi_window")]
    pub rsi_window: usize,

    /// Window (in returns) for the volatility estimate.
    #[serde(default = "default_volatility_window")]
    pub volatility_window: usize,

    /// Window for the trailing average volume used by the filter.
    #[serde(default = "default_volume_window")]
    pub volume_window: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_window: default_sma_window(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            rsi_window: default_rsi_window(),
            volatility_window: default_volatility_window(),
            volume_window: default_volume_window(),
        }
    }
}

impl IndicatorParams {
    /// Minimum number of bars a series must have before a snapshot can be
    /// computed. The MACD signal line is the longest consumer: the slow EMA
    /// produces its first value at bar `macd_slow`, and the signal EMA needs
    /// `macd_signal` MACD values on top of that.
    pub fn min_history(&self) -> usize {
        (self.macd_slow + self.macd_signal)
            .saturating_sub(1)
            .max(self.rsi_window + 1)
            .max(self.volatility_window + 1)
            .max(1)
    }
}

/// Thresholds for the liquidity filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterParams {
    /// Minimum trailing average volume (shares per bar).
    #[serde(default = "default_volume_threshold")]
    pub volume_threshold: f64,

    /// Inclusive volatility band the snapshot must fall into.
    #[serde(default = "default_min_volatility")]
    pub min_volatility: f64,

    #[serde(default = "default_max_volatility")]
    pub max_volatility: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            volume_threshold: default_volume_threshold(),
            min_volatility: default_min_volatility(),
            max_volatility: default_max_volatility(),
        }
    }
}

/// Thresholds for the signal rule table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalParams {
    /// RSI level separating bullish from bearish momentum.
    #[serde(default = "default_rsi_bull_level")]
    pub rsi_bull_level: f64,

    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,

    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            rsi_bull_level: default_rsi_bull_level(),
            rsi_oversold: default_rsi_oversold(),
            rsi_overbought: default_rsi_overbought(),
        }
    }
}

/// Market session expressed in UTC wall-clock times.
///
/// 13:30–20:00 UTC corresponds to the 09:30–16:00 New York cash session
/// outside daylight-saving shifts; deployments adjust the config twice a year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionParams {
    /// "HH:MM", inclusive.
    #[serde(default = "default_session_open_utc")]
    pub open_utc: String,

    /// "HH:MM", inclusive.
    #[serde(default = "default_session_close_utc")]
    pub close_utc: String,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            open_utc: default_session_open_utc(),
            close_utc: default_session_close_utc(),
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration for the Sentinel engine.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Operational modes ---------------------------------------------------

    /// Current trading mode: Live, Paused, or Killed.
    #[serde(default)]
    pub trading_mode: TradingMode,

    /// Whether running against real funds or simulated: Demo or Live.
    #[serde(default)]
    pub account_mode: AccountMode,

    // --- Universe ------------------------------------------------------------

    /// Static ticker universe, used when no remote list is configured.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Optional URL of a remote symbol list (plain text or CSV, one or more
    /// symbols per line). Takes precedence over `symbols` when reachable.
    #[serde(default)]
    pub universe_url: Option<String>,

    // --- Order sizing & pacing ----------------------------------------------

    /// Fixed share quantity for new buy orders. Sells always close the whole
    /// position.
    #[serde(default = "default_order_quantity")]
    pub order_quantity: f64,

    /// Pause between symbol evaluations to stay under provider rate limits.
    #[serde(default = "default_pause_between_symbols_secs")]
    pub pause_between_symbols_secs: u64,

    /// How often the main loop re-checks the session clock.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Daily order cap enforced by the risk engine.
    #[serde(default = "default_max_orders_per_day")]
    pub max_orders_per_day: u32,

    // --- External endpoints --------------------------------------------------

    #[serde(default = "default_history_base_url")]
    pub history_base_url: String,

    /// Provider range parameter, e.g. "2y".
    #[serde(default = "default_history_range")]
    pub history_range: String,

    /// Provider bar interval, e.g. "1wk".
    #[serde(default = "default_history_interval")]
    pub history_interval: String,

    #[serde(default = "default_broker_base_url")]
    pub broker_base_url: String,

    // --- Parameter groups ----------------------------------------------------

    #[serde(default)]
    pub indicators: IndicatorParams,

    #[serde(default)]
    pub filter: FilterParams,

    #[serde(default)]
    pub signal: SignalParams,

    #[serde(default)]
    pub session: SessionParams,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        // Round-trip through serde so the field defaults stay the single
        // source of truth.
        serde_json::from_str("{}").expect("empty object deserialises via defaults")
    }
}

impl RuntimeConfig {
    /// Load configuration from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        info!(path = %path.display(), "runtime config loaded");
        Ok(config)
    }

    /// Persist configuration to `path` using write-to-tmp + rename so a crash
    /// mid-write never leaves a truncated file behind.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let tmp = path.with_extension("tmp");

        let raw = serde_json::to_string_pretty(self).context("failed to serialise config")?;
        std::fs::write(&tmp, raw)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("failed to rename {} into place", tmp.display()))?;

        info!(path = %path.display(), "runtime config saved");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_safe_and_sane() {
        let config = RuntimeConfig::default();
        assert_eq!(config.trading_mode, TradingMode::Paused);
        assert_eq!(config.account_mode, AccountMode::Demo);
        assert!(!config.symbols.is_empty());
        assert!(config.filter.volume_threshold > 0.0);
        assert!(config.filter.min_volatility < config.filter.max_volatility);
    }

    #[test]
    fn empty_json_deserialises_via_defaults() {
        let config: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.indicators.macd_slow, 26);
        assert_eq!(config.indicators.rsi_window, 14);
        assert_eq!(config.order_quantity, 10.0);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config: RuntimeConfig =
            serde_json::from_str(r#"{"symbols": ["IBM"], "order_quantity": 5}"#).unwrap();
        assert_eq!(config.symbols, vec!["IBM".to_string()]);
        assert_eq!(config.order_quantity, 5.0);
        assert_eq!(config.indicators.sma_window, 20);
    }

    #[test]
    fn min_history_covers_longest_window() {
        let params = IndicatorParams::default();
        // MACD signal line (26 + 9 - 1) is the longest consumer by default.
        assert_eq!(params.min_history(), 34);

        let wide_rsi = IndicatorParams {
            rsi_window: 40,
            ..IndicatorParams::default()
        };
        assert_eq!(wide_rsi.min_history(), 41);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = std::env::temp_dir().join("sentinel-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        let mut config = RuntimeConfig::default();
        config.symbols = vec!["KO".to_string(), "PEP".to_string()];
        config.save(&path).unwrap();

        let loaded = RuntimeConfig::load(&path).unwrap();
        assert_eq!(loaded.symbols, config.symbols);

        std::fs::remove_file(&path).ok();
    }
}
