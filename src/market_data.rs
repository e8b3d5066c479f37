// =============================================================================
// Market Data — historical bar retrieval
// =============================================================================
//
// One REST fetch per symbol per run; there is no streaming in a daily batch
// engine.  The provider returns a chart-style JSON document:
//
//   { "symbol": "AAPL",
//     "bars": [ { "t": 1672617600000, "o": 130.3, "h": 130.9,
//                 "l": 124.2, "c": 125.1, "v": 112117500 }, ... ] }
//
// Bars are validated field-by-field, non-finite or non-positive prices are
// dropped, and the series is sorted chronologically before it reaches the
// indicator engine.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::types::PriceBar;

/// Source of historical price bars; the seam the daily runner tests through.
#[async_trait]
pub trait BarSource: Send + Sync {
    /// Fetch the bar history for `symbol`, oldest first.
    async fn fetch_bars(&self, symbol: &str) -> Result<Vec<PriceBar>>;
}

/// REST client for the market-data provider's chart endpoint.
pub struct HistoryClient {
    base_url: String,
    range: String,
    interval: String,
    client: reqwest::Client,
}

impl HistoryClient {
    /// # Arguments
    /// * `base_url` — provider root, e.g. `https://data.example.com`
    /// * `range`    — look-back range parameter, e.g. `2y`
    /// * `interval` — bar interval parameter, e.g. `1wk`
    pub fn new(base_url: impl Into<String>, range: impl Into<String>, interval: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build history HTTP client")?;

        Ok(Self {
            base_url: base_url.into(),
            range: range.into(),
            interval: interval.into(),
            client,
        })
    }
}

#[async_trait]
impl BarSource for HistoryClient {
    #[instrument(skip(self), name = "history::fetch_bars")]
    async fn fetch_bars(&self, symbol: &str) -> Result<Vec<PriceBar>> {
        let url = format!(
            "{}/v1/chart?symbol={}&range={}&interval={}",
            self.base_url, symbol, self.range, self.interval
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET /v1/chart request failed for {symbol}"))?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .with_context(|| format!("failed to parse chart response for {symbol}"))?;

        if !status.is_success() {
            anyhow::bail!("chart endpoint returned {} for {}: {}", status, symbol, body);
        }

        let bars = parse_chart_response(&body);
        debug!(symbol, count = bars.len(), "history retrieved");
        Ok(bars)
    }
}

/// Parse the provider's chart document into validated, chronological bars.
///
/// Malformed entries are dropped individually (and logged) rather than
/// failing the whole series, so one corrupt row cannot knock a liquid ticker
/// out of the run.
pub fn parse_chart_response(body: &serde_json::Value) -> Vec<PriceBar> {
    let rows = match body["bars"].as_array() {
        Some(rows) => rows,
        None => {
            warn!("chart response missing 'bars' array");
            return Vec::new();
        }
    };

    let mut bars: Vec<PriceBar> = rows
        .iter()
        .filter_map(|row| {
            let bar = PriceBar {
                timestamp: row["t"].as_i64()?,
                open: row["o"].as_f64()?,
                high: row["h"].as_f64()?,
                low: row["l"].as_f64()?,
                close: row["c"].as_f64()?,
                volume: row["v"].as_f64()?,
            };

            let prices = [bar.open, bar.high, bar.low, bar.close];
            if prices.iter().any(|p| !p.is_finite() || *p <= 0.0)
                || !bar.volume.is_finite()
                || bar.volume < 0.0
            {
                warn!(timestamp = bar.timestamp, "dropping malformed bar");
                return None;
            }

            Some(bar)
        })
        .collect();

    bars.sort_by_key(|b| b.timestamp);
    bars
}
