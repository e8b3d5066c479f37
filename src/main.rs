// =============================================================================
// Sentinel Equity Bot — Main Entry Point
// =============================================================================
//
// A daily batch swing engine: once per trading day it fetches weekly bar
// history for the universe, derives indicator snapshots, filters, signals,
// and routes orders.  Without broker credentials the engine runs against a
// simulated account.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod broker;
mod config;
mod engine;
mod execution;
mod filter;
mod indicators;
mod market_data;
mod market_hours;
mod risk;
mod signal;
mod state_store;
mod types;
mod universe;

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::broker::BrokerClient;
use crate::config::RuntimeConfig;
use crate::engine::DailyRunner;
use crate::market_data::HistoryClient;
use crate::market_hours::MarketSession;
use crate::state_store::SnapshotStore;
use crate::types::AccountMode;

const CONFIG_PATH: &str = "runtime_config.json";
const STORE_PATH: &str = "snapshot_store.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Sentinel Equity Bot — Starting Up                ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let mut config = RuntimeConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    // SAFETY: without credentials there is nothing to trade with — force the
    // simulated account so a bare checkout can never touch real funds.
    let api_key = std::env::var("SENTINEL_API_KEY").unwrap_or_default();
    let api_secret = std::env::var("SENTINEL_API_SECRET").unwrap_or_default();
    if (api_key.is_empty() || api_secret.is_empty()) && config.account_mode == AccountMode::Live {
        warn!("broker credentials missing — forcing Demo account mode");
        config.account_mode = AccountMode::Demo;
    }

    info!(
        trading_mode = %config.trading_mode,
        account_mode = %config.account_mode,
        universe = config.symbols.len(),
        "engine configured"
    );

    let session = MarketSession::from_params(&config.session)?;
    let poll_interval = std::time::Duration::from_secs(config.poll_interval_secs);

    // ── 2. Build clients & runner ────────────────────────────────────────
    let history = Arc::new(HistoryClient::new(
        config.history_base_url.clone(),
        config.history_range.clone(),
        config.history_interval.clone(),
    )?);
    let broker = Arc::new(BrokerClient::new(
        config.broker_base_url.clone(),
        api_key,
        api_secret,
    )?);

    // Live accounts get a credentials sanity check before the first run.
    if config.account_mode == AccountMode::Live {
        match broker.get_account().await {
            Ok(_) => info!("broker account verified"),
            Err(e) => {
                warn!(error = %e, "broker account check failed — forcing Demo account mode");
                config.account_mode = AccountMode::Demo;
            }
        }
    }

    let store = SnapshotStore::open(STORE_PATH);
    let mut runner = DailyRunner::new(history, broker, config, store);

    // ── 3. Daily loop ────────────────────────────────────────────────────
    // The pipeline runs at most once per trading day; the loop just waits
    // for the session to open.
    let mut last_run_date = String::new();

    loop {
        let now = Utc::now();
        let today = now.format("%Y-%m-%d").to_string();

        if session.is_open(now) && today != last_run_date {
            info!(date = %today, "market open — starting daily run");
            let report = runner.run_once().await;
            last_run_date = today;
            info!(?report, "daily run report");
        }

        tokio::time::sleep(poll_interval).await;
    }
}
