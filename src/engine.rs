// =============================================================================
// Daily Runner — one batch pass over the universe
// =============================================================================
//
// Pipeline per symbol:
//   1. Fetch the bar history (fetch error => skip, continue others)
//   2. Compute the indicator snapshot (insufficient data => skip)
//   3. Apply the liquidity filter
//   4. Derive the signal (previous run's snapshot feeds crossing detection)
//   5. Route actionable signals through the execution engine
//
// The pass is single-threaded and run-to-completion: no spawns, no shared
// mutable state, one deliberate pause between symbols for provider rate
// limits.  Every snapshot that was computed is recorded for the next run,
// whether or not the filter let the symbol through.
// =============================================================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::broker::Brokerage;
use crate::config::RuntimeConfig;
use crate::execution::{ExecutionEngine, ExecutionResult};
use crate::filter::LiquidityFilter;
use crate::indicators::{IndicatorError, IndicatorSnapshot};
use crate::market_data::BarSource;
use crate::risk::RiskEngine;
use crate::signal::SignalEngine;
use crate::state_store::SnapshotStore;
use crate::types::{AccountMode, Action, PositionInfo, TradingMode};
use crate::universe::resolve_universe;

/// Tally of one completed run, for the summary log line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub universe_size: usize,
    pub evaluated: usize,
    pub fetch_errors: usize,
    pub insufficient_data: usize,
    pub filtered: usize,
    pub buys: usize,
    pub sells: usize,
    pub holds: usize,
    pub orders_placed: usize,
    pub orders_simulated: usize,
    pub orders_skipped: usize,
    pub orders_blocked: usize,
    pub order_errors: usize,
}

pub struct DailyRunner<D, B> {
    data: Arc<D>,
    broker: Arc<B>,
    execution: ExecutionEngine<B>,
    config: RuntimeConfig,
    store: SnapshotStore,
    risk: RiskEngine,
}

impl<D: BarSource, B: Brokerage> DailyRunner<D, B> {
    pub fn new(data: Arc<D>, broker: Arc<B>, config: RuntimeConfig, store: SnapshotStore) -> Self {
        let execution = ExecutionEngine::new(broker.clone(), config.order_quantity);
        let mut risk = RiskEngine::new(config.max_orders_per_day);
        if config.trading_mode == TradingMode::Killed {
            risk.kill("trading mode set to Killed");
        }
        Self {
            data,
            broker,
            execution,
            config,
            store,
            risk,
        }
    }

    /// Execute one full pass over the universe.
    pub async fn run_once(&mut self) -> RunReport {
        let mut report = RunReport::default();

        let symbols = resolve_universe(&self.config).await;
        report.universe_size = symbols.len();
        info!(universe = symbols.len(), "daily run starting");

        // One position fetch per run; the set cannot change underneath a
        // single-threaded batch except through our own orders, which the
        // position-aware checks in the execution engine account for per call.
        let positions = match self.broker.get_positions().await {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "position fetch failed — assuming flat book");
                Vec::new()
            }
        };

        let pause = std::time::Duration::from_secs(self.config.pause_between_symbols_secs);

        for (i, symbol) in symbols.iter().enumerate() {
            if i > 0 && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
            self.evaluate_symbol(symbol, &positions, &mut report).await;
        }

        if let Err(e) = self.store.persist() {
            warn!(error = %e, "failed to persist snapshot store");
        }

        info!(
            evaluated = report.evaluated,
            fetch_errors = report.fetch_errors,
            insufficient_data = report.insufficient_data,
            filtered = report.filtered,
            buys = report.buys,
            sells = report.sells,
            holds = report.holds,
            placed = report.orders_placed,
            simulated = report.orders_simulated,
            blocked = report.orders_blocked,
            errors = report.order_errors,
            tracked_symbols = self.store.len(),
            "daily run complete"
        );

        report
    }

    async fn evaluate_symbol(
        &mut self,
        symbol: &str,
        positions: &[PositionInfo],
        report: &mut RunReport,
    ) {
        let bars = match self.data.fetch_bars(symbol).await {
            Ok(bars) => bars,
            Err(e) => {
                warn!(symbol, error = %e, "history fetch failed — skipping");
                report.fetch_errors += 1;
                return;
            }
        };

        let snapshot = match IndicatorSnapshot::compute(symbol, &bars, &self.config.indicators) {
            Ok(snap) => snap,
            Err(IndicatorError::InsufficientData { needed, got }) => {
                info!(symbol, needed, got, "insufficient history — skipping");
                report.insufficient_data += 1;
                return;
            }
            Err(e) => {
                warn!(symbol, error = %e, "indicator computation failed — skipping");
                report.insufficient_data += 1;
                return;
            }
        };

        report.evaluated += 1;

        if let Some(reason) = LiquidityFilter::evaluate(&snapshot, &self.config.filter) {
            info!(symbol, reason = %reason, "filtered out");
            report.filtered += 1;
            // Still record the snapshot so crossing state stays current for
            // the day the symbol becomes liquid again.
            self.store.record(snapshot);
            return;
        }

        let signal = SignalEngine::evaluate(&snapshot, self.store.previous(symbol), &self.config.signal);
        self.store.record(snapshot);

        match signal.action {
            Action::Buy => report.buys += 1,
            Action::Sell => report.sells += 1,
            Action::Hold => {
                report.holds += 1;
                return;
            }
        }

        if self.config.trading_mode != TradingMode::Live {
            info!(
                symbol,
                action = %signal.action,
                mode = %self.config.trading_mode,
                "engine not live — signal not executed"
            );
            report.orders_skipped += 1;
            return;
        }

        let is_demo = self.config.account_mode == AccountMode::Demo;
        let result = self
            .execution
            .execute_signal(&signal, positions, &mut self.risk, is_demo)
            .await;

        match result {
            ExecutionResult::Placed(_) => report.orders_placed += 1,
            ExecutionResult::Simulated(_) => report.orders_simulated += 1,
            ExecutionResult::Skipped(_) => report.orders_skipped += 1,
            ExecutionResult::Blocked(_) => report.orders_blocked += 1,
            ExecutionResult::Error(_) => report.order_errors += 1,
        }
    }
}
