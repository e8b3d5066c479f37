// =============================================================================
// Risk Engine — two guards protecting capital
// =============================================================================
//
// Guards:
//   1. Order Cap    — trips when the daily submitted-order count reaches the
//                     configured maximum.
//   2. Kill Switch  — manual hard stop; nothing trades until revived.
//
// The engine resets daily statistics when the UTC date rolls over.  The
// pipeline is single-threaded run-to-completion, so the engine is plain
// mutable state owned by the runner.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Snapshot of the risk engine's state for logging and reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskState {
    pub orders_today: u32,
    pub max_orders_per_day: u32,
    pub killed: bool,
    pub current_date: String,
}

pub struct RiskEngine {
    max_orders_per_day: u32,
    orders_today: u32,
    killed: bool,
    kill_reason: Option<String>,
    current_date: String,
}

impl RiskEngine {
    pub fn new(max_orders_per_day: u32) -> Self {
        Self {
            max_orders_per_day,
            orders_today: 0,
            killed: false,
            kill_reason: None,
            current_date: String::new(),
        }
    }

    /// Whether a new order may be submitted right now.
    ///
    /// Returns `(true, None)` when clear, or `(false, Some(reason))` naming
    /// the guard that blocked.  Rolls daily counters over first.
    pub fn can_trade(&mut self, now: DateTime<Utc>) -> (bool, Option<String>) {
        self.roll_date(now);

        if self.killed {
            let reason = self
                .kill_reason
                .clone()
                .unwrap_or_else(|| "kill switch engaged".to_string());
            return (false, Some(reason));
        }

        if self.orders_today >= self.max_orders_per_day {
            return (
                false,
                Some(format!(
                    "daily order cap reached: {}/{}",
                    self.orders_today, self.max_orders_per_day
                )),
            );
        }

        (true, None)
    }

    /// Record a submitted (or simulated) order against today's cap.
    pub fn record_order(&mut self, now: DateTime<Utc>) {
        self.roll_date(now);
        self.orders_today += 1;
    }

    /// Engage the kill switch. Nothing trades until `revive` is called.
    pub fn kill(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(reason = %reason, "risk engine kill switch engaged");
        self.killed = true;
        self.kill_reason = Some(reason);
    }

    pub fn revive(&mut self) {
        info!("risk engine kill switch released");
        self.killed = false;
        self.kill_reason = None;
    }

    pub fn state(&self) -> RiskState {
        RiskState {
            orders_today: self.orders_today,
            max_orders_per_day: self.max_orders_per_day,
            killed: self.killed,
            current_date: self.current_date.clone(),
        }
    }

    /// Reset daily counters when the UTC date changes.
    fn roll_date(&mut self, now: DateTime<Utc>) {
        let today = now.format("%Y-%m-%d").to_string();
        if today != self.current_date {
            if !self.current_date.is_empty() {
                info!(
                    previous = %self.current_date,
                    orders = self.orders_today,
                    "daily risk counters reset"
                );
            }
            self.current_date = today;
            self.orders_today = 0;
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, 15, 0, 0).unwrap()
    }

    #[test]
    fn allows_trades_under_cap() {
        let mut risk = RiskEngine::new(3);
        let now = day(3);
        for _ in 0..3 {
            let (allowed, reason) = risk.can_trade(now);
            assert!(allowed, "unexpected block: {reason:?}");
            risk.record_order(now);
        }
        let (allowed, reason) = risk.can_trade(now);
        assert!(!allowed);
        assert!(reason.unwrap().contains("daily order cap"));
    }

    #[test]
    fn cap_resets_on_date_rollover() {
        let mut risk = RiskEngine::new(1);
        risk.record_order(day(3));
        assert!(!risk.can_trade(day(3)).0);
        // Next UTC day: counter resets.
        assert!(risk.can_trade(day(4)).0);
        assert_eq!(risk.state().orders_today, 0);
    }

    #[test]
    fn kill_switch_blocks_and_revive_restores() {
        let mut risk = RiskEngine::new(10);
        risk.kill("manual halt");
        let (allowed, reason) = risk.can_trade(day(3));
        assert!(!allowed);
        assert_eq!(reason.unwrap(), "manual halt");

        risk.revive();
        assert!(risk.can_trade(day(3)).0);
    }

    #[test]
    fn kill_switch_survives_date_rollover() {
        let mut risk = RiskEngine::new(10);
        risk.kill("manual halt");
        assert!(!risk.can_trade(day(4)).0);
    }
}
