// =============================================================================
// Execution Engine — routes signals through position checks, the risk engine,
// and the brokerage client, with demo-mode simulation support
// =============================================================================

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::broker::Brokerage;
use crate::risk::RiskEngine;
use crate::types::{Action, OrderRequest, OrderSide, PositionInfo, Signal};

// ---------------------------------------------------------------------------
// Result type
// ---------------------------------------------------------------------------

/// Outcome of an execution attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExecutionResult {
    /// Order was placed with the broker (live mode).
    Placed(serde_json::Value),
    /// Order was simulated locally (demo mode).
    Simulated(String),
    /// No order was needed (hold signal, or position state made it a no-op).
    Skipped(String),
    /// Order was blocked by the risk engine.
    Blocked(String),
    /// An error occurred during submission; surfaced as-is, no retry.
    Error(String),
}

impl std::fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Placed(v) => write!(f, "Placed({})", v),
            Self::Simulated(msg) => write!(f, "Simulated({msg})"),
            Self::Skipped(reason) => write!(f, "Skipped({reason})"),
            Self::Blocked(reason) => write!(f, "Blocked({reason})"),
            Self::Error(err) => write!(f, "Error({err})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Routes actionable signals to the brokerage, respecting current positions:
/// a buy while already holding is a no-op, a sell closes the entire position.
pub struct ExecutionEngine<B> {
    broker: Arc<B>,
    /// Fixed share quantity for new buy orders.
    order_quantity: f64,
}

impl<B: Brokerage> ExecutionEngine<B> {
    pub fn new(broker: Arc<B>, order_quantity: f64) -> Self {
        Self {
            broker,
            order_quantity,
        }
    }

    /// Execute one signal against the current position set.
    ///
    /// In **demo mode** no request reaches the broker; the fill is logged
    /// locally.  In **live mode** the order is forwarded to the brokerage
    /// REST client.  Both modes consult the risk engine first and count
    /// against the daily order cap.
    pub async fn execute_signal(
        &self,
        signal: &Signal,
        positions: &[PositionInfo],
        risk: &mut RiskEngine,
        is_demo: bool,
    ) -> ExecutionResult {
        let held: f64 = positions
            .iter()
            .filter(|p| p.symbol == signal.symbol)
            .map(|p| p.quantity)
            .sum();

        let (side, quantity) = match signal.action {
            Action::Hold => {
                return ExecutionResult::Skipped("hold signal".to_string());
            }
            Action::Buy => {
                if held > 0.0 {
                    info!(symbol = %signal.symbol, held, "already holding — no action taken");
                    return ExecutionResult::Skipped(format!("already holding {held} shares"));
                }
                (OrderSide::Buy, self.order_quantity)
            }
            Action::Sell => {
                if held <= 0.0 {
                    info!(symbol = %signal.symbol, "not holding — no action taken");
                    return ExecutionResult::Skipped("no position to sell".to_string());
                }
                // Sell the entire position.
                (OrderSide::Sell, held)
            }
        };

        let (allowed, reason) = risk.can_trade(Utc::now());
        if !allowed {
            let msg = reason.unwrap_or_else(|| "unknown risk violation".to_string());
            warn!(symbol = %signal.symbol, side = %side, reason = %msg, "execution blocked by risk engine");
            return ExecutionResult::Blocked(msg);
        }

        let order = OrderRequest {
            symbol: signal.symbol.clone(),
            side,
            quantity,
            client_order_id: format!("sntl-{}", Uuid::new_v4()),
        };

        if is_demo {
            risk.record_order(Utc::now());
            let msg = format!(
                "demo fill: {} {} x{}",
                order.side, order.symbol, order.quantity
            );
            info!(symbol = %order.symbol, side = %order.side, quantity, rule = %signal.rule, "simulated order");
            return ExecutionResult::Simulated(msg);
        }

        match self.broker.place_market_order(&order).await {
            Ok(ack) => {
                risk.record_order(Utc::now());
                info!(
                    symbol = %order.symbol,
                    side = %order.side,
                    quantity,
                    rule = %signal.rule,
                    "order placed"
                );
                ExecutionResult::Placed(ack)
            }
            Err(e) => {
                warn!(symbol = %order.symbol, side = %order.side, error = %e, "order submission failed");
                ExecutionResult::Error(e.to_string())
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every order instead of talking to a broker.
    struct MockBroker {
        placed: Mutex<Vec<OrderRequest>>,
        fail: bool,
    }

    impl MockBroker {
        fn new() -> Self {
            Self {
                placed: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                placed: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl Brokerage for MockBroker {
        async fn get_positions(&self) -> Result<Vec<PositionInfo>> {
            Ok(Vec::new())
        }

        async fn place_market_order(&self, order: &OrderRequest) -> Result<serde_json::Value> {
            if self.fail {
                anyhow::bail!("broker rejected order");
            }
            self.placed.lock().unwrap().push(order.clone());
            Ok(serde_json::json!({ "status": "FILLED" }))
        }
    }

    fn signal(symbol: &str, action: Action) -> Signal {
        Signal {
            symbol: symbol.to_string(),
            timestamp: 0,
            action,
            rule: "trend_consensus".to_string(),
        }
    }

    fn position(symbol: &str, quantity: f64) -> PositionInfo {
        PositionInfo {
            symbol: symbol.to_string(),
            quantity,
            avg_entry_price: 100.0,
        }
    }

    #[tokio::test]
    async fn buy_when_flat_places_fixed_quantity() {
        let broker = Arc::new(MockBroker::new());
        let engine = ExecutionEngine::new(broker.clone(), 10.0);
        let mut risk = RiskEngine::new(10);

        let result = engine
            .execute_signal(&signal("AAPL", Action::Buy), &[], &mut risk, false)
            .await;

        assert!(matches!(result, ExecutionResult::Placed(_)));
        let placed = broker.placed.lock().unwrap();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].side, OrderSide::Buy);
        assert_eq!(placed[0].quantity, 10.0);
        assert!(placed[0].client_order_id.starts_with("sntl-"));
    }

    #[tokio::test]
    async fn buy_when_holding_is_skipped() {
        let broker = Arc::new(MockBroker::new());
        let engine = ExecutionEngine::new(broker.clone(), 10.0);
        let mut risk = RiskEngine::new(10);

        let positions = vec![position("AAPL", 10.0)];
        let result = engine
            .execute_signal(&signal("AAPL", Action::Buy), &positions, &mut risk, false)
            .await;

        assert!(matches!(result, ExecutionResult::Skipped(_)));
        assert!(broker.placed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sell_closes_entire_position() {
        let broker = Arc::new(MockBroker::new());
        let engine = ExecutionEngine::new(broker.clone(), 10.0);
        let mut risk = RiskEngine::new(10);

        let positions = vec![position("AAPL", 37.0)];
        let result = engine
            .execute_signal(&signal("AAPL", Action::Sell), &positions, &mut risk, false)
            .await;

        assert!(matches!(result, ExecutionResult::Placed(_)));
        let placed = broker.placed.lock().unwrap();
        assert_eq!(placed[0].side, OrderSide::Sell);
        assert_eq!(placed[0].quantity, 37.0);
    }

    #[tokio::test]
    async fn sell_when_flat_is_skipped() {
        let broker = Arc::new(MockBroker::new());
        let engine = ExecutionEngine::new(broker.clone(), 10.0);
        let mut risk = RiskEngine::new(10);

        let result = engine
            .execute_signal(&signal("AAPL", Action::Sell), &[], &mut risk, false)
            .await;

        assert!(matches!(result, ExecutionResult::Skipped(_)));
        assert!(broker.placed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn hold_is_skipped_before_risk_check() {
        let broker = Arc::new(MockBroker::new());
        let engine = ExecutionEngine::new(broker.clone(), 10.0);
        let mut risk = RiskEngine::new(0); // cap already exhausted

        let result = engine
            .execute_signal(&signal("AAPL", Action::Hold), &[], &mut risk, false)
            .await;

        // A hold never reaches the risk engine, so it is skipped, not blocked.
        assert!(matches!(result, ExecutionResult::Skipped(_)));
    }

    #[tokio::test]
    async fn risk_cap_blocks_order() {
        let broker = Arc::new(MockBroker::new());
        let engine = ExecutionEngine::new(broker.clone(), 10.0);
        let mut risk = RiskEngine::new(0);

        let result = engine
            .execute_signal(&signal("AAPL", Action::Buy), &[], &mut risk, false)
            .await;

        assert!(matches!(result, ExecutionResult::Blocked(_)));
        assert!(broker.placed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn demo_mode_never_reaches_broker_but_counts_against_cap() {
        let broker = Arc::new(MockBroker::new());
        let engine = ExecutionEngine::new(broker.clone(), 10.0);
        let mut risk = RiskEngine::new(1);

        let result = engine
            .execute_signal(&signal("AAPL", Action::Buy), &[], &mut risk, true)
            .await;
        assert!(matches!(result, ExecutionResult::Simulated(_)));
        assert!(broker.placed.lock().unwrap().is_empty());

        // Cap of 1 is now exhausted even though the fill was simulated.
        let result = engine
            .execute_signal(&signal("MSFT", Action::Buy), &[], &mut risk, true)
            .await;
        assert!(matches!(result, ExecutionResult::Blocked(_)));
    }

    #[tokio::test]
    async fn broker_failure_surfaces_as_error() {
        let broker = Arc::new(MockBroker::failing());
        let engine = ExecutionEngine::new(broker, 10.0);
        let mut risk = RiskEngine::new(10);

        let result = engine
            .execute_signal(&signal("AAPL", Action::Buy), &[], &mut risk, false)
            .await;

        assert!(matches!(result, ExecutionResult::Error(_)));
        // Failed submissions do not consume the daily cap.
        assert_eq!(risk.state().orders_today, 0);
    }
}
