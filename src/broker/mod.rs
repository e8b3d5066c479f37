pub mod client;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{OrderRequest, PositionInfo};

// Re-export for convenient access (e.g. `use crate::broker::BrokerClient`).
pub use client::BrokerClient;

/// Brokerage operations the execution engine depends on.
///
/// The trait keeps the engine testable without a live session; the REST
/// client is the only production implementation.
#[async_trait]
pub trait Brokerage: Send + Sync {
    /// All currently open positions.
    async fn get_positions(&self) -> Result<Vec<PositionInfo>>;

    /// Submit a market order. Returns the broker's acknowledgement body.
    async fn place_market_order(&self, order: &OrderRequest) -> Result<serde_json::Value>;
}
