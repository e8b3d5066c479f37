// =============================================================================
// Brokerage REST API Client — HMAC-SHA256 signed requests
// =============================================================================
//
// SECURITY: The secret key is never logged or serialized. All signed requests
// carry the API key as a header and a recvWindow of 5 000 ms to tolerate
// minor clock drift between the bot and the broker's servers.
// =============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderValue};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, instrument, warn};

use super::Brokerage;
use crate::types::{OrderRequest, PositionInfo};

type HmacSha256 = Hmac<Sha256>;

/// Default recv-window sent with every signed request (milliseconds).
const RECV_WINDOW: u64 = 5000;

/// Brokerage REST client with HMAC-SHA256 request signing.
#[derive(Clone)]
pub struct BrokerClient {
    secret: String,
    base_url: String,
    client: reqwest::Client,
}

impl BrokerClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a new `BrokerClient`.
    ///
    /// # Arguments
    /// * `base_url` — broker API root.
    /// * `api_key`  — API key (sent as a header, never in query params).
    /// * `secret`   — secret key used exclusively for HMAC signing.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();

        let mut default_headers = HeaderMap::new();
        // The API key header is required for all signed endpoints.
        if let Ok(val) = HeaderValue::from_str(&api_key) {
            default_headers.insert("X-SNTL-APIKEY", val);
        }

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build broker HTTP client")?;

        Ok(Self {
            secret: secret.into(),
            base_url: base_url.into(),
            client,
        })
    }

    // -------------------------------------------------------------------------
    // Signing helpers
    // -------------------------------------------------------------------------

    /// Produce an HMAC-SHA256 hex signature of `query`.
    fn sign(&self, query: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(self.secret.as_bytes()).expect("HMAC accepts any key size");
        mac.update(query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Current UNIX timestamp in milliseconds.
    fn timestamp_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before UNIX epoch")
            .as_millis() as u64
    }

    /// Build the full query string for a signed request (appends timestamp,
    /// recvWindow, and signature).
    fn signed_query(&self, params: &str) -> String {
        let ts = Self::timestamp_ms();
        let base = if params.is_empty() {
            format!("timestamp={ts}&recvWindow={RECV_WINDOW}")
        } else {
            format!("{params}&timestamp={ts}&recvWindow={RECV_WINDOW}")
        };
        let sig = self.sign(&base);
        format!("{base}&signature={sig}")
    }

    // -------------------------------------------------------------------------
    // Account
    // -------------------------------------------------------------------------

    /// GET /v1/account (signed).
    #[instrument(skip(self), name = "broker::get_account")]
    pub async fn get_account(&self) -> Result<serde_json::Value> {
        let qs = self.signed_query("");
        let url = format!("{}/v1/account?{}", self.base_url, qs);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("GET /v1/account request failed")?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse account response")?;

        if !status.is_success() {
            anyhow::bail!("broker GET /v1/account returned {}: {}", status, body);
        }

        debug!("account info retrieved successfully");
        Ok(body)
    }
}

#[async_trait]
impl Brokerage for BrokerClient {
    /// GET /v1/positions (signed).
    #[instrument(skip(self), name = "broker::get_positions")]
    async fn get_positions(&self) -> Result<Vec<PositionInfo>> {
        let qs = self.signed_query("");
        let url = format!("{}/v1/positions?{}", self.base_url, qs);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("GET /v1/positions request failed")?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse positions response")?;

        if !status.is_success() {
            anyhow::bail!("broker GET /v1/positions returned {}: {}", status, body);
        }

        let rows = body.as_array().cloned().unwrap_or_default();
        let mut positions = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<PositionInfo>(row) {
                Ok(p) => positions.push(p),
                Err(e) => warn!(error = %e, "skipping malformed position row"),
            }
        }

        debug!(count = positions.len(), "positions retrieved");
        Ok(positions)
    }

    /// POST /v1/orders (signed) — submit a market order.
    #[instrument(
        skip(self, order),
        fields(symbol = %order.symbol, side = %order.side, quantity = order.quantity),
        name = "broker::place_market_order"
    )]
    async fn place_market_order(&self, order: &OrderRequest) -> Result<serde_json::Value> {
        let params = format!(
            "symbol={}&side={}&type=MARKET&quantity={}&clientOrderId={}",
            order.symbol,
            order.side.as_str(),
            order.quantity,
            order.client_order_id
        );
        let qs = self.signed_query(&params);
        let url = format!("{}/v1/orders?{}", self.base_url, qs);

        debug!("placing market order");

        let resp = self
            .client
            .post(&url)
            .send()
            .await
            .context("POST /v1/orders request failed")?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse order response")?;

        if !status.is_success() {
            anyhow::bail!("broker POST /v1/orders returned {}: {}", status, body);
        }

        debug!("order placed successfully");
        Ok(body)
    }
}
