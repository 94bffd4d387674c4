//! HTTP client for the term-futures ledger.
//!
//! The ledger gateway exposes a read endpoint (`/query`) and a write
//! endpoint (`/execute`). Reads are unauthenticated; writes carry the
//! maker's session key as a bearer token. The order batch is transactional
//! on the ledger side: either the whole batch lands or none of it does.

use crate::error::{VenueError, VenueResult};
use hpx_core::{MarketParams, OrderAction, Price};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Default timeout for ledger requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Acknowledgement returned by the ledger for a committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SubmitReceipt {
    /// Ledger sequence number of the committed write. The indexer reports
    /// the sequence it has processed up to, which is what `await_indexed`
    /// compares against.
    pub sequence: u64,
}

/// Read/write surface of the ledger consumed by the engine.
#[allow(async_fn_in_trait)]
pub trait LedgerApi {
    /// Gas-asset balance of the maker wallet.
    async fn gas_balance(&self) -> VenueResult<Decimal>;
    /// Collateral-asset balance held in the maker wallet.
    async fn wallet_collateral_balance(&self) -> VenueResult<Decimal>;
    /// Collateral-asset balance held in the margin account.
    async fn margin_balance(&self) -> VenueResult<Decimal>;
    /// Current index price.
    async fn index_price(&self) -> VenueResult<Price>;
    /// Tick size, contract multiplier and active delivery date.
    async fn market_params(&self) -> VenueResult<MarketParams>;
    /// Move collateral from the wallet into the margin account.
    async fn deposit_margin(&self, amount: Decimal) -> VenueResult<SubmitReceipt>;
    /// Submit the full action set for this iteration as one batch.
    async fn place_orders(&self, orders: &[OrderAction]) -> VenueResult<SubmitReceipt>;
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum QueryRequest<'a> {
    #[serde(rename_all = "camelCase")]
    GasBalance { address: &'a str },
    #[serde(rename_all = "camelCase")]
    CollateralBalance { address: &'a str },
    #[serde(rename_all = "camelCase")]
    MarginBalance { address: &'a str },
    IndexPrice,
    MarketParams,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ExecuteRequest {
    #[serde(rename_all = "camelCase")]
    DepositMargin { amount: String },
    #[serde(rename_all = "camelCase")]
    PlaceOrders { orders: Vec<WireOrder> },
}

/// One order in the batch submission. The signed quantity fixes the side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireOrder {
    price: String,
    quantity: String,
    delivery_date: i64,
}

impl From<&OrderAction> for WireOrder {
    fn from(order: &OrderAction) -> Self {
        Self {
            price: order.price.to_string(),
            quantity: order.quantity.to_string(),
            delivery_date: order.delivery_date,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValueResponse {
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketParamsResponse {
    tick_size: String,
    contract_multiplier: String,
    delivery_date: i64,
}

/// REST implementation of [`LedgerApi`].
pub struct LedgerClient {
    client: Client,
    base_url: String,
    address: String,
    session_key: Option<String>,
}

impl LedgerClient {
    /// Create a new ledger client.
    ///
    /// `session_key` is required for the write surface; read-only (dry-run)
    /// use may omit it.
    pub fn new(
        base_url: impl Into<String>,
        address: impl Into<String>,
        session_key: Option<String>,
    ) -> VenueResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| VenueError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            address: address.into(),
            session_key,
        })
    }

    async fn query<T: serde::de::DeserializeOwned>(&self, request: &QueryRequest<'_>) -> VenueResult<T> {
        let url = format!("{}/query", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| VenueError::Http(format!("ledger query failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VenueError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| VenueError::Decode(format!("ledger response: {e}")))
    }

    async fn execute(&self, request: &ExecuteRequest) -> VenueResult<SubmitReceipt> {
        let session_key = self.session_key.as_deref().ok_or_else(|| {
            VenueError::Http("session key required for ledger writes".to_string())
        })?;

        let url = format!("{}/execute", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(session_key)
            .json(request)
            .send()
            .await
            .map_err(|e| VenueError::Http(format!("ledger execute failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VenueError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<SubmitReceipt>()
            .await
            .map_err(|e| VenueError::Decode(format!("ledger receipt: {e}")))
    }

    fn parse_decimal(value: &str, context: &str) -> VenueResult<Decimal> {
        value
            .parse::<Decimal>()
            .map_err(|e| VenueError::Decode(format!("{context}: {e}")))
    }
}

impl LedgerApi for LedgerClient {
    async fn gas_balance(&self) -> VenueResult<Decimal> {
        let response: ValueResponse = self
            .query(&QueryRequest::GasBalance {
                address: &self.address,
            })
            .await?;
        Self::parse_decimal(&response.value, "gas balance")
    }

    async fn wallet_collateral_balance(&self) -> VenueResult<Decimal> {
        let response: ValueResponse = self
            .query(&QueryRequest::CollateralBalance {
                address: &self.address,
            })
            .await?;
        Self::parse_decimal(&response.value, "wallet collateral balance")
    }

    async fn margin_balance(&self) -> VenueResult<Decimal> {
        let response: ValueResponse = self
            .query(&QueryRequest::MarginBalance {
                address: &self.address,
            })
            .await?;
        Self::parse_decimal(&response.value, "margin balance")
    }

    async fn index_price(&self) -> VenueResult<Price> {
        let response: ValueResponse = self.query(&QueryRequest::IndexPrice).await?;
        Self::parse_decimal(&response.value, "index price").map(Price::new)
    }

    async fn market_params(&self) -> VenueResult<MarketParams> {
        let response: MarketParamsResponse = self.query(&QueryRequest::MarketParams).await?;
        debug!(
            tick_size = %response.tick_size,
            contract_multiplier = %response.contract_multiplier,
            delivery_date = response.delivery_date,
            "Fetched market params"
        );
        Ok(MarketParams {
            tick_size: Price::new(Self::parse_decimal(&response.tick_size, "tick size")?),
            contract_multiplier: Self::parse_decimal(
                &response.contract_multiplier,
                "contract multiplier",
            )?,
            delivery_date: response.delivery_date,
        })
    }

    async fn deposit_margin(&self, amount: Decimal) -> VenueResult<SubmitReceipt> {
        info!(%amount, "Depositing to margin account");
        self.execute(&ExecuteRequest::DepositMargin {
            amount: amount.to_string(),
        })
        .await
    }

    async fn place_orders(&self, orders: &[OrderAction]) -> VenueResult<SubmitReceipt> {
        let wire: Vec<WireOrder> = orders.iter().map(WireOrder::from).collect();

        info!(count = wire.len(), "Submitting order batch");
        self.execute(&ExecuteRequest::PlaceOrders { orders: wire }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hpx_core::Qty;
    use rust_decimal_macros::dec;

    #[test]
    fn test_query_request_wire_shape() {
        let request = QueryRequest::GasBalance { address: "0xabc" };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "gasBalance");
        assert_eq!(json["address"], "0xabc");
    }

    #[test]
    fn test_place_orders_wire_shape() {
        let order = OrderAction {
            price: Price::new(dec!(101.5)),
            quantity: Qty::new(dec!(-2)),
            delivery_date: 1_700_000_000,
        };
        let request = ExecuteRequest::PlaceOrders {
            orders: vec![WireOrder::from(&order)],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "placeOrders");
        assert_eq!(json["orders"][0]["price"], "101.5");
        assert_eq!(json["orders"][0]["quantity"], "-2");
        assert_eq!(json["orders"][0]["deliveryDate"], 1_700_000_000i64);
    }

    #[test]
    fn test_market_params_response_decodes() {
        let json = r#"{"tickSize":"0.25","contractMultiplier":"24","deliveryDate":1700000000}"#;
        let response: MarketParamsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.tick_size, "0.25");
        assert_eq!(response.contract_multiplier, "24");
    }

    #[test]
    fn test_writes_require_session_key() {
        let client = LedgerClient::new("http://localhost:0", "0xabc", None).unwrap();
        let err = tokio_test::block_on(client.deposit_margin(dec!(10))).unwrap_err();
        assert!(matches!(err, VenueError::Http(_)));
    }
}
