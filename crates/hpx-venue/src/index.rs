//! GraphQL client for the position/order indexer.
//!
//! The indexer trails the ledger: it ingests committed writes and exposes
//! the caller's resting orders, net position and the historical index
//! series. Reads here are eventually consistent — `await_indexed` bounds
//! the wait for a just-committed write to become visible.

use crate::error::{VenueError, VenueResult};
use hpx_core::{Position, Price, PricePoint, Qty, RestingOrder};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Default timeout for indexer requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Read surface of the indexer consumed by the engine.
#[allow(async_fn_in_trait)]
pub trait IndexApi {
    /// The caller's resting orders for a delivery window, aggregated to a
    /// signed net quantity per price, sorted by price.
    async fn resting_orders(
        &self,
        delivery_date: i64,
        address: &str,
    ) -> VenueResult<Vec<RestingOrder>>;

    /// The caller's net position and average entry price for a delivery
    /// window.
    async fn position(&self, delivery_date: i64, address: &str) -> VenueResult<Position>;

    /// Historical index observations in `(from, to]`, ascending.
    async fn price_history(&self, from_secs: i64, to_secs: i64) -> VenueResult<Vec<PricePoint>>;

    /// Highest ledger sequence number the indexer has processed.
    async fn head_sequence(&self) -> VenueResult<u64>;
}

/// Poll the indexer until it has processed `target` or the attempt budget
/// runs out.
///
/// A timeout is fatal only for whatever depended on the confirmation; the
/// write it was waiting on has already committed on the ledger.
pub async fn await_indexed<I: IndexApi>(
    index: &I,
    target: u64,
    attempts: u32,
    delay: Duration,
) -> VenueResult<()> {
    for attempt in 1..=attempts {
        let head = index.head_sequence().await?;
        if head >= target {
            debug!(head, target, attempt, "Indexer caught up");
            return Ok(());
        }
        debug!(head, target, attempt, "Indexer behind, waiting");
        tokio::time::sleep(delay).await;
    }
    Err(VenueError::StaleIndex { target, attempts })
}

const RESTING_ORDERS_QUERY: &str = r#"
query RestingOrders($deliveryAt: BigInt!, $addr: String!) {
  orders(where: { deliveryAt: $deliveryAt, participant: $addr, isActive: true }) {
    pricePerUnit
    quantity
    isBuy
  }
}
"#;

const POSITION_QUERY: &str = r#"
query Position($deliveryAt: BigInt!, $addr: String!) {
  positions(where: { deliveryAt: $deliveryAt, participant: $addr, isActive: true }) {
    pricePerUnit
    quantity
    isBuy
  }
}
"#;

const PRICE_HISTORY_QUERY: &str = r#"
query PriceHistory($from: BigInt!, $to: BigInt!) {
  indexObservations(
    orderBy: updatedAt
    orderDirection: asc
    where: { updatedAt_gt: $from, updatedAt_lte: $to }
  ) {
    updatedAt
    price
  }
}
"#;

const HEAD_QUERY: &str = r#"
query Head {
  _meta {
    sequence
  }
}
"#;

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct OrderRow {
    #[serde(rename = "pricePerUnit")]
    price_per_unit: String,
    quantity: String,
    #[serde(rename = "isBuy")]
    is_buy: bool,
}

#[derive(Debug, Deserialize)]
struct OrdersData {
    orders: Vec<OrderRow>,
}

#[derive(Debug, Deserialize)]
struct PositionsData {
    positions: Vec<OrderRow>,
}

#[derive(Debug, Deserialize)]
struct ObservationRow {
    #[serde(rename = "updatedAt")]
    updated_at: String,
    price: String,
}

#[derive(Debug, Deserialize)]
struct ObservationsData {
    #[serde(rename = "indexObservations")]
    index_observations: Vec<ObservationRow>,
}

#[derive(Debug, Deserialize)]
struct HeadData {
    _meta: HeadMeta,
}

#[derive(Debug, Deserialize)]
struct HeadMeta {
    sequence: u64,
}

/// GraphQL-over-HTTP implementation of [`IndexApi`].
pub struct IndexClient {
    client: Client,
    url: String,
}

impl IndexClient {
    pub fn new(url: impl Into<String>) -> VenueResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| VenueError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> VenueResult<T> {
        let response = self
            .client
            .post(&self.url)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await
            .map_err(|e| VenueError::Http(format!("indexer query failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VenueError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| VenueError::Decode(format!("indexer response: {e}")))?;

        if let Some(error) = body.errors.first() {
            return Err(VenueError::Decode(format!(
                "indexer query error: {}",
                error.message
            )));
        }

        body.data
            .ok_or_else(|| VenueError::Decode("indexer response missing data".to_string()))
    }
}

impl IndexApi for IndexClient {
    async fn resting_orders(
        &self,
        delivery_date: i64,
        address: &str,
    ) -> VenueResult<Vec<RestingOrder>> {
        let data: OrdersData = self
            .request(
                RESTING_ORDERS_QUERY,
                serde_json::json!({
                    "deliveryAt": delivery_date.to_string(),
                    "addr": address,
                }),
            )
            .await?;
        aggregate_orders(&data.orders)
    }

    async fn position(&self, delivery_date: i64, address: &str) -> VenueResult<Position> {
        let data: PositionsData = self
            .request(
                POSITION_QUERY,
                serde_json::json!({
                    "deliveryAt": delivery_date.to_string(),
                    "addr": address,
                }),
            )
            .await?;
        fold_position(&data.positions)
    }

    async fn price_history(&self, from_secs: i64, to_secs: i64) -> VenueResult<Vec<PricePoint>> {
        let data: ObservationsData = self
            .request(
                PRICE_HISTORY_QUERY,
                serde_json::json!({
                    "from": from_secs.to_string(),
                    "to": to_secs.to_string(),
                }),
            )
            .await?;

        data.index_observations
            .iter()
            .map(|row| {
                let timestamp = row
                    .updated_at
                    .parse::<i64>()
                    .map_err(|e| VenueError::Decode(format!("observation timestamp: {e}")))?;
                let price = row
                    .price
                    .parse::<Decimal>()
                    .map_err(|e| VenueError::Decode(format!("observation price: {e}")))?;
                Ok(PricePoint::new(timestamp, Price::new(price)))
            })
            .collect()
    }

    async fn head_sequence(&self) -> VenueResult<u64> {
        let data: HeadData = self.request(HEAD_QUERY, serde_json::json!({})).await?;
        Ok(data._meta.sequence)
    }
}

/// Sum signed order quantities per price level.
fn aggregate_orders(rows: &[OrderRow]) -> VenueResult<Vec<RestingOrder>> {
    let mut by_price: BTreeMap<Price, Decimal> = BTreeMap::new();
    for row in rows {
        let price = parse_price(&row.price_per_unit)?;
        let quantity = parse_quantity(&row.quantity)?;
        let signed = if row.is_buy { quantity } else { -quantity };
        *by_price.entry(price).or_insert(Decimal::ZERO) += signed;
    }

    Ok(by_price
        .into_iter()
        .filter(|(_, qty)| !qty.is_zero())
        .map(|(price, qty)| RestingOrder::new(price, Qty::new(qty)))
        .collect())
}

/// Net out position rows into a quantity and average entry price.
fn fold_position(rows: &[OrderRow]) -> VenueResult<Position> {
    let mut net = Decimal::ZERO;
    let mut gross_qty = Decimal::ZERO;
    let mut gross_notional = Decimal::ZERO;

    for row in rows {
        let price = parse_price(&row.price_per_unit)?;
        let quantity = parse_quantity(&row.quantity)?;
        net += if row.is_buy { quantity } else { -quantity };
        gross_qty += quantity;
        gross_notional += quantity * price.inner();
    }

    if net.is_zero() || gross_qty.is_zero() {
        return Ok(Position::flat());
    }

    Ok(Position {
        quantity: Qty::new(net),
        average_price: Price::new(gross_notional / gross_qty),
    })
}

fn parse_price(value: &str) -> VenueResult<Price> {
    value
        .parse::<Price>()
        .map_err(|e| VenueError::Decode(format!("price: {e}")))
}

fn parse_quantity(value: &str) -> VenueResult<Decimal> {
    value
        .parse::<Decimal>()
        .map_err(|e| VenueError::Decode(format!("quantity: {e}")))
}
