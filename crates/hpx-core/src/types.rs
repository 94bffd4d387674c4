//! Snapshot and ladder types shared across the quoting pipeline.
//!
//! Everything here is a plain value: the engine holds no state between
//! iterations, so these types are (re)built from venue/indexer reads on
//! every run and discarded afterwards.

use crate::{Price, Qty};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One observation from the historical index price feed.
///
/// Observations are ordered by timestamp but not necessarily evenly spaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    /// Observed index price.
    pub price: Price,
}

impl PricePoint {
    pub fn new(timestamp: i64, price: Price) -> Self {
        Self { timestamp, price }
    }
}

/// Order side, derived from a signed quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// One entry of the modelled quote ladder.
///
/// Positive quantity is a bid, negative an ask. Recomputed every
/// iteration, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLevel {
    pub price: Price,
    pub quantity: Qty,
}

impl QuoteLevel {
    pub fn new(price: Price, quantity: Qty) -> Self {
        Self { price, quantity }
    }

    pub fn side(&self) -> Side {
        if self.quantity.inner().is_sign_negative() {
            Side::Sell
        } else {
            Side::Buy
        }
    }
}

impl fmt::Display for QuoteLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.quantity, self.price)
    }
}

/// Current resting exposure at a price level, aggregated by the indexer
/// from the caller's active orders (signed quantities summed per price).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestingOrder {
    pub price: Price,
    pub net_quantity: Qty,
}

impl RestingOrder {
    pub fn new(price: Price, net_quantity: Qty) -> Self {
        Self {
            price,
            net_quantity,
        }
    }
}

impl fmt::Display for RestingOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.net_quantity, self.price)
    }
}

/// An order to submit this iteration. The quantity sign fixes the side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAction {
    pub price: Price,
    pub quantity: Qty,
    /// Delivery window identifier (unix seconds).
    pub delivery_date: i64,
}

impl OrderAction {
    pub fn side(&self) -> Side {
        if self.quantity.inner().is_sign_negative() {
            Side::Sell
        } else {
            Side::Buy
        }
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}@{}", self.side(), self.quantity.abs(), self.price)
    }
}

/// Net position for the active delivery window.
///
/// Read-only snapshot owned by the venue. Positive quantity = net long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub quantity: Qty,
    pub average_price: Price,
}

impl Position {
    pub fn flat() -> Self {
        Self {
            quantity: Qty::ZERO,
            average_price: Price::ZERO,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.quantity.is_zero()
    }

    /// Inventory notional: quantity scaled by the contract multiplier.
    pub fn inventory_notional(&self, contract_multiplier: Decimal) -> Decimal {
        self.quantity.inner() * contract_multiplier
    }

    /// Mark-to-index unrealized PnL.
    pub fn unrealized_pnl(&self, index_price: Price) -> Decimal {
        self.quantity.inner() * (index_price.inner() - self.average_price.inner())
    }
}

/// Market parameters read from the ledger once per iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketParams {
    /// Minimum price increment accepted by the ledger.
    pub tick_size: Price,
    /// Scalar converting a quoted price-per-unit into full contract notional.
    pub contract_multiplier: Decimal,
    /// Active delivery window identifier (unix seconds).
    pub delivery_date: i64,
}

/// Balances snapshot reported in the iteration result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancesSnapshot {
    /// Gas-asset balance of the maker wallet.
    pub gas: Decimal,
    /// Collateral-asset balance held in the wallet.
    pub wallet: Decimal,
    /// Collateral-asset balance held in the margin account.
    pub margin: Decimal,
}

impl BalancesSnapshot {
    /// Total collateral across wallet and margin account.
    pub fn total_collateral(&self) -> Decimal {
        self.wallet + self.margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_level_side() {
        let bid = QuoteLevel::new(Price::new(dec!(100)), Qty::new(dec!(2)));
        let ask = QuoteLevel::new(Price::new(dec!(101)), Qty::new(dec!(-2)));
        assert_eq!(bid.side(), Side::Buy);
        assert_eq!(ask.side(), Side::Sell);
    }

    #[test]
    fn test_position_inventory_notional() {
        let pos = Position {
            quantity: Qty::new(dec!(10)),
            average_price: Price::new(dec!(95)),
        };
        assert_eq!(pos.inventory_notional(dec!(24)), dec!(240));
    }

    #[test]
    fn test_position_unrealized_pnl() {
        let pos = Position {
            quantity: Qty::new(dec!(-2)),
            average_price: Price::new(dec!(100)),
        };
        // Short 2 @ 100, index at 90: pnl = -2 * (90 - 100) = +20
        assert_eq!(pos.unrealized_pnl(Price::new(dec!(90))), dec!(20));
    }

    #[test]
    fn test_balances_total_collateral() {
        let balances = BalancesSnapshot {
            gas: dec!(0.5),
            wallet: dec!(100),
            margin: dec!(250),
        };
        assert_eq!(balances.total_collateral(), dec!(350));
    }

    #[test]
    fn test_order_action_display() {
        let action = OrderAction {
            price: Price::new(dec!(100.5)),
            quantity: Qty::new(dec!(-3)),
            delivery_date: 1_700_000_000,
        };
        assert_eq!(action.to_string(), "SELL 3@100.5");
    }
}
