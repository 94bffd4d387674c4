//! Core domain types for the hashpower term-futures market maker.
//!
//! This crate provides the fundamental types shared by every stage of the
//! quoting pipeline:
//! - `Price`, `Qty`: precision-safe decimal newtypes
//! - `PricePoint`: one historical index observation
//! - `QuoteLevel`, `RestingOrder`, `OrderAction`: ladder entries at the
//!   three stages of their life (modelled, resting, submitted)
//! - `Position`, `MarketParams`, `BalancesSnapshot`: venue-owned snapshots

pub mod decimal;
pub mod types;

pub use decimal::{Price, Qty};
pub use types::{
    BalancesSnapshot, MarketParams, OrderAction, Position, PricePoint, QuoteLevel, RestingOrder,
    Side,
};
