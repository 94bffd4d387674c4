//! Quote modelling for the hashpower term-futures market maker.
//!
//! Pure functions only: every stage is a deterministic function of its
//! inputs, so the whole pipeline can be unit-tested without any venue.
//!
//! # Pipeline
//!
//! ```text
//! price history ─ resample_closes ─ realized_volatility ─┐
//! index price, position ──────── reservation_price ──────┤
//! budget, inventory ── side_budgets ── geometric_taper ──┤
//!                                               build_ladder
//!                                                    │
//! resting orders ──────────────────────── calculate_orders → deltas
//! ```

pub mod allocation;
pub mod ladder;
pub mod reconcile;
pub mod reservation;
pub mod volatility;

pub use allocation::{geometric_taper, normalized_inventory, side_budgets, SideBudgets};
pub use ladder::{build_ladder, contract_values, quantities_from_allocations};
pub use reconcile::calculate_orders;
pub use reservation::{reservation_price, split_spread};
pub use volatility::{realized_volatility, resample_closes, VolatilityEstimate};
