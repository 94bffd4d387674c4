//! Inventory-adjusted reservation price.
//!
//! Avellaneda–Stoikov inventory-skew form: the fair price the maker quotes
//! around is the index shifted against the current inventory, so fills that
//! reduce exposure are priced more attractively than fills that add to it.

use hpx_core::Price;
use rust_decimal::Decimal;

/// Compute the raw reservation price.
///
/// `r = index − inventory_notional × risk_aversion × sigma² × hours`
///
/// A long inventory (positive notional) pulls the reservation price below
/// the index; a short inventory pulls it above. Zero inventory leaves it at
/// the index. Callers round the result to the tick grid afterwards
/// (`Price::round_to_tick`).
pub fn reservation_price(
    index_price: Price,
    inventory_notional: Decimal,
    risk_aversion: Decimal,
    sigma_per_step: f64,
    time_to_checkpoint_hours: f64,
) -> Price {
    // sigma² × hours is the only non-decimal intermediate; it comes from
    // the f64 volatility estimate and converts back immediately.
    let variance_horizon =
        Decimal::from_f64_retain(sigma_per_step * sigma_per_step * time_to_checkpoint_hours)
            .unwrap_or(Decimal::ZERO);

    let shift = inventory_notional * risk_aversion * variance_horizon;
    Price::new(index_price.inner() - shift)
}

/// Split the configured spread across the two sides.
///
/// Nominally each side gets half. When the spread is at or below one tick,
/// halving would round one side to zero, so the bid sits on the reservation
/// price and the full spread goes to the ask, preserving a one-tick
/// two-sided market.
pub fn split_spread(spread_amount: Price, tick_size: Price) -> (Price, Price) {
    if spread_amount <= tick_size {
        (Price::ZERO, spread_amount)
    } else {
        let half = spread_amount.inner() / Decimal::TWO;
        (Price::new(half), Price::new(half))
    }
}
