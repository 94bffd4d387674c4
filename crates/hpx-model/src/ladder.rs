//! Price/quantity grid construction.
//!
//! Prices are generated in a scaled domain that embeds the contract
//! multiplier, so each level carries the notional value of one whole
//! contract and the currency→quantity division never produces fractional
//! intermediate values below the quantity precision.

use hpx_core::{Price, Qty, QuoteLevel};
use rust_decimal::{Decimal, RoundingStrategy};

/// Generate per-level contract notionals.
///
/// `value[i] = (start ± i × step) × contract_multiplier` for `i` in
/// `0..|count|`: ascending for a positive count (asks), descending for a
/// negative count (bids). Entry 0 is the near-touch level on both sides.
pub fn contract_values(
    start: Price,
    step: Price,
    count: i32,
    contract_multiplier: Decimal,
) -> Vec<Decimal> {
    let n = count.unsigned_abs() as usize;
    let mut values = Vec::with_capacity(n);
    for i in 0..n {
        let offset = step.inner() * Decimal::from(i as u32);
        let price = if count < 0 {
            start.inner() - offset
        } else {
            start.inner() + offset
        };
        values.push(price * contract_multiplier);
    }
    values
}

/// Convert per-level currency allocations into whole-contract quantities.
///
/// Quantity = allocation ÷ contract value, truncated toward zero to the
/// quantity's integer precision. Levels with a non-positive contract value
/// get no quantity.
pub fn quantities_from_allocations(
    allocations: &[Decimal],
    contract_values: &[Decimal],
) -> Vec<Qty> {
    allocations
        .iter()
        .copied()
        .zip(contract_values.iter().copied())
        .map(|(allocation, value)| {
            if value <= Decimal::ZERO {
                return Qty::ZERO;
            }
            Qty::new((allocation / value).round_dp_with_strategy(0, RoundingStrategy::ToZero))
        })
        .collect()
}

/// Build the combined two-sided ladder around a reservation price.
///
/// Bids descend from `reservation − bid_spread`, asks ascend from
/// `reservation + ask_spread`, both stepping one tick per level. Level 0
/// of each allocation slice is the near-touch level, so the largest
/// quantity rests nearest the reservation price on both sides. Bid
/// quantities are positive, ask quantities negative; zero-quantity levels
/// are dropped.
#[allow(clippy::too_many_arguments)]
pub fn build_ladder(
    reservation: Price,
    bid_spread: Price,
    ask_spread: Price,
    tick_size: Price,
    levels: u32,
    bid_allocations: &[Decimal],
    ask_allocations: &[Decimal],
    contract_multiplier: Decimal,
) -> Vec<QuoteLevel> {
    let bid_values = contract_values(
        reservation - bid_spread,
        tick_size,
        -(levels as i32),
        contract_multiplier,
    );
    let ask_values = contract_values(
        reservation + ask_spread,
        tick_size,
        levels as i32,
        contract_multiplier,
    );

    let bid_quantities = quantities_from_allocations(bid_allocations, &bid_values);
    let ask_quantities = quantities_from_allocations(ask_allocations, &ask_values);

    let mut ladder = Vec::with_capacity(bid_quantities.len() + ask_quantities.len());
    for (value, qty) in bid_values.iter().copied().zip(bid_quantities) {
        if qty.is_zero() {
            continue;
        }
        ladder.push(QuoteLevel::new(
            Price::new(value / contract_multiplier),
            qty,
        ));
    }
    for (value, qty) in ask_values.iter().copied().zip(ask_quantities) {
        if qty.is_zero() {
            continue;
        }
        ladder.push(QuoteLevel::new(
            Price::new(value / contract_multiplier),
            -qty,
        ));
    }

    ladder
}
