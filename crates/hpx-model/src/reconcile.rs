//! Ladder reconciliation.
//!
//! Diffs the modelled ladder against the orders currently resting on the
//! ledger and emits the minimal set of creation-style actions. A negative
//! delta at a price where resting exposure exceeds the model is expressed
//! as an order in the opposite direction, which the ledger nets against
//! the existing exposure.

use hpx_core::{OrderAction, Price, Qty, QuoteLevel, RestingOrder};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Compute the actions needed to move the resting ladder to the modelled
/// ladder.
///
/// For every price present in either ladder, `delta = modelled − resting`;
/// only non-zero deltas become actions. The output is sorted by price.
/// Actions must be submitted against the same resting-state read they were
/// diffed from — never against a stale one.
pub fn calculate_orders(
    modelled: &[QuoteLevel],
    current: &[RestingOrder],
    delivery_date: i64,
) -> Vec<OrderAction> {
    let mut deltas: BTreeMap<Price, Decimal> = BTreeMap::new();

    for level in modelled {
        *deltas.entry(level.price).or_insert(Decimal::ZERO) += level.quantity.inner();
    }
    for order in current {
        *deltas.entry(order.price).or_insert(Decimal::ZERO) -= order.net_quantity.inner();
    }

    deltas
        .into_iter()
        .filter(|(_, qty)| !qty.is_zero())
        .map(|(price, qty)| OrderAction {
            price,
            quantity: Qty::new(qty),
            delivery_date,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const DELIVERY: i64 = 1_700_000_000;

    fn level(price: &str, qty: &str) -> QuoteLevel {
        QuoteLevel::new(price.parse().unwrap(), qty.parse().unwrap())
    }

    fn resting(price: &str, qty: &str) -> RestingOrder {
        RestingOrder::new(price.parse().unwrap(), qty.parse().unwrap())
    }

    #[test]
    fn test_identical_ladders_yield_no_actions() {
        let modelled = vec![level("90", "2"), level("110", "-2")];
        let current = vec![resting("90", "2"), resting("110", "-2")];
        assert!(calculate_orders(&modelled, &current, DELIVERY).is_empty());
    }

    #[test]
    fn test_fresh_ladder_emitted_in_full() {
        let modelled = vec![level("90", "2"), level("110", "-3")];
        let actions = calculate_orders(&modelled, &[], DELIVERY);
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].price.inner(), dec!(90));
        assert_eq!(actions[0].quantity.inner(), dec!(2));
        assert_eq!(actions[1].quantity.inner(), dec!(-3));
        assert!(actions.iter().all(|a| a.delivery_date == DELIVERY));
    }

    #[test]
    fn test_excess_exposure_nets_with_opposite_order() {
        // Model wants 1 bid at 90, 3 are resting: delta is a sell of 2.
        let modelled = vec![level("90", "1")];
        let current = vec![resting("90", "3")];
        let actions = calculate_orders(&modelled, &current, DELIVERY);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].quantity.inner(), dec!(-2));
    }

    #[test]
    fn test_abandoned_price_level_is_flattened() {
        // Nothing modelled at 80 anymore; resting bid of 2 gets a -2 delta.
        let modelled = vec![level("90", "2")];
        let current = vec![resting("80", "2"), resting("90", "2")];
        let actions = calculate_orders(&modelled, &current, DELIVERY);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].price.inner(), dec!(80));
        assert_eq!(actions[0].quantity.inner(), dec!(-2));
    }

    #[test]
    fn test_output_sorted_by_price_without_zero_deltas() {
        let modelled = vec![level("110", "-1"), level("90", "2"), level("100", "1")];
        let current = vec![resting("100", "1"), resting("120", "-4")];
        let actions = calculate_orders(&modelled, &current, DELIVERY);

        let prices: Vec<_> = actions.iter().map(|a| a.price.inner()).collect();
        assert_eq!(prices, vec![dec!(90), dec!(110), dec!(120)]);
        assert!(actions.iter().all(|a| !a.quantity.is_zero()));
    }

    #[test]
    fn test_duplicate_modelled_prices_are_summed() {
        let modelled = vec![level("90", "1"), level("90", "2")];
        let actions = calculate_orders(&modelled, &[], DELIVERY);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].quantity.inner(), dec!(3));
    }
}
