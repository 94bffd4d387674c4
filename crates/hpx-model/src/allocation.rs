//! Quoting budget allocation.
//!
//! Splits the total quoting budget between bid and ask sides, skewed by
//! the current inventory, then tapers each side budget across the price
//! levels with a geometric decay so that most of the liquidity rests near
//! the touch.

use hpx_core::Qty;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Decimal places kept when truncating per-level allocations. Matches the
/// collateral asset's precision, so allocations are representable amounts.
const ALLOCATION_SCALE: u32 = 6;

/// Per-side budgets together with the skew factors that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideBudgets {
    pub bid_skew: Decimal,
    pub ask_skew: Decimal,
    pub bid_budget: Decimal,
    pub ask_budget: Decimal,
}

/// Inventory as a fraction of the configured maximum, clamped to [-1, 1].
///
/// A non-positive maximum disables the skew (returns 0).
pub fn normalized_inventory(position_qty: Qty, max_position: Decimal) -> Decimal {
    if max_position <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (position_qty.inner() / max_position)
        .max(dec!(-1))
        .min(dec!(1))
}

/// Split the total budget between bid and ask sides.
///
/// At zero inventory both skews are 1 (an even split). Approaching the long
/// limit the bid skew falls to 0 (stop adding to the long) while the ask
/// skew stays at 1 (keep offering to reduce); symmetric for shorts.
pub fn side_budgets(total_budget: Decimal, normalized_inventory: Decimal) -> SideBudgets {
    let bid_skew = (Decimal::ONE - normalized_inventory.max(Decimal::ZERO)).max(Decimal::ZERO);
    let ask_skew = (Decimal::ONE + normalized_inventory.min(Decimal::ZERO)).max(Decimal::ZERO);

    let half = total_budget / Decimal::TWO;
    SideBudgets {
        bid_skew,
        ask_skew,
        bid_budget: half * bid_skew,
        ask_budget: half * ask_skew,
    }
}

/// Distribute a side budget across `levels` price levels with geometric
/// decay `ratio` from the near-touch level outward.
///
/// Level `i` receives weight `ratio^i`. Outer-level shares are truncated to
/// the allocation scale and the rounding remainder is assigned to level 0,
/// so the allocations always sum exactly to the budget.
///
/// A non-positive budget or zero level count yields an empty vector.
pub fn geometric_taper(budget: Decimal, levels: u32, ratio: Decimal) -> Vec<Decimal> {
    if budget <= Decimal::ZERO || levels == 0 {
        return Vec::new();
    }
    if levels == 1 {
        return vec![budget];
    }

    let mut weights = Vec::with_capacity(levels as usize);
    let mut weight = Decimal::ONE;
    for _ in 0..levels {
        weights.push(weight);
        weight *= ratio;
    }
    let total_weight: Decimal = weights.iter().sum();

    let mut allocations = vec![Decimal::ZERO; levels as usize];
    let mut outer_sum = Decimal::ZERO;
    for (i, w) in weights.iter().copied().enumerate().skip(1) {
        let share = (budget * w / total_weight)
            .round_dp_with_strategy(ALLOCATION_SCALE, RoundingStrategy::ToZero);
        allocations[i] = share;
        outer_sum += share;
    }
    allocations[0] = budget - outer_sum;

    allocations
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalized_inventory_clamped() {
        assert_eq!(normalized_inventory(Qty::new(dec!(5)), dec!(10)), dec!(0.5));
        assert_eq!(normalized_inventory(Qty::new(dec!(20)), dec!(10)), dec!(1));
        assert_eq!(normalized_inventory(Qty::new(dec!(-20)), dec!(10)), dec!(-1));
        assert_eq!(normalized_inventory(Qty::new(dec!(5)), dec!(0)), dec!(0));
    }

    #[test]
    fn test_skews_at_zero_inventory() {
        let b = side_budgets(dec!(1000), dec!(0));
        assert_eq!(b.bid_skew, dec!(1));
        assert_eq!(b.ask_skew, dec!(1));
        assert_eq!(b.bid_budget, dec!(500));
        assert_eq!(b.ask_budget, dec!(500));
    }

    #[test]
    fn test_skews_at_long_limit() {
        let b = side_budgets(dec!(1000), dec!(1));
        assert_eq!(b.bid_skew, dec!(0));
        assert_eq!(b.ask_skew, dec!(1));
        assert_eq!(b.bid_budget, dec!(0));
        assert_eq!(b.ask_budget, dec!(500));
    }

    #[test]
    fn test_skews_at_short_limit() {
        let b = side_budgets(dec!(1000), dec!(-1));
        assert_eq!(b.bid_skew, dec!(1));
        assert_eq!(b.ask_skew, dec!(0));
    }

    #[test]
    fn test_skew_symmetry_across_range() {
        // bid_skew(x) + ask_skew(x) == bid_skew(-x) + ask_skew(-x), both in [0, 2]
        for i in -10..=10 {
            let x = Decimal::from(i) / dec!(10);
            let pos = side_budgets(dec!(100), x);
            let neg = side_budgets(dec!(100), -x);
            assert_eq!(pos.bid_skew + pos.ask_skew, neg.bid_skew + neg.ask_skew);
            assert!(pos.bid_skew >= dec!(0) && pos.bid_skew <= dec!(2));
            assert!(pos.ask_skew >= dec!(0) && pos.ask_skew <= dec!(2));
        }
    }

    #[test]
    fn test_taper_sums_exactly() {
        for levels in 1..=8u32 {
            let allocations = geometric_taper(dec!(1000), levels, dec!(0.7));
            let sum: Decimal = allocations.iter().sum();
            assert_eq!(sum, dec!(1000), "levels={levels}");
        }
    }

    #[test]
    fn test_taper_sums_exactly_awkward_budget() {
        let allocations = geometric_taper(dec!(333.333333), 5, dec!(0.61));
        let sum: Decimal = allocations.iter().sum();
        assert_eq!(sum, dec!(333.333333));
    }

    #[test]
    fn test_taper_strictly_decreasing() {
        let allocations = geometric_taper(dec!(1000), 4, dec!(0.7));
        assert_eq!(allocations.len(), 4);
        for pair in allocations.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }

    #[test]
    fn test_taper_empty_on_degenerate_input() {
        assert!(geometric_taper(dec!(0), 4, dec!(0.7)).is_empty());
        assert!(geometric_taper(dec!(-5), 4, dec!(0.7)).is_empty());
        assert!(geometric_taper(dec!(1000), 0, dec!(0.7)).is_empty());
    }

    #[test]
    fn test_taper_single_level_gets_everything() {
        assert_eq!(geometric_taper(dec!(123.45), 1, dec!(0.7)), vec![dec!(123.45)]);
    }

    #[test]
    fn test_taper_remainder_lands_near_touch() {
        // A budget that does not divide evenly: level 0 absorbs the
        // truncation remainder, so it exceeds its exact geometric share.
        let budget = dec!(100);
        let ratio = dec!(0.5);
        let allocations = geometric_taper(budget, 3, ratio);
        // exact shares: 100 * (1, 0.5, 0.25) / 1.75 = 57.142857.., 28.57.., 14.28..
        assert!(allocations[0] > dec!(57.142857));
        let sum: Decimal = allocations.iter().sum();
        assert_eq!(sum, budget);
    }
}
