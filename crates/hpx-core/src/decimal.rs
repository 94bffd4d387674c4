//! Precision-safe decimal types for quoting.
//!
//! Uses `rust_decimal` for exact decimal arithmetic, avoiding
//! floating-point rounding errors critical in financial calculations.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

/// Price with exact decimal precision.
///
/// Wraps `Decimal` to provide type safety and prevent mixing
/// prices with quantities in calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Round to the nearest multiple of `tick_size`, ties to even.
    ///
    /// Banker's rounding keeps the result deterministic when the raw price
    /// lands exactly between two ticks.
    #[inline]
    pub fn round_to_tick(&self, tick_size: Price) -> Self {
        if tick_size.is_zero() {
            return *self;
        }
        let ticks = (self.0 / tick_size.0)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
        Self(ticks * tick_size.0)
    }

    /// Whether this price is an exact multiple of `tick_size`.
    #[inline]
    pub fn is_tick_multiple(&self, tick_size: Price) -> bool {
        if tick_size.is_zero() {
            return false;
        }
        (self.0 % tick_size.0).is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<Decimal> for Price {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

/// Signed contract quantity with exact decimal precision.
///
/// Positive = long exposure (bid side), negative = short (ask side).
/// The sign convention runs through the whole pipeline: positions,
/// modelled ladder levels, resting orders and reconciliation deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Qty(pub Decimal);

impl Qty {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Notional value in currency units: |qty| is not taken, the sign
    /// carries through.
    #[inline]
    pub fn notional(&self, price: Price, contract_multiplier: Decimal) -> Decimal {
        self.0 * price.0 * contract_multiplier
    }
}

impl fmt::Display for Qty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Qty {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Qty {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Qty {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Qty {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Qty {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Qty {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_to_tick_nearest() {
        let tick = Price::new(dec!(0.25));

        assert_eq!(Price::new(dec!(100.30)).round_to_tick(tick).inner(), dec!(100.25));
        assert_eq!(Price::new(dec!(100.40)).round_to_tick(tick).inner(), dec!(100.50));
    }

    #[test]
    fn test_round_to_tick_ties_to_even() {
        let tick = Price::new(dec!(10));

        // 105 is exactly between 100 (10 ticks) and 110 (11 ticks):
        // 10 is even, so the tie resolves down.
        assert_eq!(Price::new(dec!(105)).round_to_tick(tick).inner(), dec!(100));
        // 115 is between 110 (11) and 120 (12): 12 is even, tie resolves up.
        assert_eq!(Price::new(dec!(115)).round_to_tick(tick).inner(), dec!(120));
    }

    #[test]
    fn test_round_to_tick_zero_tick_passthrough() {
        let p = Price::new(dec!(123.456));
        assert_eq!(p.round_to_tick(Price::ZERO), p);
    }

    #[test]
    fn test_is_tick_multiple() {
        let tick = Price::new(dec!(0.5));
        assert!(Price::new(dec!(101.5)).is_tick_multiple(tick));
        assert!(!Price::new(dec!(101.3)).is_tick_multiple(tick));
    }

    #[test]
    fn test_qty_sign_carries_through_notional() {
        let qty = Qty::new(dec!(-3));
        let notional = qty.notional(Price::new(dec!(50)), dec!(2));
        assert_eq!(notional, dec!(-300));
    }

    #[test]
    fn test_qty_neg_and_abs() {
        let qty = Qty::new(dec!(-2));
        assert_eq!((-qty).inner(), dec!(2));
        assert_eq!(qty.abs().inner(), dec!(2));
    }
}
