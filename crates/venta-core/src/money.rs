//! # Money Module
//!
//! Monetary values and fractional rates with integer arithmetic.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In the original spreadsheet-style flow:                            │
//! │    137.5 / 0.75 = 183.33333333333334  ❌ unbounded decimals         │
//! │                                                                     │
//! │  OUR SOLUTION: Integer Mils (thousandths of a currency unit)        │
//! │    The pricing rule rounds to 3 decimal places, so mils make        │
//! │    every derived price exact: 183.333 == 183_333 mils               │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! On the wire the backend speaks plain JSON numbers of currency units
//! (`5000`, `183.333`), so `Money` serializes as a decimal number and
//! converts to mils on the way in.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in mils (thousandths of the currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: allows negative values for discounts
/// - **mils, not cents**: derived prices round to 3 decimal places,
///   which mils represent exactly
/// - **wire format**: a plain JSON number of currency units
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from mils (thousandths of a currency unit).
    ///
    /// ```rust
    /// use venta_core::money::Money;
    ///
    /// let price = Money::from_mils(183_333); // 183.333
    /// assert_eq!(price.mils(), 183_333);
    /// ```
    #[inline]
    pub const fn from_mils(mils: i64) -> Self {
        Money(mils)
    }

    /// Creates a Money value from whole currency units.
    ///
    /// ```rust
    /// use venta_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(5000).mils(), 5_000_000);
    /// ```
    #[inline]
    pub const fn from_major(units: i64) -> Self {
        Money(units * 1000)
    }

    /// Returns the value in mils.
    #[inline]
    pub const fn mils(&self) -> i64 {
        self.0
    }

    /// Returns the value as a floating-point number of currency units.
    /// Only for serialization and display; all arithmetic stays integer.
    #[inline]
    pub fn to_units(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ```rust
    /// use venta_core::money::Money;
    ///
    /// let unit_price = Money::from_mils(183_333);
    /// assert_eq!(unit_price.multiply_quantity(3).mils(), 549_999);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Applies a fractional rate, rounding half-up to the nearest mil.
    ///
    /// Used for the iva amount: `iva × supplier_cost`.
    ///
    /// ```rust
    /// use venta_core::money::{Money, Rate};
    ///
    /// let cost = Money::from_major(100);
    /// let iva = Rate::from_bps(1200); // 12%
    /// assert_eq!(cost.apply_rate(iva), Money::from_major(12));
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        // i128 to prevent overflow on large amounts
        let mils = (self.0 as i128 * rate.bps() as i128 + 5_000) / 10_000;
        Money(mils as i64)
    }
}

/// Display shows currency units with three decimals, e.g. `183.333`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:03}", sign, (self.0 / 1000).abs(), (self.0 % 1000).abs())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

/// Serializes as a plain JSON number of currency units (`183.333`).
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Whole amounts stay integers on the wire (5000, not 5000.0)
        if self.0 % 1000 == 0 {
            serializer.serialize_i64(self.0 / 1000)
        } else {
            serializer.serialize_f64(self.to_units())
        }
    }
}

/// Deserializes from a JSON number of currency units, rounding half-up
/// to the nearest mil.
impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let units = f64::deserialize(deserializer)?;
        if !units.is_finite() {
            return Err(serde::de::Error::custom("monetary amount must be finite"));
        }
        Ok(Money((units * 1000.0).round() as i64))
    }
}

// =============================================================================
// Rate Type
// =============================================================================

/// A fractional rate (tax rate or margin) in basis points.
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so `2000` bps = the `0.2` fraction
/// the backend stores. Margins at or above 10000 bps make the pricing
/// divisor `1 − margin` zero or negative, which pricing rejects as a
/// configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a fraction (`0.2` → 2000 bps).
    pub fn from_fraction(fraction: f64) -> Self {
        Rate((fraction * 10_000.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a fraction (for serialization and display).
    #[inline]
    pub fn fraction(&self) -> f64 {
        self.0 as f64 / 10_000.0
    }

    /// True when the rate is 100% or more. A margin this large makes
    /// `1 − margin` a zero or negative divisor.
    #[inline]
    pub const fn is_unit_or_more(&self) -> bool {
        self.0 >= 10_000
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fraction())
    }
}

/// Serializes as the fraction the backend stores (`0.12`).
impl Serialize for Rate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.fraction())
    }
}

impl<'de> Deserialize<'de> for Rate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fraction = f64::deserialize(deserializer)?;
        if !fraction.is_finite() || fraction < 0.0 {
            return Err(serde::de::Error::custom(
                "rate must be a finite, non-negative fraction",
            ));
        }
        Ok(Rate::from_fraction(fraction))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
