//! # Money Module
//!
//! Fixed-point money and quantity types for the snack stand.
//!
//! ## Why Fixed Point?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In floating point:                                                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  Summing thousands of purchase lines must not drift by fractions    │
//! │  of a satang over many operations.                                  │
//! │                                                                     │
//! │  OUR SOLUTION: Integer Hundredths                                   │
//! │    7.50 THB is stored as 750. Every accumulation is exact; the      │
//! │    only rounding happens once, at the JSON boundary.                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The wire format is plain JSON decimals (the original client speaks
//! `{"price": 7.5}`), so both types serialize as `f64` rounded to two
//! decimal places and deserialize by rounding back into hundredths.
//! Non-finite input becomes zero.
//!
//! Quantities get their own type: stock of bulk items is fractional (half a
//! bag of rice crackers is a real sale), so `Qty` carries two decimals too.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Rounds an integer product of two hundredths values back to hundredths,
/// half away from zero.
const fn round_hundredths(n: i64) -> i64 {
    if n >= 0 {
        (n + 50) / 100
    } else {
        (n - 50) / 100
    }
}

fn f64_to_hundredths(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    (value * 100.0).round() as i64
}

// =============================================================================
// Money
// =============================================================================

/// A monetary value in integer hundredths (satang).
///
/// Signed: the sanitizer deliberately preserves negative inputs so the
/// validator can reject them with an itemized message instead of silently
/// clamping a broken state blob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Creates a value from integer hundredths (750 is 7.50 THB).
    #[inline]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Money(hundredths)
    }

    /// Creates a value from a JSON decimal, rounding to two places.
    /// Non-finite input becomes zero.
    #[inline]
    pub fn from_f64(value: f64) -> Self {
        Money(f64_to_hundredths(value))
    }

    /// The raw hundredths, for persistence.
    #[inline]
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    /// The value as a decimal, for the JSON boundary only.
    #[inline]
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negatives to zero. Used on the lenient paths (snack-only
    /// upsert, read-side hydration) where no validator runs.
    #[inline]
    pub const fn clamp_non_negative(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Multiplies a unit price by a quantity, rounding the product back to
    /// hundredths. `2.00 × 7.00 THB = 14.00 THB` exactly.
    #[inline]
    pub const fn mul_qty(self, qty: Qty) -> Money {
        Money(round_hundredths(self.0 * qty.hundredths()))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
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

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(Money::from_f64(value))
    }
}

// =============================================================================
// Qty
// =============================================================================

/// A quantity in integer hundredths. Fractional quantities are allowed for
/// bulk items (0.50 of a bag), so quantities round exactly like money.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Qty(i64);

impl Qty {
    /// One whole unit.
    pub const ONE: Qty = Qty(100);

    /// The smallest sellable quantity (0.01).
    pub const MIN_SALE: Qty = Qty(1);

    #[inline]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Qty(hundredths)
    }

    #[inline]
    pub fn from_f64(value: f64) -> Self {
        Qty(f64_to_hundredths(value))
    }

    #[inline]
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    #[inline]
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Qty(0)
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn clamp_non_negative(self) -> Self {
        if self.0 < 0 {
            Qty(0)
        } else {
            self
        }
    }

    #[inline]
    pub const fn max(self, other: Qty) -> Qty {
        if self.0 >= other.0 {
            self
        } else {
            other
        }
    }
}

impl Add for Qty {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Qty(self.0 + other.0)
    }
}

impl AddAssign for Qty {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl fmt::Display for Qty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Serialize for Qty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Qty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(Qty::from_f64(value))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
