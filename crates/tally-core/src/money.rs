//! # Money Module
//!
//! Fixed-point monetary values in integer minor units (cents).
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In a naive bill splitter:                                              │
//! │    $10.00 / 3 = $3.33 (×3 = $9.99)  → Lost $0.01!                       │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    1000 cents / 3 = 333 cents, remainder 1                              │
//! │    The split engine hands the leftover cent to a specific person        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Floating point appears only at the parse/format boundary
//! ([`Money::from_float`], [`Money::from_decimal_str`]) where the value is
//! immediately quantized to minor units with round-half-up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::error::MoneyError;
use crate::MAX_AMOUNT_MINOR;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate results may go negative and the engine
///   needs to detect that, even though bill inputs are non-negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **No currency field**: a bill carries exactly one currency, so every
///   `Money` inside it shares the bill's currency (multi-currency bills are
///   a non-goal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (cents).
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_minor(1099); // $10.99
    /// assert_eq!(price.minor(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Parses a decimal string ("12.50", "12,50", "12") into minor units.
    ///
    /// Quantizes to two fraction digits with round-half-up: `"2.675"`
    /// becomes 268 minor units. A comma decimal separator is accepted
    /// because receipt text and RU-locale inputs use it.
    ///
    /// ## Errors
    /// [`MoneyError::Malformed`] for anything that isn't a plain decimal
    /// number, [`MoneyError::TooLarge`] past [`MAX_AMOUNT_MINOR`].
    pub fn from_decimal_str(input: &str) -> Result<Self, MoneyError> {
        let trimmed = input.trim().replace(',', ".");
        let malformed = || MoneyError::Malformed(input.trim().to_string());

        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(&trimmed)),
        };

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(malformed());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }

        let major: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| MoneyError::TooLarge)?
        };

        // Quantize the fraction to two digits, round-half-up on the third.
        let mut frac_digits = frac_part.bytes().map(|b| i64::from(b - b'0'));
        let mut cents =
            frac_digits.next().unwrap_or(0) * 10 + frac_digits.next().unwrap_or(0);
        if frac_digits.next().unwrap_or(0) >= 5 {
            cents += 1;
        }

        let minor = major
            .checked_mul(100)
            .and_then(|m| m.checked_add(cents))
            .ok_or(MoneyError::TooLarge)?;
        if minor > MAX_AMOUNT_MINOR {
            return Err(MoneyError::TooLarge);
        }

        Ok(Money(if negative { -minor } else { minor }))
    }

    /// Quantizes a float to minor units with round-half-up.
    ///
    /// Only for input boundaries (JSON bodies, extractor output) — the
    /// value never stays a float past this call.
    ///
    /// ## Errors
    /// [`MoneyError::NotFinite`] for NaN/infinity, [`MoneyError::TooLarge`]
    /// past the overflow guard.
    pub fn from_float(value: f64) -> Result<Self, MoneyError> {
        if !value.is_finite() {
            return Err(MoneyError::NotFinite);
        }
        let minor = (value * 100.0).round();
        if minor.abs() > MAX_AMOUNT_MINOR as f64 {
            return Err(MoneyError::TooLarge);
        }
        Ok(Money(minor as i64))
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (dollars for USD).
    #[inline]
    pub const fn major_part(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion as an absolute value (0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a quantity (line total = unit price × quantity).
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(299); // $2.99
    /// assert_eq!(unit_price.multiply_quantity(3).minor(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Scales by a rational share, truncating toward zero.
    ///
    /// Used for proportional tip shares. Truncation is deliberate: the
    /// engine's remainder-distribution step hands out the leftover minor
    /// units explicitly, so no rounding may happen here.
    ///
    /// `denominator` must be non-zero; all engine call sites check their
    /// divisor before calling.
    #[inline]
    pub fn mul_rational(&self, numerator: i64, denominator: i64) -> Self {
        debug_assert!(denominator != 0, "mul_rational divisor must be non-zero");
        let scaled = self.0 as i128 * numerator as i128 / denominator as i128;
        Money(scaled as i64)
    }

    /// Applies a percentage expressed in basis points, round-half-up.
    ///
    /// 1 basis point = 0.01%, so 1000 bps = 10%. Uses i128 to prevent
    /// overflow on large amounts; the `+5000` provides the half-up rounding
    /// (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let subtotal = Money::from_minor(1000); // $10.00
    /// assert_eq!(subtotal.percentage_bps(1000).minor(), 100); // 10% tip
    /// ```
    pub fn percentage_bps(&self, bps: u32) -> Money {
        let scaled = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money(scaled as i64)
    }

    /// Formats the amount with a currency symbol.
    ///
    /// Prefix symbols render as `$10.99`, suffix symbols as `10.99 ₽`.
    pub fn display_with(&self, currency: &Currency) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = format!("{}.{:02}", self.major_part().abs(), self.minor_part());
        if currency.symbol_is_prefix() {
            format!("{}{}{}", sign, currency.symbol(), magnitude)
        } else {
            format!("{}{} {}", sign, magnitude, currency.symbol())
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a debug-friendly `$` format.
///
/// Use [`Money::display_with`] for currency-aware display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major_part().abs(), self.minor_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
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

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Currency
// =============================================================================

/// Currency code shared by every Money value in a bill.
///
/// Stored as an upper-cased code ("USD", "RUB", ...). Known codes get a
/// display symbol; anything else renders as the code itself. Conversion
/// between currencies is a non-goal — a bill has exactly one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Currency(String);

impl Currency {
    /// Creates a currency from a code, normalizing to upper case.
    /// Blank input falls back to the default (USD).
    pub fn new(code: &str) -> Self {
        let code = code.trim();
        if code.is_empty() {
            return Currency::default();
        }
        Currency(code.to_uppercase())
    }

    /// Returns the normalized currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Returns the display symbol for known currencies, the code otherwise.
    pub fn symbol(&self) -> &str {
        match self.0.as_str() {
            "USD" => "$",
            "EUR" => "€",
            "GBP" => "£",
            "RUB" => "₽",
            other => other,
        }
    }

    /// Whether the symbol goes before the amount (`$10.99`) or after
    /// (`10.99 ₽`).
    pub fn symbol_is_prefix(&self) -> bool {
        matches!(self.0.as_str(), "USD" | "EUR" | "GBP")
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency("USD".to_string())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(1099);
        assert_eq!(money.minor(), 1099);
        assert_eq!(money.major_part(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_from_decimal_str() {
        assert_eq!(Money::from_decimal_str("10.99").unwrap().minor(), 1099);
        assert_eq!(Money::from_decimal_str("10,99").unwrap().minor(), 1099);
        assert_eq!(Money::from_decimal_str("10").unwrap().minor(), 1000);
        assert_eq!(Money::from_decimal_str("0.5").unwrap().minor(), 50);
        assert_eq!(Money::from_decimal_str(".75").unwrap().minor(), 75);
        assert_eq!(Money::from_decimal_str("-5.50").unwrap().minor(), -550);
    }

    #[test]
    fn test_from_decimal_str_rounds_half_up() {
        assert_eq!(Money::from_decimal_str("2.675").unwrap().minor(), 268);
        assert_eq!(Money::from_decimal_str("2.674").unwrap().minor(), 267);
        assert_eq!(Money::from_decimal_str("0.005").unwrap().minor(), 1);
        assert_eq!(Money::from_decimal_str("0.0049").unwrap().minor(), 0);
    }

    #[test]
    fn test_from_decimal_str_rejects_garbage() {
        assert!(Money::from_decimal_str("").is_err());
        assert!(Money::from_decimal_str("abc").is_err());
        assert!(Money::from_decimal_str("10.9.9").is_err());
        assert!(Money::from_decimal_str("10 99").is_err());
        assert!(Money::from_decimal_str("999999999999999999999").is_err());
    }

    #[test]
    fn test_from_float() {
        assert_eq!(Money::from_float(10.99).unwrap().minor(), 1099);
        assert_eq!(Money::from_float(0.1 + 0.2).unwrap().minor(), 30);
        assert!(Money::from_float(f64::NAN).is_err());
        assert!(Money::from_float(f64::INFINITY).is_err());
        assert!(Money::from_float(1e18).is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((a * 3).minor(), 3000);
        assert_eq!(a.multiply_quantity(4).minor(), 4000);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 7].iter().map(|&m| Money::from_minor(m)).sum();
        assert_eq!(total.minor(), 357);
    }

    #[test]
    fn test_mul_rational_truncates_toward_zero() {
        // $10.00 × 1/3 = 333 minor units, remainder discarded here —
        // the engine hands out leftover cents itself.
        let ten = Money::from_minor(1000);
        assert_eq!(ten.mul_rational(1, 3).minor(), 333);
        assert_eq!(ten.mul_rational(2, 3).minor(), 666);
    }

    #[test]
    fn test_percentage_bps_rounds_half_up() {
        // $10.00 at 10% = $1.00
        assert_eq!(Money::from_minor(1000).percentage_bps(1000).minor(), 100);
        // $10.00 at 8.25% = $0.825 → $0.83
        assert_eq!(Money::from_minor(1000).percentage_bps(825).minor(), 83);
        // $0.05 at 10% = $0.005 → $0.01
        assert_eq!(Money::from_minor(5).percentage_bps(1000).minor(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_minor(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_minor(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_minor(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_minor(0)), "$0.00");
    }

    #[test]
    fn test_display_with_currency() {
        let amount = Money::from_minor(1050);
        assert_eq!(amount.display_with(&Currency::new("USD")), "$10.50");
        assert_eq!(amount.display_with(&Currency::new("RUB")), "10.50 ₽");
        assert_eq!(amount.display_with(&Currency::new("CHF")), "10.50 CHF");
    }

    #[test]
    fn test_currency_normalization() {
        assert_eq!(Currency::new("usd").code(), "USD");
        assert_eq!(Currency::new("  eur ").symbol(), "€");
        assert_eq!(Currency::new("").code(), "USD");
    }

    /// Documents why the engine owns remainder handling: equal division of
    /// minor units is not exact, and the lost cent must go to someone.
    #[test]
    fn test_division_precision_loss_documented() {
        let ten = Money::from_minor(1000);
        let one_third = ten.mul_rational(1, 3);
        let reconstructed = one_third * 3;

        assert_eq!(reconstructed.minor(), 999);
        assert_eq!((ten - reconstructed).minor(), 1);
    }
}
