//! # Money Module
//!
//! Provides the `Money` and `Rate` types for handling monetary values and
//! percentages safely, plus the single place where locale-formatted
//! currency strings are parsed and rendered.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  The backend renders prices as locale strings ("65.266,80") and the    │
//! │  legacy front end re-parsed them with scattered regexes at every call  │
//! │  site, accumulating float error along the way.                         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + one parsing boundary                    │
//! │    "65.266,80" ──parse──► Money(6526680) ──math──► exact               │
//! │    Rounding happens in exactly one place, with a known rule            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mostrador_core::money::{Locale, Money, Rate};
//!
//! // Parse a backend price string (es-AR locale: "." thousands, "," decimal)
//! let price = Money::parse("65.266,80", Locale::EsAr).unwrap();
//! assert_eq!(price.cents(), 6_526_680);
//!
//! // Percentages are basis points (2100 = 21%)
//! let tax = price.apply_rate(Rate::from_percent(21.0));
//! assert_eq!(tax.cents(), 1_370_603);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::quantity::Quantity;

// =============================================================================
// Locale
// =============================================================================

/// Decimal/thousands separator convention for currency strings.
///
/// The backend renders prices the es-AR way ("1.234,56"); raw numeric
/// strings ("1234.56") appear in a few older payloads. Every parse and
/// format call names its locale explicitly so the numeric core stays
/// locale-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    /// "." as thousands separator, "," as decimal separator.
    EsAr,
    /// Plain machine format: "." as decimal separator, no grouping.
    Plain,
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in integer cents (smallest currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for per-line discounts
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
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

    /// Clamps negative values to zero.
    ///
    /// Grand totals and remaining balances never go below zero, no matter
    /// how large the discount or the payments entered.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Multiplies a unit price by a decimal quantity, rounding half-up
    /// to the nearest cent.
    ///
    /// ## Example
    /// ```rust
    /// use mostrador_core::money::Money;
    /// use mostrador_core::quantity::Quantity;
    ///
    /// let unit = Money::from_cents(10_000); // $100.00
    /// let qty = Quantity::from_f64(7.2);
    /// assert_eq!(unit.mul_quantity(qty).cents(), 72_000); // $720.00
    /// ```
    pub fn mul_quantity(&self, qty: Quantity) -> Money {
        // quantity is fixed-point hundredths: cents * hundredths / 100
        let raw = self.0 as i128 * qty.hundredths() as i128;
        Money(div_round_half_up(raw, 100) as i64)
    }

    /// Applies a rate (tax, discount percentage, surcharge), rounding
    /// half-up to the nearest cent.
    ///
    /// ## Implementation
    /// Integer math: `(cents * bps + 5000) / 10000`
    pub fn apply_rate(&self, rate: Rate) -> Money {
        // i128 to prevent overflow on large amounts
        let raw = self.0 as i128 * rate.bps() as i128;
        Money(div_round_half_up(raw, 10_000) as i64)
    }

    /// Returns the amount grossed up by a surcharge rate.
    ///
    /// A $100.00 payment with a 10% surcharge contributes $110.00
    /// toward the cart total.
    pub fn with_surcharge(&self, rate: Rate) -> Money {
        *self + self.apply_rate(rate)
    }

    /// Parses a currency string under the given locale.
    ///
    /// Currency symbols, spaces and any other non-numeric decoration are
    /// ignored; only digits, separators and a leading sign survive.
    ///
    /// ## Example
    /// ```rust
    /// use mostrador_core::money::{Locale, Money};
    ///
    /// assert_eq!(Money::parse("$ 1.234,56", Locale::EsAr).unwrap().cents(), 123_456);
    /// assert_eq!(Money::parse("1234.56", Locale::Plain).unwrap().cents(), 123_456);
    /// ```
    pub fn parse(value: &str, locale: Locale) -> CoreResult<Money> {
        let mut cleaned: String = value
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',' || *c == '-')
            .collect();

        if let Locale::EsAr = locale {
            // "1.234,56" → "1234.56"
            cleaned = cleaned.replace('.', "").replace(',', ".");
        }

        if cleaned.is_empty() || cleaned == "-" {
            return Err(CoreError::MoneyParse(value.to_string()));
        }

        let number: f64 = cleaned
            .parse()
            .map_err(|_| CoreError::MoneyParse(value.to_string()))?;
        if !number.is_finite() {
            return Err(CoreError::MoneyParse(value.to_string()));
        }

        Ok(Money((number * 100.0).round() as i64))
    }

    /// Parses a currency string, falling back to zero on malformed input.
    ///
    /// The legacy front end treated unparseable prices as zero rather
    /// than crashing the catalog; the boundary that ingests backend
    /// payloads keeps that behavior (and logs the value upstream).
    pub fn parse_or_zero(value: &str, locale: Locale) -> Money {
        Money::parse(value, locale).unwrap_or_else(|_| Money::zero())
    }

    /// Formats the amount under the given locale, always with two
    /// decimal places ("1.234,56" / "1234.56").
    pub fn format(&self, locale: Locale) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        let int_part = abs / 100;
        let frac = abs % 100;

        match locale {
            Locale::EsAr => {
                let grouped = group_thousands(int_part, '.');
                format!("{sign}{grouped},{frac:02}")
            }
            Locale::Plain => format!("{sign}{int_part}.{frac:02}"),
        }
    }
}

/// Divides with round-half-up, correct for negative numerators too.
fn div_round_half_up(numerator: i128, denominator: i128) -> i128 {
    if numerator >= 0 {
        (numerator + denominator / 2) / denominator
    } else {
        -((-numerator + denominator / 2) / denominator)
    }
}

/// Inserts a grouping separator every three digits.
fn group_thousands(mut value: i64, separator: char) -> String {
    let mut groups = Vec::new();
    loop {
        let group = value % 1000;
        value /= 1000;
        if value == 0 {
            groups.push(group.to_string());
            break;
        }
        groups.push(format!("{group:03}"));
    }
    groups.reverse();
    groups.join(&separator.to_string())
}

/// Debug-friendly display. UI formatting goes through `Money::format`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.0.abs() / 100, self.0.abs() % 100)
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

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Rate Type
// =============================================================================

/// A percentage expressed in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000, so 2100 bps = 21% (IVA general) and
/// 1050 bps = 10.5% (IVA reducido). Tax rates, discount percentages and
/// payment surcharges all use this type.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage (21.0 → 2100 bps).
    ///
    /// Negative inputs collapse to zero; the callers that accept user
    /// percentages clamp before reaching this point anyway.
    pub fn from_percent(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return Rate(0);
        }
        Rate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Clamps the rate to at most 100% (10000 bps).
    ///
    /// Discount percentages are capped at 100; tax and surcharge rates
    /// are never clamped.
    #[inline]
    pub const fn clamp_percent(&self) -> Self {
        if self.0 > 10_000 {
            Rate(10_000)
        } else {
            *self
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_es_ar() {
        assert_eq!(Money::parse("65.266,80", Locale::EsAr).unwrap().cents(), 6_526_680);
        assert_eq!(Money::parse("$ 1.234,56", Locale::EsAr).unwrap().cents(), 123_456);
        assert_eq!(Money::parse("0,50", Locale::EsAr).unwrap().cents(), 50);
        assert_eq!(Money::parse("999", Locale::EsAr).unwrap().cents(), 99_900);
    }

    #[test]
    fn test_parse_plain() {
        assert_eq!(Money::parse("1234.56", Locale::Plain).unwrap().cents(), 123_456);
        assert_eq!(Money::parse("8999.00", Locale::Plain).unwrap().cents(), 899_900);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("", Locale::EsAr).is_err());
        assert!(Money::parse("precio", Locale::EsAr).is_err());
        assert_eq!(Money::parse_or_zero("n/a", Locale::EsAr).cents(), 0);
    }

    #[test]
    fn test_format_es_ar_round_trips() {
        let m = Money::from_cents(6_526_680);
        assert_eq!(m.format(Locale::EsAr), "65.266,80");
        assert_eq!(Money::parse(&m.format(Locale::EsAr), Locale::EsAr).unwrap(), m);

        assert_eq!(Money::from_cents(50).format(Locale::EsAr), "0,50");
        assert_eq!(Money::from_cents(-123_456).format(Locale::EsAr), "-1.234,56");
    }

    #[test]
    fn test_apply_rate() {
        // $300.00 at 21% = $63.00
        let subtotal = Money::from_cents(30_000);
        assert_eq!(subtotal.apply_rate(Rate::from_percent(21.0)).cents(), 6_300);

        // 10.5% on $89.99 = $9.4490 → $9.45 (half-up)
        let amount = Money::from_cents(8_999);
        assert_eq!(amount.apply_rate(Rate::from_percent(10.5)).cents(), 945);
    }

    #[test]
    fn test_with_surcharge() {
        // $100.00 with 10% surcharge contributes $110.00
        let payment = Money::from_cents(10_000);
        assert_eq!(payment.with_surcharge(Rate::from_percent(10.0)).cents(), 11_000);
        // zero surcharge is identity
        assert_eq!(payment.with_surcharge(Rate::zero()), payment);
    }

    #[test]
    fn test_mul_quantity() {
        let unit = Money::from_cents(10_000);
        assert_eq!(unit.mul_quantity(Quantity::from_f64(3.0)).cents(), 30_000);
        // 2.4 m² at $10.99 = $26.376 → $26.38
        let unit = Money::from_cents(1_099);
        assert_eq!(unit.mul_quantity(Quantity::from_f64(2.4)).cents(), 2_638);
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(Money::from_cents(-500).clamp_non_negative().cents(), 0);
        assert_eq!(Money::from_cents(500).clamp_non_negative().cents(), 500);
    }

    #[test]
    fn test_rate_from_percent() {
        assert_eq!(Rate::from_percent(21.0).bps(), 2_100);
        assert_eq!(Rate::from_percent(10.5).bps(), 1_050);
        assert_eq!(Rate::from_percent(-5.0).bps(), 0);
        assert_eq!(Rate::from_percent(150.0).clamp_percent().bps(), 10_000);
    }
}
