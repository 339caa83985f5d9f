//! # Quantity Normalization
//!
//! Products sell in multiples of a sale unit: a box of porcelain tiles
//! covers 2.4 m², so a request for 5 m² must become 7.2 m² (3 boxes).
//! This module owns that rounding rule and the display derivations that
//! go with it.
//!
//! Quantities are fixed-point hundredths (i64), the same idea as integer
//! cents for money: "round to two decimals" is the representation itself,
//! and the multiple check is exact integer arithmetic instead of a
//! floating-point tolerance.
//!
//! ## The Ceiling Rule
//! ```text
//! requested 5.00, multiple 2.40
//!      │
//!      ▼
//! 5.00 % 2.40 != 0  →  ceil(5.00 / 2.40) = 3  →  3 × 2.40 = 7.20
//! ```
//! Rounding always goes UP: under-ordering a boxed unit is not
//! fulfillable. A multiple of 1 accepts any positive two-decimal value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};
use ts_rs::TS;

// =============================================================================
// Quantity Type
// =============================================================================

/// A product quantity in fixed-point hundredths.
///
/// `Quantity(720)` is 7.20 units. Sale multiples use the same type:
/// `Quantity(240)` is a 2.4 m² box.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Quantity(i64);

impl Quantity {
    /// One unit (1.00).
    pub const ONE: Quantity = Quantity(100);

    /// Creates a quantity from raw hundredths.
    #[inline]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Quantity(hundredths)
    }

    /// Creates a quantity from a float, rounding to two decimals.
    ///
    /// This is the entry point for user keyboard input and backend
    /// payloads that carry quantities as JSON numbers.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Quantity(0);
        }
        Quantity((value * 100.0).round() as i64)
    }

    /// Returns the raw hundredths.
    #[inline]
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    /// Returns the quantity as a float (display/export only).
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero quantity.
    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    /// Checks if the quantity is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl std::iter::Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Quantity {
        iter.fold(Quantity::zero(), |acc, q| acc + q)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, (self.0 % 100).abs())
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// Sanitizes a raw sale multiple: absent, NaN or non-positive values
/// fall back to 1.
pub fn sanitize_multiple(raw: Option<f64>) -> Quantity {
    match raw {
        Some(v) if v.is_finite() && v > 0.0 => {
            let q = Quantity::from_f64(v);
            if q.is_positive() {
                q
            } else {
                Quantity::ONE
            }
        }
        _ => Quantity::ONE,
    }
}

/// Rounds a requested quantity up to the nearest multiple of the sale
/// unit.
///
/// ## Contract
/// - multiple ≤ 0 is treated as 1
/// - multiple == 1: any positive value is returned unchanged
/// - already a clean multiple: returned unchanged
/// - otherwise: ceiling to the next full multiple
/// - never returns zero or negative; a non-positive request falls back
///   to the multiple itself (defensive default for malformed input, not
///   a business rule)
///
/// ## Example
/// ```rust
/// use mostrador_core::quantity::{normalize, Quantity};
///
/// let multiple = Quantity::from_f64(2.4);
/// assert_eq!(normalize(multiple, Quantity::from_f64(5.0)), Quantity::from_f64(7.2));
/// assert_eq!(normalize(multiple, Quantity::from_f64(7.2)), Quantity::from_f64(7.2));
/// ```
pub fn normalize(multiple: Quantity, requested: Quantity) -> Quantity {
    let multiple = if multiple.is_positive() {
        multiple
    } else {
        Quantity::ONE
    };

    if !requested.is_positive() {
        return multiple;
    }
    if multiple == Quantity::ONE {
        return requested;
    }
    if requested.hundredths() % multiple.hundredths() == 0 {
        return requested;
    }

    let steps = (requested.hundredths() + multiple.hundredths() - 1) / multiple.hundredths();
    Quantity::from_hundredths(steps * multiple.hundredths())
}

// =============================================================================
// Display Derivations
// =============================================================================

/// Checks whether a unit of measure denotes an area unit.
///
/// Matches "m2", "m²" and "m^2", case-insensitively. Area units change
/// quantity rendering from integer counts to two decimals; the stored
/// quantity is always the normalized value either way.
pub fn is_area_unit(unit: &str) -> bool {
    matches!(
        unit.trim().to_lowercase().as_str(),
        "m2" | "m²" | "m^2"
    )
}

/// Renders a quantity for display: two decimals for area units, an
/// integer count otherwise.
pub fn format_quantity(qty: Quantity, unit: &str) -> String {
    if is_area_unit(unit) {
        qty.to_string()
    } else {
        format!("{}", (qty.as_f64()).round() as i64)
    }
}

/// Number of sale units ("boxes") equivalent to an area quantity.
///
/// Only meaningful for area units; returns `None` for anything else.
/// 7.2 m² at a 2.4 m² multiple is 3 boxes.
pub fn equivalent_boxes(qty: Quantity, multiple: Quantity, unit: &str) -> Option<i64> {
    if !is_area_unit(unit) {
        return None;
    }
    let multiple = if multiple.is_positive() {
        multiple
    } else {
        Quantity::ONE
    };
    Some((qty.hundredths() as f64 / multiple.hundredths() as f64).round() as i64)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn q(v: f64) -> Quantity {
        Quantity::from_f64(v)
    }

    #[test]
    fn test_ceiling_to_multiple() {
        // 5 m² in 2.4 m² boxes → 3 boxes → 7.2 m²
        assert_eq!(normalize(q(2.4), q(5.0)), q(7.2));
        // clean multiples pass through
        assert_eq!(normalize(q(2.4), q(7.2)), q(7.2));
        assert_eq!(normalize(q(2.4), q(2.4)), q(2.4));
        // just above a multiple rounds up a full step
        assert_eq!(normalize(q(2.4), q(7.21)), q(9.6));
    }

    #[test]
    fn test_multiple_of_one_accepts_anything_positive() {
        assert_eq!(normalize(Quantity::ONE, q(0.01)), q(0.01));
        assert_eq!(normalize(Quantity::ONE, q(3.5)), q(3.5));
        assert_eq!(normalize(Quantity::ONE, q(17.0)), q(17.0));
    }

    #[test]
    fn test_defensive_fallbacks() {
        // invalid multiple behaves as 1
        assert_eq!(normalize(q(0.0), q(3.0)), q(3.0));
        assert_eq!(normalize(q(-2.0), q(3.0)), q(3.0));
        // non-positive request falls back to the multiple
        assert_eq!(normalize(q(2.4), q(0.0)), q(2.4));
        assert_eq!(normalize(q(2.4), q(-1.0)), q(2.4));
        assert_eq!(normalize(Quantity::ONE, Quantity::zero()), Quantity::ONE);
        assert_eq!(sanitize_multiple(None), Quantity::ONE);
        assert_eq!(sanitize_multiple(Some(f64::NAN)), Quantity::ONE);
        assert_eq!(sanitize_multiple(Some(-3.0)), Quantity::ONE);
        assert_eq!(sanitize_multiple(Some(2.4)), q(2.4));
    }

    #[test]
    fn test_idempotence() {
        for multiple in [1.0, 0.5, 2.4, 3.0, 12.5] {
            for requested in [0.01, 1.0, 2.39, 2.4, 5.0, 7.21, 100.0] {
                let m = q(multiple);
                let once = normalize(m, q(requested));
                assert_eq!(normalize(m, once), once, "m={multiple} q={requested}");
            }
        }
    }

    #[test]
    fn test_lower_bound_and_exact_multiple() {
        for multiple in [0.5, 2.4, 3.0, 12.5] {
            for requested in [0.01, 1.0, 2.39, 5.0, 7.21, 100.0] {
                let m = q(multiple);
                let n = normalize(m, q(requested));
                assert!(n >= m, "m={multiple} q={requested}");
                assert_eq!(n.hundredths() % m.hundredths(), 0);
            }
        }
    }

    #[test]
    fn test_monotonicity() {
        let m = q(2.4);
        let mut prev = Quantity::zero();
        for requested in [0.1, 1.0, 2.4, 2.5, 4.8, 5.0, 7.2, 7.3] {
            let n = normalize(m, q(requested));
            assert!(n >= prev, "q={requested}");
            prev = n;
        }
    }

    #[test]
    fn test_area_unit_detection() {
        assert!(is_area_unit("m2"));
        assert!(is_area_unit("M2"));
        assert!(is_area_unit("m²"));
        assert!(is_area_unit(" m^2 "));
        assert!(!is_area_unit("Un"));
        assert!(!is_area_unit("Bolsa"));
        assert!(!is_area_unit(""));
    }

    #[test]
    fn test_display_rules() {
        assert_eq!(format_quantity(q(7.2), "m2"), "7.20");
        assert_eq!(format_quantity(q(3.0), "Un"), "3");
        assert_eq!(format_quantity(q(12.0), "Bolsa"), "12");
    }

    #[test]
    fn test_equivalent_boxes() {
        assert_eq!(equivalent_boxes(q(7.2), q(2.4), "m2"), Some(3));
        assert_eq!(equivalent_boxes(q(2.4), q(2.4), "M2"), Some(1));
        assert_eq!(equivalent_boxes(q(7.2), q(2.4), "Un"), None);
    }
}
