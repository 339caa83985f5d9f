//! # Totals Calculator
//!
//! Derives subtotal, tax, discount, shipping and grand total from the
//! cart lines plus the discount/logistics settings.
//!
//! Two call sites need two different views of unavailable lines (products
//! missing from the currently selected store): quotation/PDF totals
//! include every line, the live cart display zeroes unavailable ones.
//! That choice is an explicit [`TotalsScope`] argument — never a hidden
//! default.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::money::Money;
use crate::quantity::{self, Quantity};
use crate::types::DeliveryType;

// =============================================================================
// Scope
// =============================================================================

/// Which lines participate in the money columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TotalsScope {
    /// Every line counts. Used for quotation and PDF totals.
    AllLines,
    /// Unavailable lines contribute zero. Used for the live cart display.
    AvailableOnly,
}

// =============================================================================
// Totals
// =============================================================================

/// Computed cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Σ unit price × quantity over the in-scope lines.
    pub subtotal: Money,

    /// Σ line tax over the in-scope lines.
    pub tax: Money,

    /// Percentage-of-subtotal discount plus the fixed discount amount.
    pub discount: Money,

    /// Shipping cost; zero unless the logistics type is shipment.
    pub shipping: Money,

    /// `max(0, subtotal - discount + tax + shipping)`.
    pub total: Money,

    /// Σ line weight, in grams.
    pub weight_grams: i64,

    /// Σ line quantity (money-math companion, not for display).
    pub total_units: Quantity,

    /// Display-only unit count: area-unit lines contribute their
    /// equivalent box count, other lines their integer quantity.
    pub display_units: i64,
}

impl CartTotals {
    /// Total weight in kilograms, for display.
    pub fn weight_kg(&self) -> f64 {
        self.weight_grams as f64 / 1000.0
    }
}

/// Computes the totals of `cart` under the given scope.
pub fn compute_totals(cart: &Cart, scope: TotalsScope) -> CartTotals {
    let mut subtotal = Money::zero();
    let mut tax = Money::zero();
    let mut weight_grams = 0i64;
    let mut total_units = Quantity::zero();
    let mut display_units = 0i64;

    for line in &cart.lines {
        if scope == TotalsScope::AvailableOnly && !line.available {
            continue;
        }

        subtotal += line.line_total();
        tax += line.tax();
        weight_grams += line.weight_grams_total();
        total_units += line.quantity;
        display_units += quantity::equivalent_boxes(
            line.quantity,
            line.sale_multiple,
            &line.unit_of_measure,
        )
        .unwrap_or_else(|| line.quantity.as_f64().round() as i64);
    }

    let discount = subtotal.apply_rate(cart.discount.percent) + cart.discount.fixed;
    let shipping = match cart.logistics.delivery {
        DeliveryType::Shipment => cart.logistics.shipping_cost,
        DeliveryType::Pickup => Money::zero(),
    };
    let total = (subtotal - discount + tax + shipping).clamp_non_negative();

    CartTotals {
        subtotal,
        tax,
        discount,
        shipping,
        total,
        weight_grams,
        total_units,
        display_units,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
