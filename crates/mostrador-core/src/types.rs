//! # Domain Types
//!
//! Core domain types used throughout Mostrador.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Client      │   │  PaymentEntry   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_number │   │  client_number  │   │  method         │       │
//! │  │  sale_price     │   │  tax_id (DNI)   │   │  amount         │       │
//! │  │  sale_multiple  │   │  address        │   │  surcharge      │       │
//! │  │  tax_rate       │   └─────────────────┘   │  installments   │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ DiscountSetting │   │LogisticsSetting │   │  QuotationKind  │       │
//! │  │  percent+fixed  │   │  pickup/shipment│   │  New/Local/Erp  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Prices are always integer cents ([`Money`]), quantities fixed-point
//! hundredths ([`Quantity`]), percentages basis points ([`Rate`]). The
//! API boundary parses the backend's locale strings into these types
//! exactly once.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, Rate};
use crate::quantity::Quantity;

// =============================================================================
// Product
// =============================================================================

/// A catalog product for the currently selected store.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Business identifier (the ERP product number).
    pub product_number: String,

    /// Display name.
    pub name: String,

    /// Product category name.
    pub category: String,

    /// Coverage group (tile collections etc.).
    pub coverage_group: String,

    /// Unit of measure ("Un", "m2", "Bolsa", ...).
    pub unit_of_measure: String,

    /// Final price including tax, before commercial discount.
    pub list_price: Money,

    /// Final price including tax, with commercial discount applied.
    /// This is the price a cart line is created with.
    pub sale_price: Money,

    /// Tax rate applied on top of the net price.
    pub tax_rate: Rate,

    /// Minimum/step purchase unit (a 2.4 m² box, a 10-unit pack).
    pub sale_multiple: Quantity,

    /// Stock available to sell at this store.
    pub available_to_sell: Quantity,

    /// Store this record was priced for.
    pub store_number: String,

    /// Barcode (EAN-13 etc.), when known.
    pub barcode: Option<String>,

    /// Unit weight in grams, when known.
    pub weight_grams: Option<i64>,
}

impl Product {
    /// Sign of the stock position, used by the catalog stock filters.
    pub fn stock_sign(&self) -> StockSign {
        StockSign::of(self.available_to_sell)
    }
}

/// Sign of a stock position: the catalog filters on +/0/- rather than
/// exact numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockSign {
    Positive,
    Zero,
    Negative,
}

impl StockSign {
    pub fn of(qty: Quantity) -> Self {
        match qty.hundredths() {
            h if h > 0 => StockSign::Positive,
            0 => StockSign::Zero,
            _ => StockSign::Negative,
        }
    }
}

// =============================================================================
// Stock Detail
// =============================================================================

/// Per-warehouse stock breakdown for one product at one store.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockDetail {
    pub warehouse: String,
    pub available_to_sell: Quantity,
    pub available_to_deliver: Quantity,
    pub committed: Quantity,
}

// =============================================================================
// Client
// =============================================================================

/// A client record from the client directory.
///
/// The cart holds at most one of these; it is a reference, not an owned
/// master record — edits to clients happen through the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Business identifier (the ERP client number).
    pub client_number: String,

    /// Display name.
    pub name: String,

    /// Tax identifier (DNI/CUIT).
    pub tax_id: String,

    /// Full address string ("Av. Siempreviva 742, Springfield").
    pub address: String,

    pub email: Option<String>,
    pub phone: Option<String>,
}

// =============================================================================
// Discount
// =============================================================================

/// Cart-level discount: a percentage of the subtotal plus a fixed
/// amount, both applied additively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DiscountSetting {
    /// Percentage of the subtotal (clamped to 0–100 on the way in).
    pub percent: Rate,

    /// Fixed amount added after the percentage (clamped to ≥ 0).
    pub fixed: Money,

    /// Free-text reason, shown on the quotation.
    pub reason: String,
}

// =============================================================================
// Logistics
// =============================================================================

/// How the goods leave the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    /// Customer picks up at a branch. Shipping cost does not apply.
    #[default]
    Pickup,
    /// Delivery to an address. Shipping cost applies.
    Shipment,
}

/// Cart-level logistics settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LogisticsSetting {
    pub delivery: DeliveryType,

    /// Branch for pickup (or dispatching branch for shipments).
    pub branch: String,

    /// Agreed pickup/delivery date.
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,

    /// Delivery address (defaults to the client's address on shipment).
    pub address: String,

    /// Shipping cost; only counted toward totals for shipments.
    pub shipping_cost: Money,

    pub notes: String,
}

// =============================================================================
// Payments
// =============================================================================

/// Payment methods available in the payment simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Debit,
    Credit,
    Transfer,
    Check,
}

/// One simulated payment toward the cart total.
///
/// The effective contribution is `amount × (1 + surcharge)`; credit
/// plans with installments carry their financing cost as the surcharge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEntry {
    pub method: PaymentMethod,

    /// Amount tendered, before surcharge.
    pub amount: Money,

    /// Number of installments (≥ 1; only meaningful for credit).
    pub installments: u32,

    /// Card brand, for card methods.
    pub card: Option<String>,

    /// Financing surcharge for this method/plan.
    pub surcharge: Rate,

    /// Free-text reference (last 4 digits, voucher number, ...).
    pub reference: String,
}

impl Default for PaymentEntry {
    fn default() -> Self {
        PaymentEntry {
            method: PaymentMethod::Cash,
            amount: Money::zero(),
            installments: 1,
            card: None,
            surcharge: Rate::zero(),
            reference: String::new(),
        }
    }
}

// =============================================================================
// Quotation Linkage
// =============================================================================

/// What kind of quotation, if any, the cart is currently bound to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QuotationKind {
    /// Not bound: finalizing creates a fresh quotation.
    #[default]
    New,
    /// Bound to a locally stored (PDF) quotation.
    Local,
    /// Bound to an ERP quotation; finalizing updates it in place.
    Erp,
}

// =============================================================================
// UI Preferences
// =============================================================================

/// Color theme, persisted globally (not per user).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

/// Catalog presentation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Table,
    Cards,
}

// =============================================================================
// Unit Tests
// =============================================================================
