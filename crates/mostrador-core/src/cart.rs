//! # Cart Aggregate
//!
//! The authoritative in-memory cart: lines, client, discounts, logistics,
//! simulated payments, observations, and quotation linkage.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operator Action           Cart Method            State Change          │
//! │  ───────────────           ───────────            ────────────          │
//! │                                                                         │
//! │  Pick product+qty ───────► add_product() ───────► merge or push line   │
//! │                                                                         │
//! │  Stepper ▲/▼ ────────────► adjust_quantity() ───► ± one sale multiple  │
//! │                                                                         │
//! │  Type a quantity ────────► set_quantity() ──────► normalized replace   │
//! │                                                                         │
//! │  Remove row ─────────────► remove_line() ───────► line dropped         │
//! │                                                                         │
//! │  Switch store ───────────► apply_price_refresh() ► reprice + availability│
//! │                                                                         │
//! │  Finalize/print ─────────► clear() ─────────────► back to empty        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `product_id`; adding an existing product merges
//!   into its line (quantity grows by the normalized request)
//! - Line order is insertion order
//! - Every stored quantity is normalized against its sale multiple
//! - All mutations are synchronous; persistence is the caller's concern
//!   (fired after the mutation, never awaited inside it)

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Rate};
use crate::quantity::{self, Quantity};
use crate::types::{
    Client, DiscountSetting, LogisticsSetting, PaymentEntry, Product, QuotationKind,
};
use crate::MAX_OBSERVATION_LEN;

// =============================================================================
// Cart Line
// =============================================================================

/// One product entry in the cart.
///
/// Prices are frozen at the moment of adding; a store switch re-resolves
/// them through [`Cart::apply_price_refresh`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product business identifier, unique within the cart.
    pub product_id: String,

    /// Product name at time of adding.
    pub name: String,

    /// Price actually charged per unit (discounted, tax included).
    pub unit_price: Money,

    /// Pre-discount reference price, shown on quotations only.
    pub list_price: Money,

    /// Tax rate for the line.
    pub tax_rate: Rate,

    /// Normalized quantity (always a clean multiple of `sale_multiple`
    /// unless the multiple is 1).
    pub quantity: Quantity,

    /// Minimum/step purchase unit.
    pub sale_multiple: Quantity,

    /// Unit of measure; area units render quantities with two decimals.
    pub unit_of_measure: String,

    /// Unit weight in grams (0 when unknown).
    #[serde(default)]
    pub weight_grams: i64,

    /// Whether the product exists in the currently selected store.
    /// False hides the price and freezes quantity edits in the view;
    /// the line itself stays in the cart.
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl CartLine {
    /// Creates a line from a catalog product with an already-normalized
    /// quantity.
    pub fn from_product(product: &Product, quantity: Quantity) -> Self {
        CartLine {
            product_id: product.product_number.clone(),
            name: product.name.clone(),
            unit_price: product.sale_price,
            list_price: product.list_price,
            tax_rate: product.tax_rate,
            quantity,
            sale_multiple: product.sale_multiple,
            unit_of_measure: product.unit_of_measure.clone(),
            weight_grams: product.weight_grams.unwrap_or(0),
            available: true,
        }
    }

    /// Line total before tax: unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price.mul_quantity(self.quantity)
    }

    /// Tax amount for this line.
    pub fn tax(&self) -> Money {
        self.line_total().apply_rate(self.tax_rate)
    }

    /// Total line weight in grams.
    pub fn weight_grams_total(&self) -> i64 {
        // grams * hundredths / 100
        (self.weight_grams as i128 * self.quantity.hundredths() as i128 / 100) as i64
    }

    /// Per-unit discount against the list price (zero when the sale
    /// price is not below list).
    pub fn unit_discount(&self) -> Money {
        (self.list_price - self.unit_price).clamp_non_negative()
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cart aggregate root.
///
/// Created empty at session start, hydrated by the persistence bridge,
/// mutated by every cart action, cleared after a quotation is finalized.
/// It always exists in one of those states; it is never "deleted".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Lines in insertion order, unique by product id.
    #[serde(default)]
    pub lines: Vec<CartLine>,

    /// Selected client, if any.
    pub client: Option<Client>,

    #[serde(default)]
    pub discount: DiscountSetting,

    #[serde(default)]
    pub logistics: LogisticsSetting,

    #[serde(default)]
    pub payments: Vec<PaymentEntry>,

    /// Sanitized free text, at most [`MAX_OBSERVATION_LEN`] chars.
    #[serde(default)]
    pub observations: String,

    /// Identifier of the bound quotation, if any.
    pub quotation_id: Option<String>,

    #[serde(default)]
    pub quotation_kind: QuotationKind,
}

impl Cart {
    /// Creates a new empty cart (`quotation_kind = New`).
    pub fn new() -> Self {
        Cart::default()
    }

    /// Checks if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines (unique products).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Index of the line holding a product, if present.
    pub fn find_line(&self, product_id: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id == product_id)
    }

    // -------------------------------------------------------------------------
    // Line mutations
    // -------------------------------------------------------------------------

    /// Adds a product to the cart.
    ///
    /// The requested quantity is normalized against the product's sale
    /// multiple first. If the product is already in the cart its line
    /// quantity grows by the normalized request; otherwise a new line is
    /// appended. Returns the line's resulting quantity.
    pub fn add_product(&mut self, product: &Product, requested: Quantity) -> Quantity {
        let normalized = quantity::normalize(product.sale_multiple, requested);

        if let Some(index) = self.find_line(&product.product_number) {
            let line = &mut self.lines[index];
            line.quantity += normalized;
            line.quantity
        } else {
            self.lines.push(CartLine::from_product(product, normalized));
            normalized
        }
    }

    /// Removes the line at `index`. Out-of-range indices are a no-op.
    pub fn remove_line(&mut self, index: usize) {
        if index < self.lines.len() {
            self.lines.remove(index);
        }
    }

    /// Removes the line holding `product_id`. Missing ids are a no-op.
    pub fn remove_product(&mut self, product_id: &str) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Steps a line's quantity by `delta_steps` sale multiples.
    ///
    /// The result is floored at one multiple (a line never steps below
    /// its minimum purchase unit) and re-normalized. Out-of-range
    /// indices are a no-op.
    pub fn adjust_quantity(&mut self, index: usize, delta_steps: i64) {
        let Some(line) = self.lines.get_mut(index) else {
            return;
        };

        let step = Quantity::from_hundredths(line.sale_multiple.hundredths() * delta_steps);
        let mut next = line.quantity + step;
        if next < line.sale_multiple {
            next = line.sale_multiple;
        }
        line.quantity = quantity::normalize(line.sale_multiple, next);
    }

    /// Replaces a line's quantity with the normalized `requested` value
    /// (absolute, not relative). Out-of-range indices are a no-op.
    pub fn set_quantity(&mut self, index: usize, requested: Quantity) {
        if let Some(line) = self.lines.get_mut(index) {
            line.quantity = quantity::normalize(line.sale_multiple, requested);
        }
    }

    // -------------------------------------------------------------------------
    // Client
    // -------------------------------------------------------------------------

    /// Sets or replaces the cart's client.
    pub fn set_client(&mut self, client: Client) {
        self.client = Some(client);
    }

    /// Whether removing the client needs an explicit confirmation.
    ///
    /// True when the cart is bound to an ERP quotation: removing the
    /// client there implicitly abandons that quotation.
    pub fn requires_client_removal_confirmation(&self) -> bool {
        self.quotation_kind == QuotationKind::Erp && self.quotation_id.is_some()
    }

    /// Removes the client, refusing when a confirmation is required.
    ///
    /// Callers surface [`CoreError::ClientRemovalNeedsConfirmation`] as
    /// a blocking dialog and call [`Cart::remove_client_confirmed`] only
    /// if the operator accepts. Declining leaves the cart untouched.
    pub fn remove_client(&mut self) -> CoreResult<()> {
        if self.requires_client_removal_confirmation() {
            return Err(CoreError::ClientRemovalNeedsConfirmation {
                quotation_id: self.quotation_id.clone().unwrap_or_default(),
            });
        }
        self.client = None;
        Ok(())
    }

    /// Removes the client after explicit confirmation, unbinding any
    /// quotation: the next finalize starts a new one.
    pub fn remove_client_confirmed(&mut self) {
        self.client = None;
        self.quotation_id = None;
        self.quotation_kind = QuotationKind::New;
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    /// Replaces the discount settings, clamping the percentage to 0–100
    /// and the fixed amount to ≥ 0.
    pub fn set_discount(&mut self, mut discount: DiscountSetting) {
        discount.percent = discount.percent.clamp_percent();
        discount.fixed = discount.fixed.clamp_non_negative();
        self.discount = discount;
    }

    /// Replaces the logistics settings, clamping the shipping cost to ≥ 0.
    pub fn set_logistics(&mut self, mut logistics: LogisticsSetting) {
        logistics.shipping_cost = logistics.shipping_cost.clamp_non_negative();
        self.logistics = logistics;
    }

    /// Replaces the simulated payments, clamping amounts to ≥ 0 and
    /// installments to ≥ 1.
    pub fn set_payments(&mut self, mut payments: Vec<PaymentEntry>) {
        for payment in &mut payments {
            payment.amount = payment.amount.clamp_non_negative();
            if payment.installments == 0 {
                payment.installments = 1;
            }
        }
        self.payments = payments;
    }

    /// Replaces the observations with a sanitized copy of `text`.
    pub fn set_observations(&mut self, text: &str) {
        self.observations = sanitize_observations(text);
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Resets the cart to its empty state (no lines, no client, default
    /// settings, `quotation_kind = New`).
    pub fn clear(&mut self) {
        *self = Cart::new();
    }

    /// Re-resolves every line against the given store catalog after a
    /// store switch.
    ///
    /// Lines found in the catalog get current prices, multiple and unit
    /// and are marked available; lines missing from it keep their frozen
    /// data but are marked unavailable. Nothing is removed.
    pub fn apply_price_refresh(&mut self, products: &[Product]) {
        for line in &mut self.lines {
            match products.iter().find(|p| p.product_number == line.product_id) {
                Some(product) => {
                    line.unit_price = product.sale_price;
                    line.list_price = product.list_price;
                    line.tax_rate = product.tax_rate;
                    line.sale_multiple = product.sale_multiple;
                    line.unit_of_measure = product.unit_of_measure.clone();
                    line.available = true;
                }
                None => {
                    line.available = false;
                }
            }
        }
    }
}

// =============================================================================
// Observations Sanitizer
// =============================================================================

/// Sanitizes quotation observations: keeps letters (including the
/// Spanish accented set), digits, whitespace and `. , -`; drops
/// everything else; truncates to [`MAX_OBSERVATION_LEN`] characters.
pub fn sanitize_observations(text: &str) -> String {
    text.chars()
        .filter(|c| {
            c.is_ascii_alphanumeric()
                || c.is_whitespace()
                || matches!(c, '.' | ',' | '-')
                || matches!(
                    c,
                    'á' | 'é' | 'í' | 'ó' | 'ú' | 'Á' | 'É' | 'Í' | 'Ó' | 'Ú' | 'ñ' | 'Ñ'
                )
        })
        .take(MAX_OBSERVATION_LEN)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Locale;

    fn test_product(id: &str, price_cents: i64) -> Product {
        Product {
            product_number: id.to_string(),
            name: format!("Product {id}"),
            category: "Accesorios".to_string(),
            coverage_group: String::new(),
            unit_of_measure: "Un".to_string(),
            list_price: Money::from_cents(price_cents),
            sale_price: Money::from_cents(price_cents),
            tax_rate: Rate::from_percent(21.0),
            sale_multiple: Quantity::ONE,
            available_to_sell: Quantity::from_f64(10.0),
            store_number: "BA001GC".to_string(),
            barcode: None,
            weight_grams: Some(900),
        }
    }

    fn tile_product(id: &str) -> Product {
        Product {
            unit_of_measure: "m2".to_string(),
            sale_multiple: Quantity::from_f64(2.4),
            ..test_product(id, 1_099)
        }
    }

    #[test]
    fn test_add_product_merges_by_id() {
        // Adding the same product twice keeps a single line whose
        // quantity is the sum of the normalized requests.
        let mut cart = Cart::new();
        let product = test_product("A", 999);

        cart.add_product(&product, Quantity::from_f64(2.0));
        cart.add_product(&product, Quantity::from_f64(3.0));

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines[0].quantity, Quantity::from_f64(5.0));
    }

    #[test]
    fn test_add_product_normalizes_request() {
        let mut cart = Cart::new();
        let tiles = tile_product("TILE-1");

        let stored = cart.add_product(&tiles, Quantity::from_f64(5.0));

        assert_eq!(stored, Quantity::from_f64(7.2));
        assert_eq!(quantity::format_quantity(stored, "m2"), "7.20");
    }

    #[test]
    fn test_adjust_quantity_steps_by_multiple() {
        let mut cart = Cart::new();
        cart.add_product(&tile_product("TILE-1"), Quantity::from_f64(2.4));

        cart.adjust_quantity(0, 2);
        assert_eq!(cart.lines[0].quantity, Quantity::from_f64(7.2));

        // stepping below the minimum floors at one multiple
        cart.adjust_quantity(0, -5);
        assert_eq!(cart.lines[0].quantity, Quantity::from_f64(2.4));

        // out-of-range index is a no-op
        cart.adjust_quantity(7, 1);
    }

    #[test]
    fn test_set_quantity_is_absolute() {
        let mut cart = Cart::new();
        cart.add_product(&tile_product("TILE-1"), Quantity::from_f64(2.4));

        cart.set_quantity(0, Quantity::from_f64(5.0));
        assert_eq!(cart.lines[0].quantity, Quantity::from_f64(7.2));
    }

    #[test]
    fn test_remove_is_noop_on_missing() {
        let mut cart = Cart::new();
        cart.add_product(&test_product("A", 999), Quantity::ONE);

        cart.remove_product("ZZZ");
        cart.remove_line(10);
        assert_eq!(cart.line_count(), 1);

        cart.remove_product("A");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_client_removal_guard() {
        let mut cart = Cart::new();
        cart.set_client(Client {
            client_number: "C-1".to_string(),
            name: "Consumidor Final".to_string(),
            tax_id: "20-12345678-9".to_string(),
            address: "Av. Siempreviva 742".to_string(),
            email: None,
            phone: None,
        });
        cart.quotation_id = Some("Q-000123".to_string());
        cart.quotation_kind = QuotationKind::Erp;

        // refusal leaves everything untouched
        let err = cart.remove_client().unwrap_err();
        assert!(matches!(
            err,
            CoreError::ClientRemovalNeedsConfirmation { .. }
        ));
        assert!(cart.client.is_some());
        assert_eq!(cart.quotation_kind, QuotationKind::Erp);

        // confirmation removes the client and unbinds the quotation
        cart.remove_client_confirmed();
        assert!(cart.client.is_none());
        assert!(cart.quotation_id.is_none());
        assert_eq!(cart.quotation_kind, QuotationKind::New);
    }

    #[test]
    fn test_client_removal_without_quotation_is_direct() {
        let mut cart = Cart::new();
        cart.set_client(Client {
            client_number: "C-1".to_string(),
            name: "Cliente".to_string(),
            tax_id: "123".to_string(),
            address: String::new(),
            email: None,
            phone: None,
        });
        // local quotations do not guard client removal
        cart.quotation_id = Some("P-000000001".to_string());
        cart.quotation_kind = QuotationKind::Local;

        cart.remove_client().unwrap();
        assert!(cart.client.is_none());
    }

    #[test]
    fn test_setting_clamps() {
        let mut cart = Cart::new();

        cart.set_discount(DiscountSetting {
            percent: Rate::from_percent(250.0),
            fixed: Money::from_cents(-500),
            reason: "promo".to_string(),
        });
        assert_eq!(cart.discount.percent.bps(), 10_000);
        assert!(cart.discount.fixed.is_zero());

        cart.set_payments(vec![PaymentEntry {
            amount: Money::from_cents(-100),
            installments: 0,
            ..PaymentEntry::default()
        }]);
        assert!(cart.payments[0].amount.is_zero());
        assert_eq!(cart.payments[0].installments, 1);
    }

    #[test]
    fn test_sanitize_observations() {
        assert_eq!(
            sanitize_observations("Entregar después de las 14hs."),
            "Entregar después de las 14hs."
        );
        assert_eq!(
            sanitize_observations("precio <script>alert(1)</script>"),
            "precio scriptalert1script"
        );
        let long = "x".repeat(500);
        assert_eq!(sanitize_observations(&long).chars().count(), MAX_OBSERVATION_LEN);
    }

    #[test]
    fn test_price_refresh_marks_availability() {
        let mut cart = Cart::new();
        cart.add_product(&test_product("A", 1_000), Quantity::ONE);
        cart.add_product(&test_product("B", 2_000), Quantity::ONE);

        // the new store only carries product A, at a new price
        let repriced = Product {
            sale_price: Money::parse("1.500,00", Locale::EsAr).unwrap(),
            ..test_product("A", 1_000)
        };
        cart.apply_price_refresh(&[repriced]);

        assert!(cart.lines[0].available);
        assert_eq!(cart.lines[0].unit_price.cents(), 150_000);
        assert!(!cart.lines[1].available);
        // the unavailable line keeps its data and its place
        assert_eq!(cart.lines[1].product_id, "B");
        assert_eq!(cart.line_count(), 2);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut cart = Cart::new();
        cart.add_product(&test_product("A", 999), Quantity::ONE);
        cart.set_observations("ver con depósito");
        cart.quotation_id = Some("Q-1".to_string());
        cart.quotation_kind = QuotationKind::Erp;

        cart.clear();

        assert!(cart.is_empty());
        assert!(cart.client.is_none());
        assert!(cart.observations.is_empty());
        assert!(cart.quotation_id.is_none());
        assert_eq!(cart.quotation_kind, QuotationKind::New);
    }

    #[test]
    fn test_cart_serde_round_trip() {
        let mut cart = Cart::new();
        cart.add_product(&tile_product("TILE-1"), Quantity::from_f64(5.0));
        cart.set_observations("retira en sucursal");

        let json = serde_json::to_string(&cart).unwrap();
        let back: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cart);
    }
}
