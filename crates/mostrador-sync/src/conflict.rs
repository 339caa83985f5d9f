//! # Conflict Policy
//!
//! What hydration does when the local cache and the remote store both
//! hold a non-empty cart and they differ.
//!
//! There is no merge: the sync model is last-writer-wins with the
//! remote tier as the cross-device source of truth. The deliberate
//! policy (recorded in DESIGN.md) is remote-wins, with an optional
//! operator prompt that may pick the local copy instead. A dismissed
//! prompt falls back to the remote copy.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

use mostrador_core::Cart;

/// One side of a detected conflict, as shown to the operator.
#[derive(Debug, Clone)]
pub struct ConflictSide {
    pub cart: Cart,
    pub saved_at: DateTime<Utc>,
}

/// The operator's pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictChoice {
    Local,
    Remote,
}

/// UI hook that lets the operator pick a side. Installed only under
/// the `prompt` conflict policy.
#[async_trait]
pub trait ConflictPrompt: Send + Sync {
    async fn choose(&self, local: &ConflictSide, remote: &ConflictSide) -> ConflictChoice;
}

/// Hydration conflict policy.
#[derive(Clone, Default)]
pub enum ConflictPolicy {
    /// Adopt the remote copy silently.
    #[default]
    RemoteWins,
    /// Ask the installed prompt; remote still wins if the prompt
    /// abstains by answering `Remote`.
    Prompt(Arc<dyn ConflictPrompt>),
}

impl std::fmt::Debug for ConflictPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictPolicy::RemoteWins => write!(f, "RemoteWins"),
            ConflictPolicy::Prompt(_) => write!(f, "Prompt"),
        }
    }
}

/// Whether two carts differ in a way worth bothering the operator
/// about: different line contents, client, or quotation linkage.
/// Observations, discounts and payment simulations alone do not count.
pub fn meaningfully_different(a: &Cart, b: &Cart) -> bool {
    let lines_of = |cart: &Cart| -> BTreeMap<String, i64> {
        cart.lines
            .iter()
            .map(|l| (l.product_id.clone(), l.quantity.hundredths()))
            .collect()
    };

    if lines_of(a) != lines_of(b) {
        return true;
    }

    let client_of = |cart: &Cart| cart.client.as_ref().map(|c| c.client_number.clone());
    if client_of(a) != client_of(b) {
        return true;
    }

    a.quotation_id != b.quotation_id || a.quotation_kind != b.quotation_kind
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mostrador_core::{Client, Money, Product, Quantity, QuotationKind, Rate};

    fn product(id: &str) -> Product {
        Product {
            product_number: id.to_string(),
            name: format!("Product {id}"),
            category: String::new(),
            coverage_group: String::new(),
            unit_of_measure: "Un".to_string(),
            list_price: Money::from_cents(1_000),
            sale_price: Money::from_cents(1_000),
            tax_rate: Rate::from_percent(21.0),
            sale_multiple: Quantity::ONE,
            available_to_sell: Quantity::from_f64(5.0),
            store_number: "BA001GC".to_string(),
            barcode: None,
            weight_grams: None,
        }
    }

    #[test]
    fn test_same_lines_are_not_a_conflict() {
        let mut a = Cart::new();
        a.add_product(&product("A"), Quantity::from_f64(2.0));
        let mut b = Cart::new();
        b.add_product(&product("A"), Quantity::from_f64(2.0));

        // observations differ, but that is not worth a prompt
        a.set_observations("retira por depósito");
        assert!(!meaningfully_different(&a, &b));
    }

    #[test]
    fn test_quantity_and_line_set_differences() {
        let mut a = Cart::new();
        a.add_product(&product("A"), Quantity::from_f64(2.0));
        let mut b = Cart::new();
        b.add_product(&product("A"), Quantity::from_f64(3.0));
        assert!(meaningfully_different(&a, &b));

        let mut c = Cart::new();
        c.add_product(&product("A"), Quantity::from_f64(2.0));
        c.add_product(&product("B"), Quantity::ONE);
        assert!(meaningfully_different(&a, &c));
    }

    #[test]
    fn test_client_and_quotation_differences() {
        let mut a = Cart::new();
        a.add_product(&product("A"), Quantity::ONE);
        let mut b = a.clone();

        b.set_client(Client {
            client_number: "C-1".to_string(),
            name: "Cliente".to_string(),
            tax_id: "123456".to_string(),
            address: String::new(),
            email: None,
            phone: None,
        });
        assert!(meaningfully_different(&a, &b));

        let mut c = a.clone();
        c.quotation_id = Some("VENT1-000123".to_string());
        c.quotation_kind = QuotationKind::Erp;
        assert!(meaningfully_different(&a, &c));
    }
}
