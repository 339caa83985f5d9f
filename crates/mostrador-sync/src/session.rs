//! # Cart Session
//!
//! The session-scoped cart store: one shared in-memory [`Cart`] behind a
//! mutex, with every mutation going through a named method that applies
//! the change synchronously and then fires persistence without waiting
//! for it.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI event handler (single logical thread of control)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartSession::adjust_quantity(index, +1)                               │
//! │       │ lock ─► mutate ─► clone snapshot ─► unlock                     │
//! │       ▼                                                                 │
//! │  PersistenceBridge::schedule_save(snapshot)   (fire-and-forget)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UI re-reads the session state and redraws                             │
//! │                                                                         │
//! │  The UI always reflects the in-memory cart immediately; storage        │
//! │  failures arrive later through the notification channel.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};
use tracing::debug;

use mostrador_core::{
    compute_totals, Cart, CartTotals, Client, DiscountSetting, LogisticsSetting, PaymentEntry,
    Product, Quantity, QuotationKind, TotalsScope,
};

use crate::bridge::PersistenceBridge;
use crate::error::SyncResult;

/// The session cart store.
///
/// Cheap to clone; all clones share the same cart and bridge.
#[derive(Clone)]
pub struct CartSession {
    cart: Arc<Mutex<Cart>>,
    bridge: Arc<PersistenceBridge>,
}

impl CartSession {
    /// Creates a session with an empty cart.
    pub fn new(bridge: Arc<PersistenceBridge>) -> Self {
        CartSession {
            cart: Arc::new(Mutex::new(Cart::new())),
            bridge,
        }
    }

    /// Hydrates the cart from the storage tiers (session start).
    pub async fn hydrate(&self) {
        let cart = self.bridge.hydrate().await;
        *self.cart.lock().expect("cart mutex poisoned") = cart;
    }

    /// The bridge this session persists through.
    pub fn bridge(&self) -> &PersistenceBridge {
        &self.bridge
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().expect("cart mutex poisoned");
        f(&cart)
    }

    /// A full copy of the current cart (for quotation snapshots).
    pub fn snapshot(&self) -> Cart {
        self.with_cart(Cart::clone)
    }

    pub fn is_empty(&self) -> bool {
        self.with_cart(Cart::is_empty)
    }

    /// Totals under the given scope.
    pub fn totals(&self, scope: TotalsScope) -> CartTotals {
        self.with_cart(|cart| compute_totals(cart, scope))
    }

    /// Applies a mutation and schedules persistence of the result.
    fn mutate<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let snapshot = {
            let mut cart = self.cart.lock().expect("cart mutex poisoned");
            let result = f(&mut cart);
            (cart.clone(), result)
        };
        self.bridge.schedule_save(&snapshot.0);
        snapshot.1
    }

    // -------------------------------------------------------------------------
    // Line operations
    // -------------------------------------------------------------------------

    /// Adds a product; returns the line's resulting quantity.
    pub fn add_product(&self, product: &Product, requested: Quantity) -> Quantity {
        debug!(product = %product.product_number, "add_product");
        self.mutate(|cart| cart.add_product(product, requested))
    }

    pub fn remove_line(&self, index: usize) {
        self.mutate(|cart| cart.remove_line(index));
    }

    pub fn remove_product(&self, product_id: &str) {
        self.mutate(|cart| cart.remove_product(product_id));
    }

    pub fn adjust_quantity(&self, index: usize, delta_steps: i64) {
        self.mutate(|cart| cart.adjust_quantity(index, delta_steps));
    }

    pub fn set_quantity(&self, index: usize, requested: Quantity) {
        self.mutate(|cart| cart.set_quantity(index, requested));
    }

    /// Re-resolves lines against a new store's catalog.
    pub fn refresh_prices(&self, products: &[Product]) {
        self.mutate(|cart| cart.apply_price_refresh(products));
    }

    // -------------------------------------------------------------------------
    // Client
    // -------------------------------------------------------------------------

    pub fn set_client(&self, client: Client) {
        self.mutate(|cart| cart.set_client(client));
    }

    /// Removes the client; refuses (without mutating or persisting)
    /// when the cart is bound to a confirmed ERP quotation.
    pub fn remove_client(&self) -> SyncResult<()> {
        let snapshot = {
            let mut cart = self.cart.lock().expect("cart mutex poisoned");
            cart.remove_client()?;
            cart.clone()
        };
        self.bridge.schedule_save(&snapshot);
        Ok(())
    }

    /// Removes the client after explicit confirmation, unbinding the
    /// quotation.
    pub fn remove_client_confirmed(&self) {
        self.mutate(Cart::remove_client_confirmed);
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    pub fn set_discount(&self, discount: DiscountSetting) {
        self.mutate(|cart| cart.set_discount(discount));
    }

    pub fn set_logistics(&self, logistics: LogisticsSetting) {
        self.mutate(|cart| cart.set_logistics(logistics));
    }

    pub fn set_payments(&self, payments: Vec<PaymentEntry>) {
        self.mutate(|cart| cart.set_payments(payments));
    }

    pub fn set_observations(&self, text: &str) {
        self.mutate(|cart| cart.set_observations(text));
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Binds the cart to a quotation (after create/update succeeds).
    pub fn bind_quotation(&self, quotation_id: String, kind: QuotationKind) {
        self.mutate(|cart| {
            cart.quotation_id = Some(quotation_id);
            cart.quotation_kind = kind;
        });
    }

    /// Replaces the whole cart (quotation recovery).
    pub fn replace_cart(&self, new_cart: Cart) {
        self.mutate(|cart| *cart = new_cart);
    }

    /// Clears the cart and schedules persistence of the empty state.
    pub fn clear(&self) {
        self.mutate(Cart::clear);
    }

    /// Clears the cart and persists immediately to both tiers; used
    /// when a quotation was finalized/printed so no stale snapshot can
    /// resurrect it on the next device.
    pub async fn clear_and_flush(&self) {
        let snapshot = {
            let mut cart = self.cart.lock().expect("cart mutex poisoned");
            cart.clear();
            cart.clone()
        };
        self.bridge.save_now(&snapshot).await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::RemoteCartStore;
    use crate::conflict::ConflictPolicy;
    use crate::notify::Notifier;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use mostrador_api::{ApiResult, RemoteCartSnapshot};
    use mostrador_cache::{Cache, CacheConfig};
    use mostrador_core::{Money, Rate};
    use std::time::Duration;

    struct NullRemote;

    #[async_trait]
    impl RemoteCartStore for NullRemote {
        async fn fetch(&self) -> ApiResult<Option<RemoteCartSnapshot>> {
            Ok(None)
        }

        async fn store(
            &self,
            _user_id: &str,
            _cart: &Cart,
            _saved_at: DateTime<Utc>,
        ) -> ApiResult<()> {
            Ok(())
        }
    }

    async fn test_session() -> (CartSession, Cache) {
        let cache = Cache::open(CacheConfig::in_memory()).await.unwrap();
        let (notifier, _rx) = Notifier::channel();
        let bridge = PersistenceBridge::start(
            Arc::new(NullRemote),
            cache.carts(),
            Some("u1".to_string()),
            ConflictPolicy::RemoteWins,
            Duration::from_millis(400),
            notifier,
        );
        (CartSession::new(Arc::new(bridge)), cache)
    }

    fn product(id: &str, price_cents: i64) -> Product {
        Product {
            product_number: id.to_string(),
            name: format!("Product {id}"),
            category: String::new(),
            coverage_group: String::new(),
            unit_of_measure: "Un".to_string(),
            list_price: Money::from_cents(price_cents),
            sale_price: Money::from_cents(price_cents),
            tax_rate: Rate::from_percent(21.0),
            sale_multiple: Quantity::ONE,
            available_to_sell: Quantity::from_f64(9.0),
            store_number: "BA001GC".to_string(),
            barcode: None,
            weight_grams: None,
        }
    }

    #[tokio::test]
    async fn test_mutations_reach_the_local_tier() {
        let (session, cache) = test_session().await;

        session.add_product(&product("A", 10_000), Quantity::from_f64(3.0));
        session.set_observations("entrega coordinada");

        // local write-through is immediate (modulo task scheduling)
        tokio::time::sleep(Duration::from_millis(600)).await;
        let stored = cache.carts().load("u1").await.unwrap().unwrap();
        assert_eq!(stored.cart.line_count(), 1);
        assert_eq!(stored.cart.observations, "entrega coordinada");
    }

    #[tokio::test]
    async fn test_totals_follow_the_session_cart() {
        let (session, _cache) = test_session().await;
        session.add_product(&product("A", 10_000), Quantity::from_f64(3.0));
        session.set_discount(DiscountSetting {
            percent: Rate::from_percent(10.0),
            fixed: Money::zero(),
            reason: String::new(),
        });

        let totals = session.totals(TotalsScope::AllLines);
        assert_eq!(totals.total.cents(), 33_300);
    }

    #[tokio::test]
    async fn test_client_removal_guard_round_trip() {
        let (session, _cache) = test_session().await;
        session.set_client(Client {
            client_number: "C-1".to_string(),
            name: "Cliente".to_string(),
            tax_id: "12345678".to_string(),
            address: String::new(),
            email: None,
            phone: None,
        });
        session.bind_quotation("VENT1-000123".to_string(), QuotationKind::Erp);

        assert!(session.remove_client().is_err());
        assert!(session.with_cart(|c| c.client.is_some()));

        session.remove_client_confirmed();
        session.with_cart(|c| {
            assert!(c.client.is_none());
            assert!(c.quotation_id.is_none());
            assert_eq!(c.quotation_kind, QuotationKind::New);
        });
    }

    #[tokio::test]
    async fn test_clear_and_flush_resets_everything() {
        let (session, cache) = test_session().await;
        session.add_product(&product("A", 10_000), Quantity::ONE);
        session.clear_and_flush().await;

        assert!(session.is_empty());
        let stored = cache.carts().load("u1").await.unwrap().unwrap();
        assert!(stored.cart.is_empty());
    }
}
