//! # Cart Snapshot Repository
//!
//! Stores one serialized cart per user identity, mirroring the remote
//! per-user cart store. The row keyed by [`crate::ANONYMOUS_USER`]
//! backs sessions where no identity could be resolved.
//!
//! The payload is the cart's canonical JSON; `saved_at` is the snapshot
//! timestamp the conflict check compares against the remote copy.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use mostrador_core::Cart;

use crate::error::{CacheError, CacheResult};

/// A cached cart with its save timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSnapshot {
    pub cart: Cart,
    pub saved_at: DateTime<Utc>,
}

/// Repository for per-user cart snapshots.
#[derive(Debug, Clone)]
pub struct CartCacheRepository {
    pool: SqlitePool,
}

impl CartCacheRepository {
    /// Creates a new CartCacheRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartCacheRepository { pool }
    }

    /// Saves (inserts or replaces) the cart snapshot for `user_id`.
    pub async fn save(
        &self,
        user_id: &str,
        cart: &Cart,
        saved_at: DateTime<Utc>,
    ) -> CacheResult<()> {
        debug!(user_id = %user_id, lines = cart.line_count(), "Saving cart snapshot");

        let payload = serde_json::to_string(cart)?;

        sqlx::query(
            r#"
            INSERT INTO user_carts (user_id, payload, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id) DO UPDATE SET
                payload = excluded.payload,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(user_id)
        .bind(payload)
        .bind(saved_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Loads the cart snapshot for `user_id`, if one exists.
    ///
    /// A payload that no longer deserializes returns
    /// [`CacheError::Corrupted`]; hydration treats that the same as an
    /// empty cache.
    pub async fn load(&self, user_id: &str) -> CacheResult<Option<CartSnapshot>> {
        let row = sqlx::query(
            r#"
            SELECT payload, saved_at
            FROM user_carts
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row.get("payload");
        let saved_at_raw: String = row.get("saved_at");

        let cart: Cart = serde_json::from_str(&payload)?;
        let saved_at = DateTime::parse_from_rfc3339(&saved_at_raw)
            .map_err(|e| CacheError::Corrupted(format!("bad saved_at '{saved_at_raw}': {e}")))?
            .with_timezone(&Utc);

        Ok(Some(CartSnapshot { cart, saved_at }))
    }

    /// Deletes the snapshot for `user_id`. Missing rows are a no-op.
    pub async fn delete(&self, user_id: &str) -> CacheResult<()> {
        sqlx::query("DELETE FROM user_carts WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Cache, CacheConfig};
    use mostrador_core::{Money, Product, Quantity, Rate};

    fn sample_product() -> Product {
        Product {
            product_number: "105479".to_string(),
            name: "Agarradera Recta 45 cm".to_string(),
            category: "Accesorios".to_string(),
            coverage_group: String::new(),
            unit_of_measure: "Un".to_string(),
            list_price: Money::from_cents(6_526_680),
            sale_price: Money::from_cents(6_526_680),
            tax_rate: Rate::from_percent(21.0),
            sale_multiple: Quantity::ONE,
            available_to_sell: Quantity::from_f64(25.0),
            store_number: "BA001GC".to_string(),
            barcode: None,
            weight_grams: Some(900),
        }
    }

    #[tokio::test]
    async fn test_round_trip_preserves_cart() {
        let cache = Cache::open(CacheConfig::in_memory()).await.unwrap();
        let repo = cache.carts();

        let mut cart = Cart::new();
        cart.add_product(&sample_product(), Quantity::from_f64(2.0));
        cart.set_observations("entregar por depósito");

        let saved_at = Utc::now();
        repo.save("u1", &cart, saved_at).await.unwrap();

        let snapshot = repo.load("u1").await.unwrap().unwrap();
        assert_eq!(snapshot.cart, cart);
        assert_eq!(snapshot.saved_at.to_rfc3339(), saved_at.to_rfc3339());
    }

    #[tokio::test]
    async fn test_save_replaces_previous_snapshot() {
        let cache = Cache::open(CacheConfig::in_memory()).await.unwrap();
        let repo = cache.carts();

        let mut cart = Cart::new();
        cart.add_product(&sample_product(), Quantity::ONE);
        repo.save("u1", &cart, Utc::now()).await.unwrap();

        cart.add_product(&sample_product(), Quantity::ONE);
        repo.save("u1", &cart, Utc::now()).await.unwrap();

        let snapshot = repo.load("u1").await.unwrap().unwrap();
        assert_eq!(snapshot.cart.lines[0].quantity, Quantity::from_f64(2.0));
    }

    #[tokio::test]
    async fn test_missing_user_loads_none() {
        let cache = Cache::open(CacheConfig::in_memory()).await.unwrap();
        assert!(cache.carts().load("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_anonymous_row_is_independent() {
        let cache = Cache::open(CacheConfig::in_memory()).await.unwrap();
        let repo = cache.carts();

        let mut cart = Cart::new();
        cart.add_product(&sample_product(), Quantity::ONE);
        repo.save(crate::ANONYMOUS_USER, &cart, Utc::now()).await.unwrap();

        assert!(repo.load("u1").await.unwrap().is_none());
        assert!(repo.load(crate::ANONYMOUS_USER).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_corrupted_payload_is_reported() {
        let cache = Cache::open(CacheConfig::in_memory()).await.unwrap();
        sqlx::query("INSERT INTO user_carts (user_id, payload, saved_at) VALUES ('u1', 'not json', '2026-01-01T00:00:00Z')")
            .execute(cache.pool())
            .await
            .unwrap();

        let err = cache.carts().load("u1").await.unwrap_err();
        assert!(matches!(err, CacheError::Corrupted(_)));
    }
}
