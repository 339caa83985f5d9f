//! # Session & Cart Store Endpoints
//!
//! The authenticated-session identity endpoint and the remote per-user
//! cart store. The remote store is the authoritative tier of the
//! persistence bridge; it holds the cart's canonical JSON plus a save
//! timestamp, keyed server-side by the session identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use mostrador_core::Cart;

use crate::client::Backend;
use crate::error::ApiResult;

// ---------------------------------------------------------------------------
// Wire records
// ---------------------------------------------------------------------------

/// Identity of the authenticated operator.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    /// Login email — the cart store key.
    pub email: String,

    #[serde(rename = "nombre_completo", default)]
    pub full_name: Option<String>,
}

/// A remote cart snapshot with its save timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCartSnapshot {
    pub cart: Cart,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct CartEnvelope {
    #[serde(default)]
    cart: Option<Cart>,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveCartRequest<'a> {
    user_id: &'a str,
    cart: &'a Cart,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct SaveCartAck {
    #[serde(default)]
    #[allow(dead_code)]
    message: Option<String>,
}

fn parse_saved_at(raw: Option<&str>) -> DateTime<Utc> {
    match raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok()) {
        Some(ts) => ts.with_timezone(&Utc),
        None => {
            // an unparseable timestamp only matters for conflict
            // ordering; treat it as older-than-everything
            warn!(?raw, "Remote cart snapshot has no usable timestamp");
            DateTime::<Utc>::UNIX_EPOCH
        }
    }
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

impl Backend {
    /// Resolves the authenticated session identity.
    /// Fails with `Unauthenticated` when the session expired.
    pub async fn user_info(&self) -> ApiResult<UserInfo> {
        self.get_json("/api/user_info", &[]).await
    }

    /// Fetches the remote cart snapshot for the session user, if any.
    pub async fn user_cart(&self) -> ApiResult<Option<RemoteCartSnapshot>> {
        let envelope: Option<CartEnvelope> = self.get_json("/api/get_user_cart", &[]).await?;

        Ok(envelope.and_then(|envelope| {
            let saved_at = parse_saved_at(envelope.timestamp.as_deref());
            envelope.cart.map(|cart| RemoteCartSnapshot { cart, saved_at })
        }))
    }

    /// Saves the cart snapshot for `user_id`.
    /// The backend rejects a `user_id` that does not match the session.
    pub async fn save_user_cart(
        &self,
        user_id: &str,
        cart: &Cart,
        saved_at: DateTime<Utc>,
    ) -> ApiResult<()> {
        let _: SaveCartAck = self
            .post_json(
                "/api/save_user_cart",
                &SaveCartRequest {
                    user_id,
                    cart,
                    timestamp: saved_at.to_rfc3339(),
                },
            )
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

    #[test]
    fn test_parse_saved_at() {
        let ts = parse_saved_at(Some("2026-08-08T12:00:00+00:00"));
        assert_eq!(ts.to_rfc3339(), "2026-08-08T12:00:00+00:00");

        assert_eq!(parse_saved_at(None), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(parse_saved_at(Some("ayer")), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_cart_envelope_tolerates_empty_payloads() {
        let empty: CartEnvelope = serde_json::from_str("{}").unwrap();
        assert!(empty.cart.is_none());

        let json = r#"{"cart": {"lines": [], "client": null, "quotationId": null}, "timestamp": "2026-08-08T12:00:00Z"}"#;
        let envelope: CartEnvelope = serde_json::from_str(json).unwrap();
        assert!(envelope.cart.unwrap().is_empty());
    }

    #[test]
    fn test_save_request_uses_camel_case_keys() {
        let cart = Cart::new();
        let request = SaveCartRequest {
            user_id: "u1@example.com",
            cart: &cart,
            timestamp: "2026-08-08T12:00:00+00:00".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("cart").is_some());
        assert!(json.get("timestamp").is_some());
    }
}
