//! # Identity Resolution
//!
//! Resolves the operator identity from the authenticated session
//! endpoint, keeping the last-known identity in a session-scoped slot
//! so one transient network failure does not downgrade the cart to the
//! anonymous tier (which would hide the operator's real cart).
//!
//! No identity means: local cache only, under the anonymous sentinel;
//! the remote tier is never written for anonymous sessions.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use mostrador_api::{ApiResult, Backend, UserInfo};
use mostrador_cache::ANONYMOUS_USER;

/// Port for the session identity endpoint.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_identity(&self) -> ApiResult<UserInfo>;
}

#[async_trait]
impl IdentityProvider for Backend {
    async fn current_identity(&self) -> ApiResult<UserInfo> {
        self.user_info().await
    }
}

/// Resolves and caches the operator identity.
pub struct IdentityResolver {
    provider: Arc<dyn IdentityProvider>,
    last_known: Mutex<Option<String>>,
}

impl IdentityResolver {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        IdentityResolver {
            provider,
            last_known: Mutex::new(None),
        }
    }

    /// Resolves the current identity.
    ///
    /// On success the identity is cached for the session. On failure
    /// the last-known identity (if any) is returned instead; only a
    /// session that never authenticated resolves to `None`.
    pub async fn resolve(&self) -> Option<String> {
        match self.provider.current_identity().await {
            Ok(info) => {
                debug!(email = %info.email, "Resolved session identity");
                *self.last_known.lock().expect("identity slot poisoned") =
                    Some(info.email.clone());
                Some(info.email)
            }
            Err(err) => {
                let fallback = self.last_known.lock().expect("identity slot poisoned").clone();
                match &fallback {
                    Some(email) => {
                        warn!(?err, email = %email, "Identity endpoint failed, using last-known identity");
                    }
                    None => warn!(?err, "Identity endpoint failed and no identity is known"),
                }
                fallback
            }
        }
    }

    /// Last identity seen this session, without a network round trip.
    pub fn last_known(&self) -> Option<String> {
        self.last_known.lock().expect("identity slot poisoned").clone()
    }
}

/// Local-cache key for an identity: the identity itself, or the
/// anonymous sentinel.
pub fn cache_key(identity: Option<&str>) -> &str {
    identity.unwrap_or(ANONYMOUS_USER)
}

// =============================================================================
// Unit Tests
// =============================================================================
