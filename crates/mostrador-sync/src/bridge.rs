//! # Persistence Bridge
//!
//! Fans the in-memory cart out to its two durable tiers and hydrates it
//! back at session start.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Persistence Bridge                                 │
//! │                                                                         │
//! │  cart mutation (synchronous, already applied in memory)                │
//! │       │                                                                 │
//! │       ▼ schedule_save(cart)                                            │
//! │  snapshot = cart.clone()          ← snapshot BEFORE any await          │
//! │  version += 1                                                          │
//! │       │                                                                 │
//! │       ├──────────────► local cache write (immediate, independent)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────────────────┐          │
//! │  │  RemoteWriter task (single-flight)                       │          │
//! │  │                                                          │          │
//! │  │  recv snapshot ──► absorb newer snapshots until the      │          │
//! │  │  channel stays quiet for the debounce window (~400 ms)   │          │
//! │  │  ──► POST latest snapshot ──► mark version synced        │          │
//! │  │                                                          │          │
//! │  │  a write that lands after a newer mutation is stale:     │          │
//! │  │  the newer snapshot is already queued and wins           │          │
//! │  └──────────────────────────────────────────────────────────┘          │
//! │                                                                         │
//! │  Failures NEVER roll back the in-memory cart: remote errors            │
//! │  become notifications, cache errors become log lines.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Load Path (hydration)
//! Remote wins. A blank remote falls back to the local cache (and the
//! local cart is pushed back up); a blank local too starts empty and
//! seeds both tiers. See [`crate::conflict`] for the divergence policy.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use mostrador_api::{ApiResult, Backend, RemoteCartSnapshot};
use mostrador_cache::CartCacheRepository;
use mostrador_core::Cart;

use crate::conflict::{meaningfully_different, ConflictChoice, ConflictPolicy, ConflictSide};
use crate::notify::{Notification, Notifier};

// =============================================================================
// Remote Port
// =============================================================================

/// Port for the remote per-user cart store.
#[async_trait]
pub trait RemoteCartStore: Send + Sync {
    /// Fetches the session user's cart snapshot, if any.
    async fn fetch(&self) -> ApiResult<Option<RemoteCartSnapshot>>;

    /// Stores the cart snapshot for `user_id`.
    async fn store(&self, user_id: &str, cart: &Cart, saved_at: DateTime<Utc>) -> ApiResult<()>;
}

#[async_trait]
impl RemoteCartStore for Backend {
    async fn fetch(&self) -> ApiResult<Option<RemoteCartSnapshot>> {
        self.user_cart().await
    }

    async fn store(&self, user_id: &str, cart: &Cart, saved_at: DateTime<Utc>) -> ApiResult<()> {
        self.save_user_cart(user_id, cart, saved_at).await
    }
}

// =============================================================================
// Bridge
// =============================================================================

struct PendingSave {
    version: u64,
    cart: Cart,
    saved_at: DateTime<Utc>,
}

/// Orchestrates the local-cache and remote tiers for one session.
pub struct PersistenceBridge {
    identity: Option<String>,
    cache_key: String,
    cache: CartCacheRepository,
    remote: Arc<dyn RemoteCartStore>,
    policy: ConflictPolicy,
    notifier: Notifier,

    /// Monotonic mutation counter; bumped on every scheduled save.
    version: Arc<AtomicU64>,

    /// Highest version known to have reached the remote tier.
    synced_version: Arc<AtomicU64>,

    /// Immediate, ordered local write-through.
    local_tx: mpsc::UnboundedSender<PendingSave>,

    /// Debounced remote writer.
    writer_tx: mpsc::UnboundedSender<PendingSave>,
}

impl PersistenceBridge {
    /// Creates the bridge and spawns the debounced remote writer.
    ///
    /// `identity == None` (anonymous session) disables the remote tier
    /// entirely: saves go to the local cache under the anonymous key.
    pub fn start(
        remote: Arc<dyn RemoteCartStore>,
        cache: CartCacheRepository,
        identity: Option<String>,
        policy: ConflictPolicy,
        debounce: Duration,
        notifier: Notifier,
    ) -> Self {
        let (writer_tx, writer_rx) = mpsc::unbounded_channel();
        let (local_tx, local_rx) = mpsc::unbounded_channel();
        let version = Arc::new(AtomicU64::new(0));
        let synced_version = Arc::new(AtomicU64::new(0));

        if let Some(identity) = identity.clone() {
            let writer = RemoteWriter {
                rx: writer_rx,
                remote: remote.clone(),
                identity,
                debounce,
                notifier: notifier.clone(),
                version: version.clone(),
                synced_version: synced_version.clone(),
            };
            tokio::spawn(writer.run());
        }

        let cache_key = crate::identity::cache_key(identity.as_deref()).to_string();
        tokio::spawn(run_local_writer(
            local_rx,
            cache.clone(),
            cache_key.clone(),
        ));

        PersistenceBridge {
            identity,
            cache_key,
            cache,
            remote,
            policy,
            notifier,
            version,
            synced_version,
            local_tx,
            writer_tx,
        }
    }

    /// The identity this bridge persists under, if any.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Whether mutations exist that have not reached the remote tier.
    pub fn is_dirty(&self) -> bool {
        self.version.load(Ordering::SeqCst) > self.synced_version.load(Ordering::SeqCst)
    }

    // -------------------------------------------------------------------------
    // Hydration
    // -------------------------------------------------------------------------

    /// Loads the session cart from the tiers.
    ///
    /// Never fails: every storage error degrades to the next tier and a
    /// notification, ending with an empty cart at worst.
    pub async fn hydrate(&self) -> Cart {
        let Some(identity) = self.identity.clone() else {
            self.notifier.notify(Notification::warning(
                "Sign in to keep the cart synced across devices",
            ));
            return self.load_local_or_empty().await;
        };

        match self.remote.fetch().await {
            Ok(Some(remote_snapshot)) => {
                let adopted = self.resolve_against_local(remote_snapshot).await;

                if let Err(err) = self
                    .cache
                    .save(&self.cache_key, &adopted.cart, adopted.saved_at)
                    .await
                {
                    warn!(?err, "Could not mirror the adopted cart into the local cache");
                }

                if adopted.push_to_remote {
                    if let Err(err) = self
                        .remote
                        .store(&identity, &adopted.cart, adopted.saved_at)
                        .await
                    {
                        self.report_remote_error(&err);
                    }
                }

                info!(lines = adopted.cart.line_count(), "Hydrated cart from remote");
                adopted.cart
            }

            Ok(None) => match self.cache.load(&self.cache_key).await {
                Ok(Some(local)) => {
                    // the remote tier lost (or never had) this cart;
                    // push the local copy back up
                    let saved_at = Utc::now();
                    if let Err(err) = self.remote.store(&identity, &local.cart, saved_at).await {
                        self.report_remote_error(&err);
                    }
                    info!(lines = local.cart.line_count(), "Hydrated cart from local cache");
                    local.cart
                }
                Ok(None) => {
                    let cart = Cart::new();
                    let saved_at = Utc::now();
                    if let Err(err) = self.cache.save(&self.cache_key, &cart, saved_at).await {
                        warn!(?err, "Could not seed the local cache");
                    }
                    if let Err(err) = self.remote.store(&identity, &cart, saved_at).await {
                        self.report_remote_error(&err);
                    }
                    debug!("No stored cart anywhere, starting empty");
                    cart
                }
                Err(err) => {
                    warn!(?err, "Local cache unavailable, starting empty");
                    Cart::new()
                }
            },

            Err(err) => {
                self.report_remote_error(&err);
                self.load_local_or_empty().await
            }
        }
    }

    async fn load_local_or_empty(&self) -> Cart {
        match self.cache.load(&self.cache_key).await {
            Ok(Some(snapshot)) => snapshot.cart,
            Ok(None) => Cart::new(),
            Err(err) => {
                warn!(?err, "Local cache unavailable, starting empty");
                Cart::new()
            }
        }
    }

    async fn resolve_against_local(&self, remote: RemoteCartSnapshot) -> AdoptedCart {
        if let ConflictPolicy::Prompt(prompt) = &self.policy {
            let local = self.cache.load(&self.cache_key).await.ok().flatten();
            if let Some(local) = local {
                let diverged = !local.cart.is_empty()
                    && !remote.cart.is_empty()
                    && meaningfully_different(&local.cart, &remote.cart);

                if diverged {
                    let local_side = ConflictSide {
                        cart: local.cart,
                        saved_at: local.saved_at,
                    };
                    let remote_side = ConflictSide {
                        cart: remote.cart.clone(),
                        saved_at: remote.saved_at,
                    };
                    if prompt.choose(&local_side, &remote_side).await == ConflictChoice::Local {
                        info!("Conflict resolved in favor of the local cart");
                        return AdoptedCart {
                            cart: local_side.cart,
                            saved_at: Utc::now(),
                            push_to_remote: true,
                        };
                    }
                }
            }
        }

        AdoptedCart {
            cart: remote.cart,
            saved_at: remote.saved_at,
            push_to_remote: false,
        }
    }

    // -------------------------------------------------------------------------
    // Saving
    // -------------------------------------------------------------------------

    /// Persists the cart after a mutation: immediate local write-through
    /// plus a debounced remote write. Fire-and-forget — the caller's UI
    /// flow never waits on storage.
    pub fn schedule_save(&self, cart: &Cart) {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        // snapshot before crossing any await boundary; later mutations
        // must not leak into this write
        let snapshot = cart.clone();
        let saved_at = Utc::now();

        let _ = self.local_tx.send(PendingSave {
            version,
            cart: snapshot.clone(),
            saved_at,
        });

        if self.identity.is_some() {
            let _ = self.writer_tx.send(PendingSave {
                version,
                cart: snapshot,
                saved_at,
            });
        }
    }

    /// Persists the cart to both tiers immediately, bypassing the
    /// debounce. Used by lifecycle transitions (finalize, clear) that
    /// must not leave a stale snapshot behind.
    pub async fn save_now(&self, cart: &Cart) {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        let saved_at = Utc::now();

        if let Err(err) = self.cache.save(&self.cache_key, cart, saved_at).await {
            warn!(?err, "Local cart cache write failed");
        }

        if let Some(identity) = &self.identity {
            match self.remote.store(identity, cart, saved_at).await {
                Ok(()) => {
                    self.synced_version.fetch_max(version, Ordering::SeqCst);
                }
                Err(err) => self.report_remote_error(&err),
            }
        }
    }

    fn report_remote_error(&self, err: &mostrador_api::ApiError) {
        if err.is_auth_failure() {
            self.notifier.notify(Notification::auth_expired());
        } else {
            self.notifier.warning(format!("Could not sync the cart: {err}"));
        }
    }
}

struct AdoptedCart {
    cart: Cart,
    saved_at: DateTime<Utc>,
    push_to_remote: bool,
}

// =============================================================================
// Local Writer
// =============================================================================

/// Ordered, immediate write-through to the local cache. A single task
/// keeps the writes in mutation order; consecutive queued snapshots
/// collapse to the newest one.
async fn run_local_writer(
    mut rx: mpsc::UnboundedReceiver<PendingSave>,
    cache: CartCacheRepository,
    cache_key: String,
) {
    while let Some(mut pending) = rx.recv().await {
        while let Ok(newer) = rx.try_recv() {
            pending = newer;
        }
        if let Err(err) = cache.save(&cache_key, &pending.cart, pending.saved_at).await {
            warn!(?err, "Local cart cache write failed");
        }
    }
    debug!("Local cart writer stopped");
}

// =============================================================================
// Remote Writer
// =============================================================================

/// Single-flight debounced writer for the remote tier.
struct RemoteWriter {
    rx: mpsc::UnboundedReceiver<PendingSave>,
    remote: Arc<dyn RemoteCartStore>,
    identity: String,
    debounce: Duration,
    notifier: Notifier,
    version: Arc<AtomicU64>,
    synced_version: Arc<AtomicU64>,
}

impl RemoteWriter {
    async fn run(mut self) {
        debug!(identity = %self.identity, "Remote cart writer started");

        'outer: while let Some(mut pending) = self.rx.recv().await {
            // absorb newer snapshots until the channel stays quiet for
            // one debounce window; every arrival restarts the timer
            loop {
                tokio::select! {
                    newer = self.rx.recv() => match newer {
                        Some(newer) => pending = newer,
                        None => {
                            self.write(pending).await;
                            break 'outer;
                        }
                    },
                    _ = tokio::time::sleep(self.debounce) => break,
                }
            }
            self.write(pending).await;
        }

        debug!("Remote cart writer stopped");
    }

    async fn write(&self, pending: PendingSave) {
        match self
            .remote
            .store(&self.identity, &pending.cart, pending.saved_at)
            .await
        {
            Ok(()) => {
                if self.version.load(Ordering::SeqCst) > pending.version {
                    // superseded while in flight; the newer snapshot is
                    // already queued and will overwrite this one
                    debug!(version = pending.version, "Remote cart write landed stale");
                } else {
                    debug!(version = pending.version, "Remote cart write acknowledged");
                }
                self.synced_version.fetch_max(pending.version, Ordering::SeqCst);
            }
            Err(err) => {
                if err.is_auth_failure() {
                    self.notifier.notify(Notification::auth_expired());
                } else {
                    self.notifier
                        .warning(format!("Could not sync the cart: {err}"));
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::ConflictPrompt;
    use mostrador_api::ApiError;
    use mostrador_cache::{Cache, CacheConfig};
    use mostrador_core::{Money, Product, Quantity, Rate};
    use std::sync::atomic::AtomicBool;
    use std::sync::Mutex;

    struct FakeRemote {
        snapshot: Mutex<Option<RemoteCartSnapshot>>,
        saves: Mutex<Vec<(String, Cart)>>,
        fail_fetch: AtomicBool,
        fail_store: AtomicBool,
    }

    impl FakeRemote {
        fn new(snapshot: Option<RemoteCartSnapshot>) -> Arc<Self> {
            Arc::new(FakeRemote {
                snapshot: Mutex::new(snapshot),
                saves: Mutex::new(Vec::new()),
                fail_fetch: AtomicBool::new(false),
                fail_store: AtomicBool::new(false),
            })
        }

        fn saves(&self) -> Vec<(String, Cart)> {
            self.saves.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteCartStore for FakeRemote {
        async fn fetch(&self) -> ApiResult<Option<RemoteCartSnapshot>> {
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(ApiError::Unreachable {
                    url: "https://pos.example.com".to_string(),
                });
            }
            Ok(self.snapshot.lock().unwrap().clone())
        }

        async fn store(
            &self,
            user_id: &str,
            cart: &Cart,
            _saved_at: DateTime<Utc>,
        ) -> ApiResult<()> {
            if self.fail_store.load(Ordering::SeqCst) {
                return Err(ApiError::Unreachable {
                    url: "https://pos.example.com".to_string(),
                });
            }
            self.saves.lock().unwrap().push((user_id.to_string(), cart.clone()));
            Ok(())
        }
    }

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
            available_to_sell: Quantity::from_f64(9.0),
            store_number: "BA001GC".to_string(),
            barcode: None,
            weight_grams: None,
        }
    }

    fn cart_with(ids: &[&str]) -> Cart {
        let mut cart = Cart::new();
        for id in ids {
            cart.add_product(&product(id), Quantity::ONE);
        }
        cart
    }

    async fn test_cache() -> Cache {
        Cache::open(CacheConfig::in_memory()).await.unwrap()
    }

    fn bridge(
        remote: Arc<FakeRemote>,
        cache: &Cache,
        identity: Option<&str>,
        policy: ConflictPolicy,
    ) -> (PersistenceBridge, tokio::sync::mpsc::UnboundedReceiver<Notification>) {
        let (notifier, rx) = Notifier::channel();
        let bridge = PersistenceBridge::start(
            remote,
            cache.carts(),
            identity.map(str::to_string),
            policy,
            Duration::from_millis(400),
            notifier,
        );
        (bridge, rx)
    }

    #[tokio::test]
    async fn test_hydrate_remote_wins() {
        let cache = test_cache().await;
        // local cache holds a different, older cart
        cache
            .carts()
            .save("u1", &cart_with(&["OLD"]), Utc::now())
            .await
            .unwrap();

        let remote_cart = cart_with(&["A", "B"]);
        let remote = FakeRemote::new(Some(RemoteCartSnapshot {
            cart: remote_cart.clone(),
            saved_at: Utc::now(),
        }));
        let (bridge, _rx) = bridge(remote, &cache, Some("u1"), ConflictPolicy::RemoteWins);

        let adopted = bridge.hydrate().await;
        assert_eq!(adopted, remote_cart);

        // the local cache now mirrors the remote copy
        let mirrored = cache.carts().load("u1").await.unwrap().unwrap();
        assert_eq!(mirrored.cart, remote_cart);
    }

    #[tokio::test]
    async fn test_hydrate_blank_remote_restores_local_and_pushes() {
        let cache = test_cache().await;
        let local_cart = cart_with(&["A"]);
        cache.carts().save("u1", &local_cart, Utc::now()).await.unwrap();

        let remote = FakeRemote::new(None);
        let (bridge, _rx) = bridge(remote.clone(), &cache, Some("u1"), ConflictPolicy::RemoteWins);

        let adopted = bridge.hydrate().await;
        assert_eq!(adopted, local_cart);

        // the restored cart was pushed back to the remote tier
        let saves = remote.saves();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].0, "u1");
        assert_eq!(saves[0].1, local_cart);
    }

    #[tokio::test]
    async fn test_hydrate_empty_everywhere_seeds_both_tiers() {
        let cache = test_cache().await;
        let remote = FakeRemote::new(None);
        let (bridge, _rx) = bridge(remote.clone(), &cache, Some("u1"), ConflictPolicy::RemoteWins);

        let adopted = bridge.hydrate().await;
        assert!(adopted.is_empty());

        assert_eq!(remote.saves().len(), 1);
        assert!(cache.carts().load("u1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_hydrate_remote_failure_degrades_to_local() {
        let cache = test_cache().await;
        let local_cart = cart_with(&["A"]);
        cache.carts().save("u1", &local_cart, Utc::now()).await.unwrap();

        let remote = FakeRemote::new(None);
        remote.fail_fetch.store(true, Ordering::SeqCst);
        let (bridge, mut rx) = bridge(remote, &cache, Some("u1"), ConflictPolicy::RemoteWins);

        let adopted = bridge.hydrate().await;
        assert_eq!(adopted, local_cart);

        // the failure surfaced as a warning, not an error return
        let notification = rx.recv().await.unwrap();
        assert_eq!(notification.level, crate::notify::NotificationLevel::Warning);
    }

    #[tokio::test]
    async fn test_rapid_saves_coalesce_into_one_remote_write() {
        let cache = test_cache().await;
        let remote = FakeRemote::new(None);
        let (bridge, _rx) = bridge(remote.clone(), &cache, Some("u1"), ConflictPolicy::RemoteWins);

        // quantity stepper mashing: five mutations inside the window
        for n in 1..=5 {
            let mut cart = Cart::new();
            for i in 0..n {
                cart.add_product(&product(&format!("P{i}")), Quantity::ONE);
            }
            bridge.schedule_save(&cart);
        }

        assert!(bridge.is_dirty());
        tokio::time::sleep(Duration::from_millis(600)).await;

        // one write, carrying the final state
        let saves = remote.saves();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].1.line_count(), 5);
        assert!(!bridge.is_dirty());
    }

    #[tokio::test]
    async fn test_anonymous_session_never_touches_remote() {
        let cache = test_cache().await;
        let remote = FakeRemote::new(None);
        let (bridge, _rx) = bridge(remote.clone(), &cache, None, ConflictPolicy::RemoteWins);

        let cart = cart_with(&["A"]);
        bridge.schedule_save(&cart);
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert!(remote.saves().is_empty());
        let local = cache.carts().load("anonymous").await.unwrap().unwrap();
        assert_eq!(local.cart, cart);
    }

    struct PickLocal;

    #[async_trait]
    impl ConflictPrompt for PickLocal {
        async fn choose(&self, _local: &ConflictSide, _remote: &ConflictSide) -> ConflictChoice {
            ConflictChoice::Local
        }
    }

    #[tokio::test]
    async fn test_prompt_may_choose_local_copy() {
        let cache = test_cache().await;
        let local_cart = cart_with(&["LOCAL"]);
        cache.carts().save("u1", &local_cart, Utc::now()).await.unwrap();

        let remote = FakeRemote::new(Some(RemoteCartSnapshot {
            cart: cart_with(&["REMOTE"]),
            saved_at: Utc::now(),
        }));
        let (bridge, _rx) = bridge(
            remote.clone(),
            &cache,
            Some("u1"),
            ConflictPolicy::Prompt(Arc::new(PickLocal)),
        );

        let adopted = bridge.hydrate().await;
        assert_eq!(adopted, local_cart);
        // the chosen local copy became the remote copy too
        assert_eq!(remote.saves().len(), 1);
        assert_eq!(remote.saves()[0].1, local_cart);
    }

    #[tokio::test]
    async fn test_save_now_bypasses_debounce() {
        let cache = test_cache().await;
        let remote = FakeRemote::new(None);
        let (bridge, _rx) = bridge(remote.clone(), &cache, Some("u1"), ConflictPolicy::RemoteWins);

        let cart = cart_with(&["A"]);
        bridge.save_now(&cart).await;

        assert_eq!(remote.saves().len(), 1);
        assert!(!bridge.is_dirty());
    }
}
