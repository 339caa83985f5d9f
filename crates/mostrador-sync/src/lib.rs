//! # mostrador-sync: Session Engine
//!
//! Orchestrates the three cart storage tiers (memory, local cache,
//! remote backend) and the quotation lifecycle.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Session Engine                                   │
//! │                                                                         │
//! │  UI events                                                             │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  CartSession ──(named mutations, synchronous)──► Cart (in memory)      │
//! │      │                                                                  │
//! │      ▼ fire-and-forget                                                  │
//! │  PersistenceBridge                                                     │
//! │      ├── immediate write-through ──► mostrador-cache (SQLite)          │
//! │      └── debounced single-flight ──► mostrador-api (REST backend)      │
//! │                                                                         │
//! │  QuotationService ── snapshots the cart at each lifecycle transition   │
//! │  IdentityResolver ── session identity with last-known fallback         │
//! │  Notifier ───────── failures become operator-visible toasts            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`session`] - The session cart store (named mutations)
//! - [`bridge`] - Multi-tier persistence with debounce and LWW
//! - [`conflict`] - Divergence detection and the remote-wins policy
//! - [`quotation`] - Quotation create/load/finalize orchestration
//! - [`identity`] - Operator identity resolution
//! - [`notify`] - Operator notification channel
//! - [`config`] - Layered session configuration
//! - [`error`] - Session error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bridge;
pub mod config;
pub mod conflict;
pub mod error;
pub mod identity;
pub mod notify;
pub mod quotation;
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================

pub use bridge::{PersistenceBridge, RemoteCartStore};
pub use config::{ConflictPolicyKind, SessionConfig, DEFAULT_DEBOUNCE_MS};
pub use conflict::{ConflictChoice, ConflictPolicy, ConflictPrompt, ConflictSide};
pub use error::{SyncError, SyncResult};
pub use identity::{cache_key, IdentityProvider, IdentityResolver};
pub use notify::{Notification, NotificationLevel, Notifier};
pub use quotation::{
    DocumentRow, LoadedQuotation, QuotationApi, QuotationDocument, QuotationService,
};
pub use session::CartSession;
