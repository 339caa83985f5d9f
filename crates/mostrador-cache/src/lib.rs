//! # mostrador-cache: Local Durable Tier
//!
//! SQLite-backed local storage for the persistence bridge: one cart
//! snapshot per user identity, plus the global UI preference store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Cart Persistence Tiers                                │
//! │                                                                         │
//! │  In-memory Cart (mostrador-core)                                       │
//! │       │ every mutation                                                  │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────┐   debounced   ┌─────────────────────────┐ │
//! │  │  mostrador-cache        │◄──────────────│  mostrador-sync bridge  │ │
//! │  │  (THIS CRATE)           │   write-through│  (orchestrator)        │ │
//! │  │                         │               └───────────┬─────────────┘ │
//! │  │  user_carts             │                           │ debounced     │
//! │  │  preferences            │                           ▼               │
//! │  └─────────────────────────┘               ┌─────────────────────────┐ │
//! │                                            │  remote backend         │ │
//! │   Failures here are logged and             │  (mostrador-api)        │ │
//! │   non-fatal: the session continues         └─────────────────────────┘ │
//! │   with memory-only state.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and embedded migrations
//! - [`carts`] - Per-user cart snapshot repository
//! - [`prefs`] - Global preference repository (theme, last store)
//! - [`error`] - Cache error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod carts;
pub mod error;
pub mod pool;
pub mod prefs;

// =============================================================================
// Re-exports
// =============================================================================

pub use carts::{CartCacheRepository, CartSnapshot};
pub use error::{CacheError, CacheResult};
pub use pool::{Cache, CacheConfig};
pub use prefs::PreferenceRepository;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Sentinel user id for sessions with no resolved identity.
/// Only the local tier uses it; the remote tier requires a real identity.
pub const ANONYMOUS_USER: &str = "anonymous";
