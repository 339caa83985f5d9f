//! # mostrador-core: Pure Business Logic for the Mostrador Quoting Terminal
//!
//! This crate is the **heart** of Mostrador. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Mostrador Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Browser front end (server-rendered)             │   │
//! │  │    Catalog UI ──► Cart panel ──► Payment sim ──► Quotation     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ mostrador-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌──────────┐ ┌────────┐ ┌─────────┐ ┌──────────┐ │   │
//! │  │  │  money  │ │ quantity │ │  cart  │ │ totals  │ │ payments │ │   │
//! │  │  │ Money   │ │ ceiling  │ │ merge  │ │ scope   │ │surcharge │ │   │
//! │  │  │ Rate    │ │ rule     │ │ guard  │ │ flag    │ │ balance  │ │   │
//! │  │  └─────────┘ └──────────┘ └────────┘ └─────────┘ └──────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │   mostrador-cache (SQLite) · mostrador-api (REST) ·            │   │
//! │  │   mostrador-sync (persistence bridge, quotations)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Client, PaymentEntry, ...)
//! - [`money`] - Integer-cent money, basis-point rates, locale parsing
//! - [`quantity`] - Sale-multiple normalization (the ceiling rule)
//! - [`cart`] - The cart aggregate and its mutation operations
//! - [`totals`] - Subtotal/tax/discount/shipping/total derivation
//! - [`payments`] - Payment-simulation reconciliation
//! - [`catalog`] - Pure catalog filtering/sorting/pagination
//! - [`validation`] - Input validation rules
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer math**: cents, hundredths and basis points - no float drift
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod payments;
pub mod quantity;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use mostrador_core::Money` instead of
// `use mostrador_core::money::Money`

pub use cart::{Cart, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Locale, Money, Rate};
pub use quantity::Quantity;
pub use totals::{compute_totals, CartTotals, TotalsScope};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of the cart observations field, in characters.
/// The quotation layout reserves a fixed-height box for this text.
pub const MAX_OBSERVATION_LEN: usize = 180;

/// Minimum length of a client directory search query.
/// Shorter queries would sweep most of the directory on every keystroke.
pub const MIN_CLIENT_QUERY_LEN: usize = 3;

/// Store assumed when no store has ever been selected.
pub const DEFAULT_STORE: &str = "BA001GC";
