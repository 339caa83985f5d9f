//! # mostrador-api: REST Backend Client
//!
//! Typed bindings for the quoting backend's REST contracts.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Backend Contracts                                 │
//! │                                                                         │
//! │  Backend (client.rs)                                                   │
//! │  ├── catalog.rs     GET /api/productos, /api/productos/by_code,        │
//! │  │                  /api/stock/{code}/{store}, /api/datos_tienda,      │
//! │  │                  /api/check_products_update                         │
//! │  ├── clients.rs     GET /api/clientes/search,                          │
//! │  │                  POST /api/clientes/create, /api/clientes/validate  │
//! │  ├── carts.rs       GET /api/user_info, GET/POST user cart store       │
//! │  └── quotations.rs  POST /api/create_quotation, PUT update,            │
//! │                     local quotation store, id sequence                 │
//! │                                                                         │
//! │  Locale-formatted prices are parsed into core types at this            │
//! │  boundary, exactly once. No retry layer: failures surface              │
//! │  immediately and the caller decides what the operator sees.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod carts;
pub mod catalog;
pub mod client;
pub mod clients;
pub mod error;
pub mod quotations;

// =============================================================================
// Re-exports
// =============================================================================

pub use carts::{RemoteCartSnapshot, UserInfo};
pub use catalog::{ProductRecord, StockRecord, StoreInfo};
pub use client::{normalize_base_url, Backend, DEFAULT_TIMEOUT};
pub use clients::{ClientRecord, ClientValidation, NewClient};
pub use error::{ApiError, ApiResult};
pub use quotations::{
    LocalQuotationRequest, QuotationCartPayload, QuotationItemRecord, QuotationRecord,
    QuotationSummary, DEFAULT_QUOTATION_SUBTYPE,
};
