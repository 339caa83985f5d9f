//! # Quotation Lifecycle
//!
//! Creates, loads and finalizes quotations, orchestrating cart
//! snapshots at each transition.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Quotation Lifecycle                                 │
//! │                                                                         │
//! │            finalize_erp()                save_local_pdf()               │
//! │  Cart ───────────────────► ERP quote       Cart ──► "P-..." id         │
//! │  (client required,         VENT1-...       (client optional)           │
//! │   non-empty)                  │               │                         │
//! │                               │               ▼                         │
//! │     bound cart re-finalizes   │        QuotationDocument               │
//! │     via PUT (same number) ◄───┘        (handed to the PDF             │
//! │                                         renderer)                      │
//! │                                               │                         │
//! │              after print/confirm ─────────────┴──► clear_and_flush()   │
//! │                                                                         │
//! │  load(id, kind):                                                       │
//! │  • confirmed ERP quotation → operator decides: reload as a NEW         │
//! │    unbound cart, or abort (state untouched)                            │
//! │  • freight lines stripped server-side → warning flag to acknowledge    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use mostrador_api::{
    ApiResult, Backend, ClientRecord, LocalQuotationRequest, QuotationCartPayload,
    QuotationItemRecord, QuotationRecord, QuotationSummary,
};
use mostrador_core::{
    compute_totals, quantity, Cart, CartLine, CartTotals, Client, CoreError, Money, QuotationKind,
    TotalsScope,
};

use crate::error::{SyncError, SyncResult};
use crate::session::CartSession;

// =============================================================================
// API Port
// =============================================================================

/// Port for the quotation endpoints.
#[async_trait]
pub trait QuotationApi: Send + Sync {
    async fn create(&self, cart: &Cart, store_id: &str, subtype: &str) -> ApiResult<String>;
    async fn update(
        &self,
        quotation_id: &str,
        cart: &Cart,
        store_id: &str,
        subtype: &str,
    ) -> ApiResult<String>;
    async fn next_local_id(&self) -> ApiResult<String>;
    async fn save_local(&self, request: &LocalQuotationRequest) -> ApiResult<()>;
    async fn list_local(&self) -> ApiResult<Vec<QuotationSummary>>;
    async fn fetch_local(&self, quotation_id: &str) -> ApiResult<QuotationRecord>;
    async fn fetch_erp(&self, quotation_id: &str, store: &str) -> ApiResult<QuotationRecord>;
}

#[async_trait]
impl QuotationApi for Backend {
    async fn create(&self, cart: &Cart, store_id: &str, subtype: &str) -> ApiResult<String> {
        self.create_erp_quotation(cart, store_id, subtype).await
    }

    async fn update(
        &self,
        quotation_id: &str,
        cart: &Cart,
        store_id: &str,
        subtype: &str,
    ) -> ApiResult<String> {
        self.update_erp_quotation(quotation_id, cart, store_id, subtype)
            .await
    }

    async fn next_local_id(&self) -> ApiResult<String> {
        self.next_quotation_id().await
    }

    async fn save_local(&self, request: &LocalQuotationRequest) -> ApiResult<()> {
        self.save_local_quotation(request).await
    }

    async fn list_local(&self) -> ApiResult<Vec<QuotationSummary>> {
        self.local_quotations().await
    }

    async fn fetch_local(&self, quotation_id: &str) -> ApiResult<QuotationRecord> {
        self.local_quotation(quotation_id).await
    }

    async fn fetch_erp(&self, quotation_id: &str, store: &str) -> ApiResult<QuotationRecord> {
        self.erp_quotation(quotation_id, store).await
    }
}

// =============================================================================
// Document Model
// =============================================================================

/// One printable quotation row.
#[derive(Debug, Clone)]
pub struct DocumentRow {
    pub product_id: String,
    pub name: String,
    /// Quantity with the unit display rule applied ("7.20" / "3").
    pub quantity_display: String,
    /// Equivalent box count for area units.
    pub boxes: Option<i64>,
    pub list_price: Money,
    pub unit_price: Money,
    pub unit_discount: Money,
    pub line_total: Money,
}

/// Everything the (external) PDF renderer needs for one quotation.
///
/// Totals always cover every line — a quotation is a commitment about
/// the whole cart, availability at the current store notwithstanding.
#[derive(Debug, Clone)]
pub struct QuotationDocument {
    pub quotation_id: String,
    pub store_id: String,
    pub branch_address: Option<String>,
    pub client: Option<Client>,
    pub observations: String,
    pub generated_at: chrono::DateTime<Utc>,
    pub rows: Vec<DocumentRow>,
    pub totals: CartTotals,
}

fn build_document(
    cart: &Cart,
    quotation_id: &str,
    store_id: &str,
    branch_address: Option<String>,
) -> QuotationDocument {
    let rows = cart
        .lines
        .iter()
        .map(|line| DocumentRow {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            quantity_display: quantity::format_quantity(line.quantity, &line.unit_of_measure),
            boxes: quantity::equivalent_boxes(
                line.quantity,
                line.sale_multiple,
                &line.unit_of_measure,
            ),
            list_price: line.list_price,
            unit_price: line.unit_price,
            unit_discount: line.unit_discount(),
            line_total: line.line_total(),
        })
        .collect();

    QuotationDocument {
        quotation_id: quotation_id.to_string(),
        store_id: store_id.to_string(),
        branch_address,
        client: cart.client.clone(),
        observations: cart.observations.clone(),
        generated_at: Utc::now(),
        rows,
        totals: compute_totals(cart, TotalsScope::AllLines),
    }
}

// =============================================================================
// Loaded Quotation
// =============================================================================

/// A fetched quotation, decoded but not yet applied to the session.
///
/// The caller inspects the decision flags first: a confirmed ERP
/// quotation may only be applied as a new cart (or not at all), and a
/// stripped freight line deserves an acknowledgment.
#[derive(Debug, Clone)]
pub struct LoadedQuotation {
    pub quotation_id: Option<String>,
    pub kind: QuotationKind,
    pub store_id: Option<String>,
    pub lines: Vec<CartLine>,
    pub client: Option<Client>,
    pub observations: String,

    /// The ERP already converted this quotation into a sales order.
    pub confirmed: bool,
    /// Sales order number, when confirmed.
    pub generated_order: Option<String>,
    /// Freight/service lines were stripped during retrieval.
    pub has_freight: bool,
}

// =============================================================================
// Service
// =============================================================================

/// Orchestrates quotation transitions against the backend.
pub struct QuotationService {
    api: Arc<dyn QuotationApi>,
}

impl QuotationService {
    pub fn new(api: Arc<dyn QuotationApi>) -> Self {
        QuotationService { api }
    }

    /// Preconditions shared by every finalize path. ERP quotations
    /// additionally require a client.
    fn ensure_quotable(cart: &Cart, require_client: bool) -> SyncResult<()> {
        if cart.is_empty() {
            return Err(SyncError::Core(CoreError::EmptyCart));
        }
        if require_client && cart.client.is_none() {
            return Err(SyncError::Core(CoreError::ClientRequired));
        }
        Ok(())
    }

    /// Creates an ERP quotation from the session cart — or updates the
    /// bound one in place — and binds the cart to the result.
    pub async fn finalize_erp(
        &self,
        session: &CartSession,
        store_id: &str,
        subtype: &str,
    ) -> SyncResult<String> {
        let cart = session.snapshot();
        Self::ensure_quotable(&cart, true)?;

        let number = match (&cart.quotation_kind, &cart.quotation_id) {
            (QuotationKind::Erp, Some(quotation_id)) => {
                info!(quotation_id = %quotation_id, "Updating bound ERP quotation");
                self.api.update(quotation_id, &cart, store_id, subtype).await?
            }
            _ => {
                info!("Creating ERP quotation");
                self.api.create(&cart, store_id, subtype).await?
            }
        };

        session.bind_quotation(number.clone(), QuotationKind::Erp);
        Ok(number)
    }

    /// Draws a fresh id from the quotation sequence, stores the local
    /// quotation snapshot, and returns the document for the PDF
    /// renderer. The cart stays bound until
    /// [`QuotationService::finalize_after_print`].
    pub async fn save_local_pdf(
        &self,
        session: &CartSession,
        store_id: &str,
        branch_address: Option<String>,
    ) -> SyncResult<(String, QuotationDocument)> {
        let cart = session.snapshot();
        Self::ensure_quotable(&cart, false)?;

        let quotation_id = self.api.next_local_id().await?;
        let payload = QuotationCartPayload::from_cart(&cart);
        let request = LocalQuotationRequest {
            quotation_id: quotation_id.clone(),
            kind: "local".to_string(),
            store_id: store_id.to_string(),
            client: payload.client,
            items: payload.items,
            observations: payload.observations,
            timestamp: Utc::now().to_rfc3339(),
        };
        self.api.save_local(&request).await?;

        session.bind_quotation(quotation_id.clone(), QuotationKind::Local);
        let document = build_document(&cart, &quotation_id, store_id, branch_address);
        Ok((quotation_id, document))
    }

    /// Renders the current cart as a document without persisting
    /// anything (print preview of an already-bound quotation).
    pub fn document_for(
        &self,
        session: &CartSession,
        quotation_id: &str,
        store_id: &str,
        branch_address: Option<String>,
    ) -> QuotationDocument {
        build_document(&session.snapshot(), quotation_id, store_id, branch_address)
    }

    /// Lists stored local quotations for the recovery modal.
    pub async fn list_local(&self) -> SyncResult<Vec<QuotationSummary>> {
        Ok(self.api.list_local().await?)
    }

    /// Fetches a quotation and decodes it into cart-ready pieces.
    /// Nothing is applied yet; the caller inspects the decision flags.
    pub async fn load(
        &self,
        quotation_id: &str,
        kind: QuotationKind,
        store: &str,
    ) -> SyncResult<LoadedQuotation> {
        let record = match kind {
            QuotationKind::Local => self.api.fetch_local(quotation_id).await?,
            QuotationKind::Erp => self.api.fetch_erp(quotation_id, store).await?,
            QuotationKind::New => {
                return Err(SyncError::InvalidConfig(
                    "A new quotation has nothing to load".to_string(),
                ))
            }
        };

        // local snapshots can still contain freight rows from older
        // versions; strip them the same way the ERP retrieval does
        let mut has_freight = record.has_flete;
        let confirmed = record.is_confirmed();
        let generated_order = record.generated_order().map(str::to_string);
        let lines: Vec<CartLine> = record
            .items
            .into_iter()
            .filter(|item| {
                if item.is_freight() {
                    has_freight = true;
                    false
                } else {
                    true
                }
            })
            .map(QuotationItemRecord::into_line)
            .collect();

        Ok(LoadedQuotation {
            confirmed,
            generated_order,
            quotation_id: record.quotation_id,
            kind,
            store_id: record.store_id,
            client: record.client.map(ClientRecord::into_client),
            observations: record.observations,
            lines,
            has_freight,
        })
    }

    /// Applies a loaded quotation to the session cart.
    ///
    /// `start_as_new` reloads the lines as an unbound cart (mandatory
    /// for confirmed quotations — the old number belongs to a sales
    /// order now). The caller follows up with a price refresh for the
    /// target store.
    pub fn apply_loaded(&self, session: &CartSession, loaded: LoadedQuotation, start_as_new: bool) {
        let unbind = start_as_new || loaded.confirmed;

        let mut cart = Cart::new();
        cart.lines = loaded.lines;
        cart.client = loaded.client;
        cart.set_observations(&loaded.observations);
        if !unbind {
            cart.quotation_id = loaded.quotation_id;
            cart.quotation_kind = loaded.kind;
        }

        session.replace_cart(cart);
    }

    /// After the quotation was printed (or the operator declined the
    /// print), the cart resets to its empty state on every tier.
    pub async fn finalize_after_print(&self, session: &CartSession) {
        session.clear_and_flush().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
