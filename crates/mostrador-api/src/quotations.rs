//! # Quotation Endpoints
//!
//! Creation and update of ERP quotations, the local (PDF) quotation
//! store, the quotation id sequence, and retrieval of both kinds for
//! the recovery flow.
//!
//! The quotation payload keeps the backend's legacy item keys
//! (`productId`, `precioLista`, `unidadMedida`): the ERP bridge reads
//! them positionally and the stored local quotations already use them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use mostrador_core::{quantity, Cart, CartLine, Money, Quantity, Rate};

use crate::catalog::decimal_value;
use crate::client::Backend;
use crate::clients::ClientRecord;
use crate::error::ApiResult;

/// Quotation subtype sent to the ERP when none is chosen explicitly.
pub const DEFAULT_QUOTATION_SUBTYPE: &str = "Caja";

/// Product id the ERP uses for freight lines; those never enter a cart.
const FREIGHT_PRODUCT_ID: &str = "350320";

// ---------------------------------------------------------------------------
// Wire records
// ---------------------------------------------------------------------------

/// One quotation line on the wire.
///
/// Outgoing payloads write prices as plain JSON numbers; stored/ERP
/// quotations come back with es-AR formatted strings. Both shapes parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationItemRecord {
    #[serde(rename = "productId")]
    pub product_id: String,

    #[serde(rename = "productName", default)]
    pub product_name: Option<String>,

    pub price: Option<Value>,

    #[serde(rename = "precioLista", default)]
    pub precio_lista: Option<Value>,

    pub quantity: f64,

    #[serde(default)]
    pub multiplo: Option<f64>,

    #[serde(rename = "unidadMedida", default)]
    pub unidad_medida: Option<String>,
}

impl QuotationItemRecord {
    pub fn from_line(line: &CartLine) -> Self {
        QuotationItemRecord {
            product_id: line.product_id.clone(),
            product_name: Some(line.name.clone()),
            price: Some(money_number(line.unit_price)),
            precio_lista: Some(money_number(line.list_price)),
            quantity: line.quantity.as_f64(),
            multiplo: Some(line.sale_multiple.as_f64()),
            unidad_medida: Some(line.unit_of_measure.clone()),
        }
    }

    /// Converts a stored quotation line back into a cart line.
    ///
    /// Stored quotations carry no tax rate; the general 21% applies
    /// until the post-load price refresh re-resolves the line against
    /// the store catalog.
    pub fn into_line(self) -> CartLine {
        let unit_price = Money::from_cents(decimal_value(self.price.as_ref()));
        let list_price = match self.precio_lista.as_ref() {
            Some(v) => Money::from_cents(decimal_value(Some(v))),
            None => unit_price,
        };

        CartLine {
            product_id: self.product_id,
            name: self.product_name.unwrap_or_else(|| "Producto".to_string()),
            unit_price,
            list_price,
            tax_rate: Rate::from_percent(21.0),
            quantity: Quantity::from_f64(self.quantity.max(0.0)),
            sale_multiple: quantity::sanitize_multiple(self.multiplo),
            unit_of_measure: self.unidad_medida.unwrap_or_else(|| "Un".to_string()),
            weight_grams: 0,
            available: true,
        }
    }

    /// Freight/service lines from the ERP are flagged, not loaded.
    pub fn is_freight(&self) -> bool {
        self.product_id == FREIGHT_PRODUCT_ID
            || self
                .product_name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains("flete"))
    }
}

fn money_number(money: Money) -> Value {
    Value::from(money.cents() as f64 / 100.0)
}

/// Cart portion of a quotation request.
#[derive(Debug, Clone, Serialize)]
pub struct QuotationCartPayload {
    pub items: Vec<QuotationItemRecord>,
    pub client: Option<ClientRecord>,
    pub observations: String,
}

impl QuotationCartPayload {
    /// Snapshots a cart into the wire shape. Every line is included:
    /// quotation totals always cover the full cart.
    pub fn from_cart(cart: &Cart) -> Self {
        QuotationCartPayload {
            items: cart.lines.iter().map(QuotationItemRecord::from_line).collect(),
            client: cart.client.as_ref().map(ClientRecord::from_client),
            observations: cart.observations.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErpQuotationRequest {
    cart: QuotationCartPayload,
    store_id: String,
    tipo_presupuesto: String,
}

#[derive(Debug, Deserialize)]
struct QuotationNumberPayload {
    quotation_number: String,
}

#[derive(Debug, Deserialize)]
struct NextQuotationIdPayload {
    quotation_id: String,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    #[serde(default)]
    #[allow(dead_code)]
    message: Option<String>,
}

/// Local quotation snapshot as stored by the backend.
#[derive(Debug, Clone, Serialize)]
pub struct LocalQuotationRequest {
    pub quotation_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub store_id: String,
    pub client: Option<ClientRecord>,
    pub items: Vec<QuotationItemRecord>,
    pub observations: String,
    pub timestamp: String,
}

/// Summary row for the quotation recovery list.
#[derive(Debug, Clone, Deserialize)]
pub struct QuotationSummary {
    pub quotation_id: Option<String>,
    pub timestamp: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
}

/// ERP quotation header status fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErpQuotationHeader {
    #[serde(rename = "SalesQuotationStatus", default)]
    pub status: String,

    #[serde(rename = "GeneratedSalesOrderNumber", default)]
    pub generated_sales_order: String,
}

/// A stored quotation (local or ERP) as returned by the detail
/// endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct QuotationRecord {
    pub quotation_id: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub store_id: Option<String>,

    #[serde(default)]
    pub client: Option<ClientRecord>,

    #[serde(default)]
    pub items: Vec<QuotationItemRecord>,

    #[serde(default)]
    pub observations: String,

    #[serde(default)]
    pub timestamp: Option<String>,

    /// Whether the ERP quotation contained freight/service lines that
    /// were stripped during retrieval.
    #[serde(default)]
    pub has_flete: bool,

    #[serde(default)]
    pub header: Option<ErpQuotationHeader>,
}

impl QuotationRecord {
    /// An ERP quotation already converted into a sales order.
    pub fn is_confirmed(&self) -> bool {
        self.header
            .as_ref()
            .is_some_and(|h| h.status == "Confirmed")
    }

    /// Sales order number, when the quotation was confirmed.
    pub fn generated_order(&self) -> Option<&str> {
        self.header
            .as_ref()
            .map(|h| h.generated_sales_order.as_str())
            .filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

impl Backend {
    /// Creates an ERP quotation from the cart; returns its number.
    pub async fn create_erp_quotation(
        &self,
        cart: &Cart,
        store_id: &str,
        subtype: &str,
    ) -> ApiResult<String> {
        let request = ErpQuotationRequest {
            cart: QuotationCartPayload::from_cart(cart),
            store_id: store_id.to_string(),
            tipo_presupuesto: subtype.to_string(),
        };
        let payload: QuotationNumberPayload =
            self.post_json("/api/create_quotation", &request).await?;
        Ok(payload.quotation_number)
    }

    /// Updates an existing ERP quotation in place; returns its number.
    pub async fn update_erp_quotation(
        &self,
        quotation_id: &str,
        cart: &Cart,
        store_id: &str,
        subtype: &str,
    ) -> ApiResult<String> {
        let request = ErpQuotationRequest {
            cart: QuotationCartPayload::from_cart(cart),
            store_id: store_id.to_string(),
            tipo_presupuesto: subtype.to_string(),
        };
        let payload: QuotationNumberPayload = self
            .put_json(&format!("/api/update_quotation/{quotation_id}"), &request)
            .await?;
        Ok(payload.quotation_number)
    }

    /// Draws the next id from the local quotation sequence ("P-...").
    pub async fn next_quotation_id(&self) -> ApiResult<String> {
        let payload: NextQuotationIdPayload =
            self.get_json("/api/generate_pdf_quotation_id", &[]).await?;
        Ok(payload.quotation_id)
    }

    /// Stores a local quotation snapshot.
    pub async fn save_local_quotation(&self, request: &LocalQuotationRequest) -> ApiResult<()> {
        let _: MessagePayload = self.post_json("/api/save_local_quotation", request).await?;
        Ok(())
    }

    /// Lists stored local quotations for the recovery modal.
    pub async fn local_quotations(&self) -> ApiResult<Vec<QuotationSummary>> {
        self.get_json("/api/local_quotations", &[]).await
    }

    /// Fetches one stored local quotation.
    pub async fn local_quotation(&self, quotation_id: &str) -> ApiResult<QuotationRecord> {
        self.get_json(&format!("/api/local_quotation/{quotation_id}"), &[])
            .await
    }

    /// Fetches an ERP quotation, repriced for the given store.
    pub async fn erp_quotation(
        &self,
        quotation_id: &str,
        store: &str,
    ) -> ApiResult<QuotationRecord> {
        self.get_json(
            &format!("/api/d365_quotation/{quotation_id}"),
            &[("store", store.to_string())],
        )
        .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mostrador_core::QuotationKind;

    fn sample_line() -> CartLine {
        CartLine {
            product_id: "105479".to_string(),
            name: "Agarradera Recta 45 cm".to_string(),
            unit_price: Money::from_cents(6_526_680),
            list_price: Money::from_cents(7_251_867),
            tax_rate: Rate::from_percent(21.0),
            quantity: Quantity::from_f64(2.0),
            sale_multiple: Quantity::ONE,
            unit_of_measure: "Un".to_string(),
            weight_grams: 900,
            available: true,
        }
    }

    #[test]
    fn test_outgoing_items_use_plain_numbers() {
        let record = QuotationItemRecord::from_line(&sample_line());
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["productId"], "105479");
        assert_eq!(json["price"], 65266.8);
        assert_eq!(json["precioLista"], 72518.67);
        assert_eq!(json["quantity"], 2.0);
        assert_eq!(json["unidadMedida"], "Un");
    }

    #[test]
    fn test_stored_items_parse_localized_prices() {
        let json = r#"{
            "productId": "105479",
            "productName": "Agarradera Recta 45 cm",
            "price": "65.266,80",
            "precioLista": "72.518,67",
            "quantity": 2.0,
            "multiplo": 1.0,
            "unidadMedida": "Un"
        }"#;

        let record: QuotationItemRecord = serde_json::from_str(json).unwrap();
        let line = record.into_line();

        assert_eq!(line.unit_price.cents(), 6_526_680);
        assert_eq!(line.list_price.cents(), 7_251_867);
        assert_eq!(line.quantity, Quantity::from_f64(2.0));
        assert!(line.available);
    }

    #[test]
    fn test_freight_detection() {
        let by_id = QuotationItemRecord {
            product_id: "350320".to_string(),
            product_name: Some("Servicio".to_string()),
            price: None,
            precio_lista: None,
            quantity: 1.0,
            multiplo: None,
            unidad_medida: None,
        };
        assert!(by_id.is_freight());

        let by_name = QuotationItemRecord {
            product_id: "999".to_string(),
            product_name: Some("FLETE Zona Sur".to_string()),
            ..by_id.clone()
        };
        assert!(by_name.is_freight());
    }

    #[test]
    fn test_confirmed_header_detection() {
        let json = r#"{
            "quotation_id": "VENT1-000123",
            "type": "d365",
            "header": {
                "SalesQuotationStatus": "Confirmed",
                "GeneratedSalesOrderNumber": "PV-000999"
            }
        }"#;
        let record: QuotationRecord = serde_json::from_str(json).unwrap();
        assert!(record.is_confirmed());
        assert_eq!(record.generated_order(), Some("PV-000999"));
    }

    #[test]
    fn test_payload_snapshots_every_line() {
        let mut cart = Cart::new();
        cart.lines.push(sample_line());
        let mut unavailable = sample_line();
        unavailable.product_id = "X".to_string();
        unavailable.available = false;
        cart.lines.push(unavailable);
        cart.quotation_kind = QuotationKind::New;

        let payload = QuotationCartPayload::from_cart(&cart);
        assert_eq!(payload.items.len(), 2);
    }
}
