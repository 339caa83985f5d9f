//! # Catalog Endpoints
//!
//! Paginated product listings per store, exact barcode lookup, stock
//! detail, catalog freshness and store metadata.
//!
//! The backend serves prices and stock figures as es-AR formatted
//! strings ("65.266,80") — and, depending on the cache generation, some
//! numeric columns arrive as JSON numbers instead. Everything is parsed
//! into the fixed-point core types right here, once.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use mostrador_core::{quantity, Locale, Money, Product, Quantity, Rate, StockDetail};

use crate::client::Backend;
use crate::error::ApiResult;

// ---------------------------------------------------------------------------
// Value coercion
// ---------------------------------------------------------------------------

/// Parses a string-or-number JSON value as fixed-point hundredths.
/// Prices and stock figures share the backend's es-AR formatting, and
/// both are two-decimal fixed point.
pub(crate) fn decimal_value(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::String(s)) => Money::parse_or_zero(s, Locale::EsAr).cents(),
        Some(Value::Number(n)) => (n.as_f64().unwrap_or(0.0) * 100.0).round() as i64,
        _ => 0,
    }
}

/// Product/record ids come back as strings or bare numbers depending on
/// the cache column type; normalize to a string.
pub(crate) fn id_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Wire records
// ---------------------------------------------------------------------------

/// Raw catalog record as the listing endpoint serves it.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRecord {
    pub numero_producto: Value,
    pub nombre_producto: Option<String>,
    pub categoria_producto: Option<String>,
    pub grupo_cobertura: Option<String>,
    pub unidad_medida: Option<String>,
    pub precio_final_con_iva: Option<Value>,
    pub precio_final_con_descuento: Option<Value>,
    pub total_disponible_venta: Option<Value>,
    pub store_number: Option<String>,
    pub multiplo: Option<f64>,
    pub iva: Option<f64>,
    #[serde(rename = "pesoKg")]
    pub peso_kg: Option<f64>,
    pub barcode: Option<String>,
}

impl ProductRecord {
    /// Converts the wire record into the core product type.
    ///
    /// Fallback chain mirrors the listing contract: the discounted
    /// price is the selling price, the tax-inclusive list price backs
    /// it up, and a missing tax rate means the general 21% IVA.
    pub fn into_product(self) -> Product {
        let list_cents = decimal_value(self.precio_final_con_iva.as_ref());
        let sale_cents = match self.precio_final_con_descuento.as_ref() {
            Some(v) => decimal_value(Some(v)),
            None => list_cents,
        };

        Product {
            product_number: id_value(&self.numero_producto),
            name: self.nombre_producto.unwrap_or_else(|| "Producto".to_string()),
            category: self.categoria_producto.unwrap_or_default(),
            coverage_group: self.grupo_cobertura.unwrap_or_default(),
            unit_of_measure: self.unidad_medida.unwrap_or_else(|| "Un".to_string()),
            list_price: Money::from_cents(if list_cents != 0 { list_cents } else { sale_cents }),
            sale_price: Money::from_cents(sale_cents),
            tax_rate: Rate::from_percent(self.iva.unwrap_or(21.0)),
            sale_multiple: quantity::sanitize_multiple(self.multiplo),
            available_to_sell: Quantity::from_hundredths(decimal_value(
                self.total_disponible_venta.as_ref(),
            )),
            store_number: self.store_number.unwrap_or_default(),
            barcode: self.barcode,
            weight_grams: self.peso_kg.map(|kg| (kg * 1000.0).round() as i64),
        }
    }
}

/// Raw per-warehouse stock row.
#[derive(Debug, Clone, Deserialize)]
pub struct StockRecord {
    pub almacen_365: String,
    pub disponible_venta: Option<Value>,
    pub disponible_entrega: Option<Value>,
    pub comprometido: Option<Value>,
}

impl StockRecord {
    pub fn into_detail(self) -> StockDetail {
        StockDetail {
            warehouse: self.almacen_365,
            available_to_sell: Quantity::from_hundredths(decimal_value(
                self.disponible_venta.as_ref(),
            )),
            available_to_deliver: Quantity::from_hundredths(decimal_value(
                self.disponible_entrega.as_ref(),
            )),
            committed: Quantity::from_hundredths(decimal_value(self.comprometido.as_ref())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LastModifiedPayload {
    last_modified: f64,
}

/// Store metadata relevant to quoting.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreInfo {
    /// Branch address printed on quotation headers.
    #[serde(rename = "direccion_unidad_operativa", default)]
    pub address: Option<String>,
    #[serde(rename = "sitio_almacen_retiro", default)]
    pub site: Option<String>,
    #[serde(rename = "almacen_retiro", default)]
    pub pickup_warehouse: Option<String>,
}

#[derive(Debug, serde::Serialize)]
struct LastStorePayload<'a> {
    store_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct OkPayload {
    #[serde(default)]
    #[allow(dead_code)]
    ok: bool,
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

impl Backend {
    /// Fetches one page of the product catalog for a store.
    pub async fn products(
        &self,
        store: &str,
        page: u32,
        items_per_page: u32,
    ) -> ApiResult<Vec<Product>> {
        let records: Vec<ProductRecord> = self
            .get_json(
                "/api/productos",
                &[
                    ("store", store.to_string()),
                    ("page", page.to_string()),
                    ("items_per_page", items_per_page.to_string()),
                ],
            )
            .await?;

        Ok(records.into_iter().map(ProductRecord::into_product).collect())
    }

    /// Looks up a product by exact barcode/code for a store.
    /// The backend answers with an array of zero or one records.
    pub async fn product_by_code(&self, code: &str, store: &str) -> ApiResult<Option<Product>> {
        let mut records: Vec<ProductRecord> = self
            .get_json(
                "/api/productos/by_code",
                &[("code", code.to_string()), ("store", store.to_string())],
            )
            .await?;

        if records.len() > 1 {
            warn!(code = %code, count = records.len(), "Barcode lookup returned multiple records");
        }
        let first = records.drain(..).next().map(ProductRecord::into_product);
        Ok(first)
    }

    /// Per-warehouse stock breakdown for a product at a store.
    pub async fn stock_detail(&self, code: &str, store: &str) -> ApiResult<Vec<StockDetail>> {
        let records: Vec<StockRecord> = self
            .get_json(&format!("/api/stock/{code}/{store}"), &[])
            .await?;
        Ok(records.into_iter().map(StockRecord::into_detail).collect())
    }

    /// Timestamp of the last catalog refresh; the catalog view polls
    /// this to know when to reload.
    pub async fn catalog_last_modified(&self) -> ApiResult<f64> {
        let payload: LastModifiedPayload = self.get_json("/api/check_products_update", &[]).await?;
        Ok(payload.last_modified)
    }

    /// Store metadata (branch address) for quotation headers.
    pub async fn store_info(&self, store_id: &str) -> ApiResult<StoreInfo> {
        self.get_json(&format!("/api/datos_tienda/{store_id}"), &[])
            .await
    }

    /// Records the operator's selected store on the session.
    pub async fn update_last_store(&self, store_id: &str) -> ApiResult<()> {
        let _: OkPayload = self
            .post_json("/api/update_last_store", &LastStorePayload { store_id })
            .await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
