//! # Client Directory Endpoints
//!
//! Search, creation and tax-id validation against the client directory
//! (backed by the ERP). Search matches on tax id or client number and
//! returns at most a handful of records; the UI enforces the 3-character
//! minimum before calling.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use mostrador_core::Client;

use crate::client::Backend;
use crate::error::ApiResult;

// ---------------------------------------------------------------------------
// Wire records
// ---------------------------------------------------------------------------

/// Raw directory record with the backend's legacy field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    pub numero_cliente: Value,
    pub nombre_cliente: Option<String>,
    pub nif: Option<Value>,
    pub direccion_completa: Option<String>,
    pub email_contacto: Option<String>,
    pub telefono_contacto: Option<String>,
}

fn text_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Placeholder the backend uses for unknown contact fields.
fn non_placeholder(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != "N/A")
}

impl ClientRecord {
    pub fn into_client(self) -> Client {
        Client {
            client_number: text_value(Some(&self.numero_cliente)),
            name: self.nombre_cliente.unwrap_or_else(|| "Cliente".to_string()),
            tax_id: text_value(self.nif.as_ref()),
            address: self.direccion_completa.unwrap_or_default(),
            email: non_placeholder(self.email_contacto),
            phone: non_placeholder(self.telefono_contacto),
        }
    }

    /// Builds the wire form of a core client (for quotation payloads).
    pub fn from_client(client: &Client) -> Self {
        ClientRecord {
            numero_cliente: Value::String(client.client_number.clone()),
            nombre_cliente: Some(client.name.clone()),
            nif: Some(Value::String(client.tax_id.clone())),
            direccion_completa: Some(client.address.clone()),
            email_contacto: client.email.clone(),
            telefono_contacto: client.phone.clone(),
        }
    }
}

/// Fields the directory requires to create a client.
#[derive(Debug, Clone, Serialize)]
pub struct NewClient {
    pub nombre: String,
    pub apellido: String,
    pub dni: String,
    pub email: String,
    pub telefono: String,
    pub codigo_postal: String,
    pub ciudad: String,
    pub estado: String,
    pub condado: String,
    pub calle: String,
    pub altura: String,
}

#[derive(Debug, Deserialize)]
struct CreatedPayload {
    customer_id: String,
}

#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    dni: &'a str,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    exists: bool,
    #[serde(default)]
    client: Option<ClientRecord>,
}

/// Outcome of a tax-id validation.
#[derive(Debug, Clone)]
pub enum ClientValidation {
    /// A client with this tax id already exists.
    Exists(Option<Client>),
    /// No client with this tax id.
    Unknown,
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

impl Backend {
    /// Searches the client directory (matches tax id or client number).
    pub async fn search_clients(&self, query: &str) -> ApiResult<Vec<Client>> {
        let records: Vec<ClientRecord> = self
            .get_json("/api/clientes/search", &[("query", query.to_string())])
            .await?;
        Ok(records.into_iter().map(ClientRecord::into_client).collect())
    }

    /// Creates a client in the directory; returns the new client number.
    pub async fn create_client(&self, new_client: &NewClient) -> ApiResult<String> {
        let created: CreatedPayload = self.post_json("/api/clientes/create", new_client).await?;
        Ok(created.customer_id)
    }

    /// Checks whether a client with the given tax id already exists.
    pub async fn validate_client(&self, tax_id: &str) -> ApiResult<ClientValidation> {
        let response: ValidateResponse = self
            .post_json("/api/clientes/validate", &ValidateRequest { dni: tax_id })
            .await?;

        Ok(if response.exists {
            ClientValidation::Exists(response.client.map(ClientRecord::into_client))
        } else {
            ClientValidation::Unknown
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_record_parsing() {
        let json = r#"{
            "numero_cliente": "CL-0042",
            "nombre_cliente": "García, Marta",
            "nif": 20123456789,
            "direccion_completa": "Av. Rivadavia 1234, CABA",
            "email_contacto": "N/A",
            "telefono_contacto": "+54 11 5555-0000"
        }"#;

        let record: ClientRecord = serde_json::from_str(json).unwrap();
        let client = record.into_client();

        assert_eq!(client.client_number, "CL-0042");
        assert_eq!(client.tax_id, "20123456789");
        // "N/A" placeholders collapse to None
        assert!(client.email.is_none());
        assert_eq!(client.phone.as_deref(), Some("+54 11 5555-0000"));
    }

    #[test]
    fn test_client_wire_round_trip() {
        let client = Client {
            client_number: "CL-1".to_string(),
            name: "Consumidor Final".to_string(),
            tax_id: "11111111".to_string(),
            address: "Sucursal Central".to_string(),
            email: None,
            phone: None,
        };

        let back = ClientRecord::from_client(&client).into_client();
        assert_eq!(back, client);
    }
}
