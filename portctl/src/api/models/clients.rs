//! API request/response models for clients.

use crate::db::models::clients::{ClientCreateDBRequest, ClientDBResponse, ClientHolding, ClientUpdateDBRequest, ClientWithHoldings};
use crate::types::{AssetId, ClientId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Query parameters for listing clients
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ListClientsQuery {
    /// Number of clients to skip
    pub skip: Option<i64>,
    /// Maximum number of clients to return (all when omitted)
    pub limit: Option<i64>,
}

/// Request body for creating or replacing a client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct ClientPayload {
    #[validate(length(min = 1, message = "name is required"))]
    #[schema(example = "João Marcos Silva")]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    #[schema(example = "joaomarcos@example.com")]
    pub email: String,
    /// Whether the client is active
    pub status: bool,
}

impl From<ClientPayload> for ClientCreateDBRequest {
    fn from(payload: ClientPayload) -> Self {
        Self {
            name: payload.name,
            email: payload.email,
            status: payload.status,
        }
    }
}

impl From<ClientPayload> for ClientUpdateDBRequest {
    fn from(payload: ClientPayload) -> Self {
        Self {
            name: payload.name,
            email: payload.email,
            status: payload.status,
        }
    }
}

/// Client record returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    pub id: ClientId,
    pub name: String,
    pub email: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ClientDBResponse> for ClientResponse {
    fn from(db: ClientDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            email: db.email,
            status: db.status,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// An asset held by a client, as shown in the client listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientAssetHolding {
    pub asset_id: AssetId,
    pub asset_name: String,
    /// Current unit price of the asset
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 100.0)]
    pub asset_value: Decimal,
    /// Quantity held
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 10.0)]
    pub amount: Decimal,
}

impl From<ClientHolding> for ClientAssetHolding {
    fn from(holding: ClientHolding) -> Self {
        Self {
            asset_id: holding.asset_id,
            asset_name: holding.asset_name,
            asset_value: holding.asset_value,
            amount: holding.amount,
        }
    }
}

/// Entry of `GET /clients`: the client plus a summary of its allocations.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub id: ClientId,
    pub name: String,
    pub email: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Number of allocations the client holds
    pub allocations_count: usize,
    pub assets: Vec<ClientAssetHolding>,
}

impl From<ClientWithHoldings> for ClientSummary {
    fn from(db: ClientWithHoldings) -> Self {
        let ClientWithHoldings { client, holdings } = db;
        Self {
            id: client.id,
            name: client.name,
            email: client.email,
            status: client.status,
            created_at: client.created_at,
            updated_at: client.updated_at,
            allocations_count: holdings.len(),
            assets: holdings.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_payload_rules() {
        let valid: ClientPayload =
            serde_json::from_value(json!({"name": "João", "email": "joao@x.com", "status": true})).unwrap();
        assert!(valid.validate().is_ok());

        let invalid: ClientPayload =
            serde_json::from_value(json!({"name": "", "email": "not-an-email", "status": false})).unwrap();
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_status_must_be_boolean() {
        let result = serde_json::from_value::<ClientPayload>(json!({"name": "João", "email": "joao@x.com", "status": "yes"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let now = Utc::now();
        let summary = ClientSummary::from(ClientWithHoldings {
            client: ClientDBResponse {
                id: 1,
                name: "João".to_string(),
                email: "joao@x.com".to_string(),
                status: true,
                created_at: now,
                updated_at: now,
            },
            holdings: vec![ClientHolding {
                asset_id: 7,
                asset_name: "Fundo ABC".to_string(),
                asset_value: Decimal::new(1000, 1),
                amount: Decimal::from(10),
            }],
        });

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["allocationsCount"], 1);
        assert_eq!(value["assets"][0]["assetId"], 7);
        assert_eq!(value["assets"][0]["assetName"], "Fundo ABC");
        assert_eq!(value["assets"][0]["assetValue"], 100.0);
        assert_eq!(value["assets"][0]["amount"], 10.0);
    }
}
