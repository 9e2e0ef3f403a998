//! API request/response models for allocations.

use crate::api::models::assets::AssetResponse;
use crate::db::models::allocations::AllocationDBResponse;
use crate::types::{AllocationId, AssetId, ClientId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for allocating an asset, referenced by its exact name, to a client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AllocationByName {
    #[validate(length(min = 1, message = "assetName is required"))]
    #[schema(example = "Fundo ABC")]
    pub asset_name: String,
    /// Quantity to hold, strictly positive
    #[validate(custom(function = "crate::api::validation::positive_decimal"))]
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 10.0)]
    pub amount: Decimal,
}

/// Request body for changing the quantity an allocation holds.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct AllocationAmountUpdate {
    #[validate(custom(function = "crate::api::validation::positive_decimal"))]
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 15.0)]
    pub amount: Decimal,
}

/// Allocation record returned by the API, with the asset it references.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResponse {
    pub id: AllocationId,
    pub client_id: ClientId,
    pub asset_id: AssetId,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 10.0)]
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub asset: AssetResponse,
}

impl From<AllocationDBResponse> for AllocationResponse {
    fn from(db: AllocationDBResponse) -> Self {
        Self {
            id: db.id,
            client_id: db.client_id,
            asset_id: db.asset_id,
            amount: db.amount,
            created_at: db.created_at,
            updated_at: db.updated_at,
            asset: db.asset.into(),
        }
    }
}

/// Body of `GET /clients/{client_id}/allocations`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientAllocationsResponse {
    pub client_name: String,
    pub allocations: Vec<AllocationResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_allocation_by_name_uses_camel_case() {
        let payload: AllocationByName = serde_json::from_value(json!({"assetName": "Fundo ABC", "amount": 10})).unwrap();
        assert_eq!(payload.asset_name, "Fundo ABC");
        assert_eq!(payload.amount, Decimal::from(10));
        assert!(payload.validate().is_ok());

        assert!(serde_json::from_value::<AllocationByName>(json!({"asset_name": "Fundo ABC", "amount": 10})).is_err());
    }

    #[test]
    fn test_non_positive_amounts_are_rejected() {
        let empty_name: AllocationByName = serde_json::from_value(json!({"assetName": "", "amount": 0})).unwrap();
        let errors = empty_name.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("asset_name"));
        assert!(errors.field_errors().contains_key("amount"));

        let update: AllocationAmountUpdate = serde_json::from_value(json!({"amount": -3})).unwrap();
        assert!(update.validate().is_err());
    }
}
