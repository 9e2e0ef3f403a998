//! API request/response models for assets.

use crate::db::models::assets::{AssetCreateDBRequest, AssetDBResponse, AssetUpdateDBRequest};
use crate::types::AssetId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating or replacing an asset.
///
/// On update, `name` is ignored once any allocation references the asset.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct AssetPayload {
    #[validate(length(min = 1, message = "name is required"))]
    #[schema(example = "Fundo ABC")]
    pub name: String,
    /// Current unit price, strictly positive
    #[validate(custom(function = "crate::api::validation::positive_decimal"))]
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 100.0)]
    pub value: Decimal,
}

impl From<AssetPayload> for AssetCreateDBRequest {
    fn from(payload: AssetPayload) -> Self {
        Self {
            name: payload.name,
            value: payload.value,
        }
    }
}

impl From<AssetPayload> for AssetUpdateDBRequest {
    fn from(payload: AssetPayload) -> Self {
        Self {
            name: payload.name,
            value: payload.value,
        }
    }
}

/// Asset record returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetResponse {
    pub id: AssetId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 100.0)]
    pub value: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AssetDBResponse> for AssetResponse {
    fn from(db: AssetDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            value: db.value,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_asset_payload_rules() {
        let valid: AssetPayload = serde_json::from_value(json!({"name": "Fundo ABC", "value": 100.0})).unwrap();
        assert!(valid.validate().is_ok());
        assert_eq!(valid.value, Decimal::from(100));

        for value in [0.0, -1.5] {
            let invalid: AssetPayload = serde_json::from_value(json!({"name": "Fundo ABC", "value": value})).unwrap();
            let errors = invalid.validate().unwrap_err();
            assert!(errors.field_errors().contains_key("value"));
        }
    }

    #[test]
    fn test_missing_value_fails_to_decode() {
        assert!(serde_json::from_value::<AssetPayload>(json!({"name": "Fundo ABC"})).is_err());
    }
}
