//! Database models for assets.

use crate::types::AssetId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Database representation of an asset
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Asset {
    pub id: AssetId,
    pub name: String,
    pub value: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a new asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetCreateDBRequest {
    pub name: String,
    pub value: Decimal,
}

/// Request to update an asset.
///
/// `name` is only applied while no allocation references the asset; `value` always is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetUpdateDBRequest {
    pub name: String,
    pub value: Decimal,
}

/// Response from database after creating or updating an asset
pub type AssetDBResponse = Asset;
