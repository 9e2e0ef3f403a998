//! Database models for allocations.

use crate::db::models::assets::Asset;
use crate::types::{AllocationId, AssetId, ClientId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An allocation row joined with the asset it references
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationWithAsset {
    pub id: AllocationId,
    pub client_id: ClientId,
    pub asset_id: AssetId,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub asset: Asset,
}

/// Request to create a new allocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationCreateDBRequest {
    pub client_id: ClientId,
    pub asset_id: AssetId,
    pub amount: Decimal,
}

/// Request to change the quantity held by an allocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationUpdateDBRequest {
    pub amount: Decimal,
}

/// Response from database for any allocation read or write
pub type AllocationDBResponse = AllocationWithAsset;
