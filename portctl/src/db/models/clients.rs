//! Database models for clients.

use crate::types::{AssetId, ClientId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Database representation of a client
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub email: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a new client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCreateDBRequest {
    pub name: String,
    pub email: String,
    pub status: bool,
}

/// Full replacement of a client's mutable fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientUpdateDBRequest {
    pub name: String,
    pub email: String,
    pub status: bool,
}

/// One asset a client holds, flattened for the client listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientHolding {
    pub asset_id: AssetId,
    pub asset_name: String,
    pub asset_value: Decimal,
    pub amount: Decimal,
}

/// A client together with everything it holds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientWithHoldings {
    pub client: Client,
    pub holdings: Vec<ClientHolding>,
}

/// Response from database after creating or updating a client
pub type ClientDBResponse = Client;
