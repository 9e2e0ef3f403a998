//! Database repository for allocations.
//!
//! Allocations are never returned on their own: every read and write yields the row joined
//! with the asset it references.

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::{
            allocations::{AllocationCreateDBRequest, AllocationDBResponse, AllocationUpdateDBRequest, AllocationWithAsset},
            assets::Asset,
        },
    },
    types::{AllocationId, AssetId, ClientId},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

/// Filter for listing allocations. Allocations are only ever listed per client.
#[derive(Debug, Clone)]
pub struct AllocationFilter {
    pub client_id: ClientId,
}

impl AllocationFilter {
    pub fn for_client(client_id: ClientId) -> Self {
        Self { client_id }
    }
}

/// Allocation row with its asset's columns prefixed by `asset_`
#[derive(Debug, FromRow)]
struct AllocationRow {
    id: AllocationId,
    client_id: ClientId,
    asset_id: AssetId,
    amount: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    asset_name: String,
    asset_value: Decimal,
    asset_created_at: DateTime<Utc>,
    asset_updated_at: DateTime<Utc>,
}

impl From<AllocationRow> for AllocationWithAsset {
    fn from(row: AllocationRow) -> Self {
        Self {
            id: row.id,
            client_id: row.client_id,
            asset_id: row.asset_id,
            amount: row.amount,
            created_at: row.created_at,
            updated_at: row.updated_at,
            asset: Asset {
                id: row.asset_id,
                name: row.asset_name,
                value: row.asset_value,
                created_at: row.asset_created_at,
                updated_at: row.asset_updated_at,
            },
        }
    }
}

/// Columns selected from `al` (allocations) joined with `a` (assets)
const JOINED_COLUMNS: &str = r#"
    al.id, al.client_id, al.asset_id, al.amount, al.created_at, al.updated_at,
    a.name AS asset_name, a.value AS asset_value,
    a.created_at AS asset_created_at, a.updated_at AS asset_updated_at
"#;

pub struct Allocations<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Allocations<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Allocations<'c> {
    type CreateRequest = AllocationCreateDBRequest;
    type UpdateRequest = AllocationUpdateDBRequest;
    type Response = AllocationDBResponse;
    type Id = AllocationId;
    type Filter = AllocationFilter;

    #[instrument(skip(self, request), fields(client_id = request.client_id, asset_id = request.asset_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let query = format!(
            r#"
            WITH al AS (
                INSERT INTO allocations (client_id, asset_id, amount)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT {JOINED_COLUMNS}
            FROM al
            JOIN assets a ON a.id = al.asset_id
            "#
        );

        let row = sqlx::query_as::<_, AllocationRow>(&query)
            .bind(request.client_id)
            .bind(request.asset_id)
            .bind(request.amount)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(row.into())
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let query = format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM allocations al
            JOIN assets a ON a.id = al.asset_id
            WHERE al.id = $1
            "#
        );

        let row = sqlx::query_as::<_, AllocationRow>(&query)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, filter), fields(client_id = filter.client_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let query = format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM allocations al
            JOIN assets a ON a.id = al.asset_id
            WHERE al.client_id = $1
            ORDER BY al.id
            "#
        );

        let rows = sqlx::query_as::<_, AllocationRow>(&query)
            .bind(filter.client_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM allocations WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Change the amount held. Client and asset of an allocation never change.
    #[instrument(skip(self, request), fields(amount = %request.amount), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let query = format!(
            r#"
            WITH al AS (
                UPDATE allocations
                SET amount = $2, updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT {JOINED_COLUMNS}
            FROM al
            JOIN assets a ON a.id = al.asset_id
            "#
        );

        let row = sqlx::query_as::<_, AllocationRow>(&query)
            .bind(id)
            .bind(request.amount)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(row.into())
    }
}
