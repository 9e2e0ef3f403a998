//! Database repository for clients.

use std::collections::HashMap;

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::clients::{
            Client, ClientCreateDBRequest, ClientDBResponse, ClientHolding, ClientUpdateDBRequest, ClientWithHoldings,
        },
    },
    types::{AssetId, ClientId},
};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

/// Filter for listing clients
#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    pub skip: i64,
    /// `None` lists every client
    pub limit: Option<i64>,
}

impl ClientFilter {
    pub fn new(skip: i64, limit: Option<i64>) -> Self {
        Self { skip, limit }
    }
}

#[derive(Debug, FromRow)]
struct HoldingRow {
    client_id: ClientId,
    asset_id: AssetId,
    asset_name: String,
    asset_value: Decimal,
    amount: Decimal,
}

pub struct Clients<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Clients<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// List clients, each with a flattened view of the assets it holds
    #[instrument(skip(self, filter), fields(skip = filter.skip, limit = ?filter.limit), err)]
    pub async fn list_with_holdings(&mut self, filter: &ClientFilter) -> Result<Vec<ClientWithHoldings>> {
        let clients = self.list(filter).await?;
        if clients.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<ClientId> = clients.iter().map(|c| c.id).collect();
        let rows = sqlx::query_as::<_, HoldingRow>(
            r#"
            SELECT al.client_id, al.asset_id, a.name AS asset_name, a.value AS asset_value, al.amount
            FROM allocations al
            JOIN assets a ON a.id = al.asset_id
            WHERE al.client_id = ANY($1)
            ORDER BY al.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut *self.db)
        .await?;

        let mut holdings: HashMap<ClientId, Vec<ClientHolding>> = HashMap::new();
        for row in rows {
            holdings.entry(row.client_id).or_default().push(ClientHolding {
                asset_id: row.asset_id,
                asset_name: row.asset_name,
                asset_value: row.asset_value,
                amount: row.amount,
            });
        }

        Ok(clients
            .into_iter()
            .map(|client| {
                let holdings = holdings.remove(&client.id).unwrap_or_default();
                ClientWithHoldings { client, holdings }
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Clients<'c> {
    type CreateRequest = ClientCreateDBRequest;
    type UpdateRequest = ClientUpdateDBRequest;
    type Response = ClientDBResponse;
    type Id = ClientId;
    type Filter = ClientFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name, email, status)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.email)
        .bind(request.status)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(client)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(client)
    }

    #[instrument(skip(self, filter), fields(skip = filter.skip, limit = ?filter.limit), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        // LIMIT NULL is LIMIT ALL in postgres
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT * FROM clients
            ORDER BY id
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(filter.skip)
        .bind(filter.limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(clients)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = $2, email = $3, status = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(request.status)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(client)
    }
}
