//! Database repository for assets.
//!
//! Besides plain CRUD, this repository owns the rule that an asset's name is frozen once any
//! allocation references it. [`Repository::update`] row-locks the asset before deciding, and
//! [`Assets::get_first_by_name`] share-locks it for the allocation being written, so a
//! concurrent allocation cannot slip in between the check and the write.

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::assets::{Asset, AssetCreateDBRequest, AssetDBResponse, AssetUpdateDBRequest},
    },
    types::AssetId,
};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing assets. Assets are always listed in full, ordered by id.
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {}

pub struct Assets<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Assets<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Resolve an asset by exact name. Names are not unique; the lowest id wins.
    ///
    /// The matched row is share-locked until the surrounding transaction ends, so the asset
    /// cannot be renamed while an allocation against it is being written.
    #[instrument(skip(self), err)]
    pub async fn get_first_by_name(&mut self, name: &str) -> Result<Option<AssetDBResponse>> {
        let asset = sqlx::query_as::<_, Asset>(
            r#"
            SELECT * FROM assets
            WHERE name = $1
            ORDER BY id
            LIMIT 1
            FOR SHARE
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(asset)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Assets<'c> {
    type CreateRequest = AssetCreateDBRequest;
    type UpdateRequest = AssetUpdateDBRequest;
    type Response = AssetDBResponse;
    type Id = AssetId;
    type Filter = AssetFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let asset = sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (name, value)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(request.value)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(asset)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let asset = sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(asset)
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let assets = sqlx::query_as::<_, Asset>("SELECT * FROM assets ORDER BY id")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(assets)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Update an asset. The name is kept as-is while allocations reference the asset.
    ///
    /// The row lock waits out any transaction that has share-locked the asset through
    /// [`Assets::get_first_by_name`], and the update statement runs on a fresh snapshot that sees
    /// allocations it committed. Call inside a transaction.
    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        sqlx::query_scalar::<_, AssetId>("SELECT id FROM assets WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        let asset = sqlx::query_as::<_, Asset>(
            r#"
            UPDATE assets
            SET
                name = CASE
                    WHEN EXISTS (SELECT 1 FROM allocations WHERE asset_id = $1) THEN name
                    ELSE $2
                END,
                value = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(request.value)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(asset)
    }
}
