use crate::api::models::allocations::{AllocationAmountUpdate, AllocationResponse};
use crate::api::models::assets::{AssetPayload, AssetResponse};
use crate::api::validation::{Path, ValidatedJson};
use crate::db::errors::DbError;
use crate::db::handlers::{Allocations, Assets, Repository, assets::AssetFilter};
use crate::db::models::allocations::AllocationUpdateDBRequest;
use crate::db::models::assets::{AssetCreateDBRequest, AssetUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{AllocationId, AssetId, Operation};
use crate::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/assets",
    tag = "assets",
    summary = "List assets",
    responses(
        (status = 200, description = "All assets", body = Vec<AssetResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_assets(State(state): State<AppState>) -> Result<Json<Vec<AssetResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Assets::new(&mut pool_conn);

    let assets = repo.list(&AssetFilter::default()).await?;
    Ok(Json(assets.into_iter().map(AssetResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/assets",
    tag = "assets",
    summary = "Create asset",
    request_body = AssetPayload,
    responses(
        (status = 201, description = "Asset created", body = AssetResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_asset(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AssetPayload>,
) -> Result<(StatusCode, Json<AssetResponse>)> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Assets::new(&mut pool_conn);

    let asset = repo.create(&AssetCreateDBRequest::from(payload)).await?;
    Ok((StatusCode::CREATED, Json(AssetResponse::from(asset))))
}

#[utoipa::path(
    put,
    path = "/assets/{asset_id}",
    tag = "assets",
    summary = "Replace asset",
    description = "Updates name and value. Once any allocation references the asset its name is frozen: \
                   the submitted name is ignored and only the value changes.",
    request_body = AssetPayload,
    params(
        ("asset_id" = i64, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Asset updated", body = AssetResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Asset not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_asset(
    State(state): State<AppState>,
    Path(id): Path<AssetId>,
    ValidatedJson(payload): ValidatedJson<AssetPayload>,
) -> Result<Json<AssetResponse>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let asset = match Assets::new(&mut tx).update(id, &AssetUpdateDBRequest::from(payload)).await {
        Ok(asset) => asset,
        Err(DbError::NotFound) => return Err(Error::not_found("Asset", id)),
        Err(e) => return Err(e.into()),
    };

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    Ok(Json(AssetResponse::from(asset)))
}

#[utoipa::path(
    delete,
    path = "/assets/{asset_id}",
    tag = "assets",
    summary = "Delete asset",
    description = "Assets referenced by allocations cannot be deleted.",
    params(
        ("asset_id" = i64, Path, description = "Asset ID")
    ),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 404, description = "Asset not found"),
        (status = 409, description = "Asset is still allocated"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_asset(State(state): State<AppState>, Path(id): Path<AssetId>) -> Result<StatusCode> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Assets::new(&mut pool_conn);

    match repo.delete(id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(Error::not_found("Asset", id)),
        Err(err @ DbError::ForeignKeyViolation { .. }) => {
            tracing::debug!("Refusing to delete asset {}: {}", id, err);
            Err(Error::still_allocated(Operation::Delete, "asset", id))
        }
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    put,
    path = "/assets/allocations/{allocation_id}",
    tag = "assets",
    summary = "Update allocation amount",
    request_body = AllocationAmountUpdate,
    params(
        ("allocation_id" = i64, Path, description = "Allocation ID")
    ),
    responses(
        (status = 200, description = "Allocation updated", body = AllocationResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Allocation not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_allocation_amount(
    State(state): State<AppState>,
    Path(id): Path<AllocationId>,
    ValidatedJson(payload): ValidatedJson<AllocationAmountUpdate>,
) -> Result<Json<AllocationResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Allocations::new(&mut pool_conn);

    match repo.update(id, &AllocationUpdateDBRequest { amount: payload.amount }).await {
        Ok(allocation) => Ok(Json(AllocationResponse::from(allocation))),
        Err(DbError::NotFound) => Err(Error::not_found("Allocation", id)),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::allocations::AllocationResponse;
    use crate::api::models::assets::AssetResponse;
    use crate::db::handlers::{Allocations, Assets, Repository};
    use crate::db::models::allocations::AllocationCreateDBRequest;
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use rust_decimal::Decimal;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_list_assets(pool: PgPool) {
        let app = create_test_app(pool).await;

        let response = app.post("/assets").json(&json!({"name": "Fundo ABC", "value": 100.0})).await;
        response.assert_status(StatusCode::CREATED);
        let created: AssetResponse = response.json();
        assert_eq!(created.name, "Fundo ABC");
        assert_eq!(created.value, Decimal::from(100));

        app.post("/assets")
            .json(&json!({"name": "Ação XYZ", "value": 50.5}))
            .await
            .assert_status(StatusCode::CREATED);

        let assets: Vec<AssetResponse> = app.get("/assets").await.json();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[1].value, Decimal::new(505, 1));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_rejects_non_positive_value(pool: PgPool) {
        let app = create_test_app(pool).await;

        for value in [0.0, -10.0] {
            let response = app.post("/assets").json(&json!({"name": "Fundo ABC", "value": value})).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            let body: serde_json::Value = response.json();
            assert!(body["error"]["fields"]["value"].is_array());
        }

        app.post("/assets")
            .json(&json!({"name": "", "value": 10.0}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_unallocated_asset_renames(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let asset = create_test_asset(&pool, "Fundo ABC", Decimal::from(100)).await;

        let response = app
            .put(&format!("/assets/{}", asset.id))
            .json(&json!({"name": "Fundo DEF", "value": 120.0}))
            .await;
        response.assert_status_ok();
        let updated: AssetResponse = response.json();
        assert_eq!(updated.name, "Fundo DEF");
        assert_eq!(updated.value, Decimal::from(120));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_allocated_asset_freezes_name(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let asset = create_test_asset(&pool, "Fundo ABC", Decimal::from(100)).await;
        let client = create_test_client(&pool, "João", "joao@x.com").await;
        create_test_allocation(&pool, client.id, asset.id, Decimal::from(10)).await;

        let response = app
            .put(&format!("/assets/{}", asset.id))
            .json(&json!({"name": "Renamed", "value": 110.0}))
            .await;
        response.assert_status_ok();
        let updated: AssetResponse = response.json();
        assert_eq!(updated.name, "Fundo ABC");
        assert_eq!(updated.value, Decimal::from(110));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_rename_waits_for_allocation_in_flight(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let asset = create_test_asset(&pool, "Fundo ABC", Decimal::from(100)).await;
        let client = create_test_client(&pool, "João", "joao@x.com").await;

        let mut allocation_tx = pool.begin().await.unwrap();
        let found = Assets::new(&mut allocation_tx)
            .get_first_by_name("Fundo ABC")
            .await
            .unwrap()
            .unwrap();
        Allocations::new(&mut allocation_tx)
            .create(&AllocationCreateDBRequest {
                client_id: client.id,
                asset_id: found.id,
                amount: Decimal::from(10),
            })
            .await
            .unwrap();

        let rename = async {
            app.put(&format!("/assets/{}", asset.id))
                .json(&json!({"name": "Renamed", "value": 110.0}))
                .await
        };
        let commit = async {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            allocation_tx.commit().await.unwrap();
        };
        let (response, ()) = tokio::join!(rename, commit);

        response.assert_status_ok();
        let updated: AssetResponse = response.json();
        assert_eq!(updated.name, "Fundo ABC");
        assert_eq!(updated.value, Decimal::from(110));

        let stored: String = sqlx::query_scalar("SELECT name FROM assets WHERE id = $1")
            .bind(asset.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stored, "Fundo ABC");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_missing_or_invalid_asset(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let asset = create_test_asset(&pool, "Fundo ABC", Decimal::from(100)).await;

        app.put("/assets/9999")
            .json(&json!({"name": "Ghost", "value": 1.0}))
            .await
            .assert_status_not_found();

        app.put(&format!("/assets/{}", asset.id))
            .json(&json!({"name": "Fundo ABC", "value": 0}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_asset(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let unused = create_test_asset(&pool, "Unused", Decimal::from(1)).await;
        let held = create_test_asset(&pool, "Held", Decimal::from(2)).await;
        let client = create_test_client(&pool, "João", "joao@x.com").await;
        create_test_allocation(&pool, client.id, held.id, Decimal::from(3)).await;

        app.delete(&format!("/assets/{}", unused.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        app.delete(&format!("/assets/{}", unused.id)).await.assert_status_not_found();
        app.delete(&format!("/assets/{}", held.id))
            .await
            .assert_status(StatusCode::CONFLICT);

        let assets: Vec<AssetResponse> = app.get("/assets").await.json();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].id, held.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_allocation_amount(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let asset = create_test_asset(&pool, "Fundo ABC", Decimal::from(100)).await;
        let client = create_test_client(&pool, "João", "joao@x.com").await;
        let allocation = create_test_allocation(&pool, client.id, asset.id, Decimal::from(10)).await;

        let response = app
            .put(&format!("/assets/allocations/{}", allocation.id))
            .json(&json!({"amount": 15}))
            .await;
        response.assert_status_ok();
        let updated: AllocationResponse = response.json();
        assert_eq!(updated.amount, Decimal::from(15));
        assert_eq!(updated.asset.name, "Fundo ABC");
        assert_eq!(updated.asset.value, Decimal::from(100));

        app.put(&format!("/assets/allocations/{}", allocation.id))
            .json(&json!({"amount": 0}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        app.put("/assets/allocations/9999")
            .json(&json!({"amount": 1}))
            .await
            .assert_status_not_found();
    }
}
