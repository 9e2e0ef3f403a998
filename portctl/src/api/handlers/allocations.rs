use crate::api::models::allocations::{AllocationByName, AllocationResponse, ClientAllocationsResponse};
use crate::api::validation::{Path, ValidatedJson};
use crate::db::handlers::{Allocations, Assets, Clients, Repository, allocations::AllocationFilter};
use crate::db::models::allocations::AllocationCreateDBRequest;
use crate::errors::{Error, Result};
use crate::types::ClientId;
use crate::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/clients/{client_id}/allocations",
    tag = "allocations",
    summary = "List a client's allocations",
    params(
        ("client_id" = i64, Path, description = "Client ID")
    ),
    responses(
        (status = 200, description = "Client name and allocations, each with its asset", body = ClientAllocationsResponse),
        (status = 404, description = "Client not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_client_allocations(
    State(state): State<AppState>,
    Path(client_id): Path<ClientId>,
) -> Result<Json<ClientAllocationsResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let client = Clients::new(&mut pool_conn)
        .get_by_id(client_id)
        .await?
        .ok_or_else(|| Error::not_found("Client", client_id))?;

    let allocations = Allocations::new(&mut pool_conn)
        .list(&AllocationFilter::for_client(client_id))
        .await?;

    Ok(Json(ClientAllocationsResponse {
        client_name: client.name,
        allocations: allocations.into_iter().map(AllocationResponse::from).collect(),
    }))
}

/// Allocate an asset to a client. Served on both `/clients/{client_id}/allocations` and
/// `/clients/{client_id}/allocations/by-name`.
#[utoipa::path(
    post,
    path = "/clients/{client_id}/allocations/by-name",
    tag = "allocations",
    summary = "Allocate an asset by name",
    description = "Resolves the asset by exact name (the lowest id wins when names repeat) and creates \
                   the allocation. `POST /clients/{client_id}/allocations` is an alias.",
    request_body = AllocationByName,
    params(
        ("client_id" = i64, Path, description = "Client ID")
    ),
    responses(
        (status = 201, description = "Allocation created", body = AllocationResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Client or asset not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_allocation_by_name(
    State(state): State<AppState>,
    Path(client_id): Path<ClientId>,
    ValidatedJson(payload): ValidatedJson<AllocationByName>,
) -> Result<(StatusCode, Json<AllocationResponse>)> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    if Clients::new(&mut tx).get_by_id(client_id).await?.is_none() {
        return Err(Error::not_found("Client", client_id));
    }

    let asset = Assets::new(&mut tx)
        .get_first_by_name(&payload.asset_name)
        .await?
        .ok_or_else(|| Error::not_found_by_name("Asset", &payload.asset_name))?;

    let allocation = Allocations::new(&mut tx)
        .create(&AllocationCreateDBRequest {
            client_id,
            asset_id: asset.id,
            amount: payload.amount,
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    Ok((StatusCode::CREATED, Json(AllocationResponse::from(allocation))))
}
