use crate::api::models::clients::{ClientPayload, ClientResponse, ClientSummary, ListClientsQuery};
use crate::api::validation::{Path, Query, ValidatedJson};
use crate::db::errors::DbError;
use crate::db::handlers::{Clients, Repository, clients::ClientFilter};
use crate::db::models::clients::{ClientCreateDBRequest, ClientUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{ClientId, Operation};
use crate::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/clients",
    tag = "clients",
    summary = "List clients",
    description = "List clients ordered by id, each with its allocation count and the assets it holds.",
    params(ListClientsQuery),
    responses(
        (status = 200, description = "Client summaries", body = Vec<ClientSummary>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_clients(State(state): State<AppState>, Query(query): Query<ListClientsQuery>) -> Result<Json<Vec<ClientSummary>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Clients::new(&mut pool_conn);

    let filter = ClientFilter::new(query.skip.unwrap_or(0).max(0), query.limit.map(|l| l.max(0)));
    let clients = repo.list_with_holdings(&filter).await?;
    Ok(Json(clients.into_iter().map(ClientSummary::from).collect()))
}

#[utoipa::path(
    post,
    path = "/clients",
    tag = "clients",
    summary = "Create client",
    request_body = ClientPayload,
    responses(
        (status = 201, description = "Client created", body = ClientResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_client(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ClientPayload>,
) -> Result<(StatusCode, Json<ClientResponse>)> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Clients::new(&mut pool_conn);

    let client = repo.create(&ClientCreateDBRequest::from(payload)).await?;
    Ok((StatusCode::CREATED, Json(ClientResponse::from(client))))
}

#[utoipa::path(
    get,
    path = "/clients/{client_id}",
    tag = "clients",
    summary = "Get client",
    params(
        ("client_id" = i64, Path, description = "Client ID")
    ),
    responses(
        (status = 200, description = "Client details", body = ClientResponse),
        (status = 404, description = "Client not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_client(State(state): State<AppState>, Path(id): Path<ClientId>) -> Result<Json<ClientResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Clients::new(&mut pool_conn);

    match repo.get_by_id(id).await? {
        Some(client) => Ok(Json(ClientResponse::from(client))),
        None => Err(Error::not_found("Client", id)),
    }
}

#[utoipa::path(
    put,
    path = "/clients/{client_id}",
    tag = "clients",
    summary = "Replace client",
    request_body = ClientPayload,
    params(
        ("client_id" = i64, Path, description = "Client ID")
    ),
    responses(
        (status = 200, description = "Client updated", body = ClientResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Client not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<ClientId>,
    ValidatedJson(payload): ValidatedJson<ClientPayload>,
) -> Result<Json<ClientResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Clients::new(&mut pool_conn);

    match repo.update(id, &ClientUpdateDBRequest::from(payload)).await {
        Ok(client) => Ok(Json(ClientResponse::from(client))),
        Err(DbError::NotFound) => Err(Error::not_found("Client", id)),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    delete,
    path = "/clients/{client_id}",
    tag = "clients",
    summary = "Delete client",
    description = "Clients that still hold allocations cannot be deleted.",
    params(
        ("client_id" = i64, Path, description = "Client ID")
    ),
    responses(
        (status = 204, description = "Client deleted"),
        (status = 404, description = "Client not found"),
        (status = 409, description = "Client still holds allocations"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_client(State(state): State<AppState>, Path(id): Path<ClientId>) -> Result<StatusCode> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Clients::new(&mut pool_conn);

    match repo.delete(id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(Error::not_found("Client", id)),
        Err(err @ DbError::ForeignKeyViolation { .. }) => {
            tracing::debug!("Refusing to delete client {}: {}", id, err);
            Err(Error::still_allocated(Operation::Delete, "client", id))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::clients::{ClientResponse, ClientSummary};
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use rust_decimal::Decimal;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_then_get_round_trips(pool: PgPool) {
        let app = create_test_app(pool).await;

        let response = app
            .post("/clients")
            .json(&json!({"name": "João", "email": "joao@x.com", "status": true}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: ClientResponse = response.json();

        let response = app.get(&format!("/clients/{}", created.id)).await;
        response.assert_status_ok();
        let fetched: ClientResponse = response.json();
        assert_eq!(fetched.name, "João");
        assert_eq!(fetched.email, "joao@x.com");
        assert!(fetched.status);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_rejects_invalid_payloads(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        let response = app
            .post("/clients")
            .json(&json!({"name": "", "email": "nope", "status": true}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"]["message"], "Validation failed");
        assert!(body["error"]["fields"]["name"].is_array());
        assert!(body["error"]["fields"]["email"].is_array());

        let response = app
            .post("/clients")
            .json(&json!({"name": "João", "email": "joao@x.com", "status": "yes"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert!(body["error"].is_string());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients").fetch_one(&pool).await.unwrap();
        assert_eq!(count, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_missing_client_is_not_found(pool: PgPool) {
        let app = create_test_app(pool).await;

        let response = app.get("/clients/9999").await;
        response.assert_status_not_found();
        response.assert_json(&json!({"error": "Client with ID 9999 not found"}));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_malformed_id_and_query_return_json_errors(pool: PgPool) {
        let app = create_test_app(pool).await;

        for response in [
            app.get("/clients/abc").await,
            app.delete("/clients/1.5").await,
            app.get("/clients?skip=abc").await,
        ] {
            response.assert_status(StatusCode::BAD_REQUEST);
            let content_type = response.header("content-type");
            assert_eq!(content_type, "application/json");
            let body: serde_json::Value = response.json();
            assert!(body["error"].is_string());
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_client(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let client = create_test_client(&pool, "João", "joao@x.com").await;

        let response = app
            .put(&format!("/clients/{}", client.id))
            .json(&json!({"name": "João Silva", "email": "silva@x.com", "status": false}))
            .await;
        response.assert_status_ok();
        let updated: ClientResponse = response.json();
        assert_eq!(updated.name, "João Silva");
        assert_eq!(updated.email, "silva@x.com");
        assert!(!updated.status);

        let response = app
            .put(&format!("/clients/{}", client.id))
            .json(&json!({"name": "João Silva", "email": "silva@x.com"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = app
            .put("/clients/9999")
            .json(&json!({"name": "Ghost", "email": "ghost@x.com", "status": true}))
            .await;
        response.assert_status_not_found();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_clients_includes_holdings(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let joao = create_test_client(&pool, "João", "joao@x.com").await;
        let maria = create_test_client(&pool, "Maria", "maria@x.com").await;
        let fundo = create_test_asset(&pool, "Fundo ABC", Decimal::from(100)).await;
        create_test_allocation(&pool, joao.id, fundo.id, Decimal::from(10)).await;

        let response = app.get("/clients").await;
        response.assert_status_ok();
        let clients: Vec<ClientSummary> = response.json();
        assert_eq!(clients.len(), 2);

        let joao_summary = clients.iter().find(|c| c.id == joao.id).unwrap();
        assert_eq!(joao_summary.allocations_count, 1);
        assert_eq!(joao_summary.assets[0].asset_id, fundo.id);
        assert_eq!(joao_summary.assets[0].asset_name, "Fundo ABC");
        assert_eq!(joao_summary.assets[0].asset_value, Decimal::from(100));
        assert_eq!(joao_summary.assets[0].amount, Decimal::from(10));

        let maria_summary = clients.iter().find(|c| c.id == maria.id).unwrap();
        assert_eq!(maria_summary.allocations_count, 0);
        assert!(maria_summary.assets.is_empty());

        let response = app.get("/clients?skip=1&limit=1").await;
        let page: Vec<ClientSummary> = response.json();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, maria.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_client(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let idle = create_test_client(&pool, "Maria", "maria@x.com").await;
        let holder = create_test_client(&pool, "João", "joao@x.com").await;
        let fundo = create_test_asset(&pool, "Fundo ABC", Decimal::from(100)).await;
        create_test_allocation(&pool, holder.id, fundo.id, Decimal::from(10)).await;

        app.delete(&format!("/clients/{}", idle.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        app.delete(&format!("/clients/{}", idle.id)).await.assert_status_not_found();

        let response = app.delete(&format!("/clients/{}", holder.id)).await;
        response.assert_status(StatusCode::CONFLICT);
        let body: serde_json::Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("referenced by existing allocations"));

        app.get(&format!("/clients/{}", holder.id)).await.assert_status_ok();
    }
}
