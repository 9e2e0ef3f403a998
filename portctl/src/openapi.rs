//! OpenAPI documentation for the HTTP API, served at `/docs`.

use crate::api;
use utoipa::OpenApi;

/// Shape of every error body. `error` is a message string, or an object with `message` and
/// `fields` when field validation fails.
#[derive(utoipa::ToSchema)]
#[allow(unused)]
pub struct ErrorResponse {
    #[schema(value_type = Object, example = json!("Client with ID 7 not found"))]
    error: serde_json::Value,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "portctl",
        description = "Portfolio allocation API: clients, assets, and the allocations linking them."
    ),
    paths(
        api::handlers::health::health,
        api::handlers::clients::list_clients,
        api::handlers::clients::create_client,
        api::handlers::clients::get_client,
        api::handlers::clients::update_client,
        api::handlers::clients::delete_client,
        api::handlers::assets::list_assets,
        api::handlers::assets::create_asset,
        api::handlers::assets::update_asset,
        api::handlers::assets::delete_asset,
        api::handlers::assets::update_allocation_amount,
        api::handlers::allocations::list_client_allocations,
        api::handlers::allocations::create_allocation_by_name,
    ),
    components(
        schemas(
            ErrorResponse,
            api::models::health::HealthResponse,
            api::models::clients::ClientPayload,
            api::models::clients::ClientResponse,
            api::models::clients::ClientSummary,
            api::models::clients::ClientAssetHolding,
            api::models::assets::AssetPayload,
            api::models::assets::AssetResponse,
            api::models::allocations::AllocationByName,
            api::models::allocations::AllocationAmountUpdate,
            api::models::allocations::AllocationResponse,
            api::models::allocations::ClientAllocationsResponse,
        )
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "clients", description = "Investor management"),
        (name = "assets", description = "Financial instruments and allocation amounts"),
        (name = "allocations", description = "Holdings of a client"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_is_documented() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/health",
            "/clients",
            "/clients/{client_id}",
            "/assets",
            "/assets/{asset_id}",
            "/assets/allocations/{allocation_id}",
            "/clients/{client_id}/allocations",
            "/clients/{client_id}/allocations/by-name",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
