//! Fixtures shared by the test modules.

use crate::db::handlers::{Allocations, Assets, Clients, Repository};
use crate::db::models::{
    allocations::{AllocationCreateDBRequest, AllocationWithAsset},
    assets::{Asset, AssetCreateDBRequest},
    clients::{Client, ClientCreateDBRequest},
};
use crate::types::{AssetId, ClientId};
use axum_test::TestServer;
use rust_decimal::Decimal;
use sqlx::PgPool;

pub async fn create_test_app(pool: PgPool) -> TestServer {
    crate::Application::new_with_pool(create_test_config(), pool)
        .expect("Failed to create application")
        .into_test_server()
}

pub fn create_test_config() -> crate::config::Config {
    let mut config = crate::config::Config::default();
    config.database.pool.max_connections = 2;
    config
}

pub async fn create_test_client(pool: &PgPool, name: &str, email: &str) -> Client {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Clients::new(&mut conn)
        .create(&ClientCreateDBRequest {
            name: name.to_string(),
            email: email.to_string(),
            status: true,
        })
        .await
        .expect("Failed to create test client")
}

pub async fn create_test_asset(pool: &PgPool, name: &str, value: Decimal) -> Asset {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Assets::new(&mut conn)
        .create(&AssetCreateDBRequest {
            name: name.to_string(),
            value,
        })
        .await
        .expect("Failed to create test asset")
}

pub async fn create_test_allocation(pool: &PgPool, client_id: ClientId, asset_id: AssetId, amount: Decimal) -> AllocationWithAsset {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Allocations::new(&mut conn)
        .create(&AllocationCreateDBRequest {
            client_id,
            asset_id,
            amount,
        })
        .await
        .expect("Failed to create test allocation")
}
