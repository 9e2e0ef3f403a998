//! # portctl: Portfolio Allocation Control Layer
//!
//! `portctl` is a small HTTP/JSON service for managing investment portfolios. It stores
//! clients (investors), assets (financial instruments with a unit price) and the allocations
//! recording how much of each asset a client holds.
//!
//! ## Architecture
//!
//! The service is an [Axum](https://github.com/tokio-rs/axum) application backed by PostgreSQL:
//!
//! - **API Layer** ([`api`]): Handlers, request/response models, and a validating JSON extractor
//! - **Database Layer** ([`db`]): Repository-pattern data access on top of SQLx
//! - **Configuration** ([`config`]): YAML file with environment variable overrides
//! - **Telemetry** ([`telemetry`]): Tracing subscriber with optional OTLP export
//!
//! ### Request Flow
//!
//! 1. The router matches the path and runs CORS and tracing middleware
//! 2. [`api::validation::ValidatedJson`] decodes and validates the body
//! 3. The handler drives one or more repositories on a pooled connection or transaction
//! 4. Database records convert to API responses; failures map to `{"error": ...}` bodies
//!
//! ## Business Rules
//!
//! - Asset values and allocation amounts are strictly positive
//! - An asset's name is frozen as soon as any allocation references it; updates then only
//!   change its value
//! - Clients and assets that still have allocations cannot be deleted
//!
//! ## Getting Started
//!
//! ```no_run
//! use portctl::{Application, Config};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::default();
//! let app = Application::new(config).await?;
//! app.serve(async { tokio::signal::ctrl_c().await.ok(); }).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::config::CorsOrigin;
use crate::db::handlers::{Allocations, Assets, Clients, Repository};
use crate::db::models::{
    allocations::AllocationCreateDBRequest, assets::AssetCreateDBRequest, clients::ClientCreateDBRequest,
};
use crate::openapi::ApiDoc;
use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post, put},
};
use bon::Builder;
pub use config::Config;
use rust_decimal::Decimal;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the portctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// What [`seed_database`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded,
    /// The database already held clients or assets
    Skipped,
}

/// Populate an empty database with a couple of demo clients, assets and allocations.
///
/// Runs in one transaction and does nothing if any client or asset already exists, so it is
/// safe to call on every startup.
#[instrument(skip_all, err)]
pub async fn seed_database(db: &PgPool) -> anyhow::Result<SeedOutcome> {
    let mut tx = db.begin().await?;

    let populated: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM clients) OR EXISTS (SELECT 1 FROM assets)")
            .fetch_one(&mut *tx)
            .await?;
    if populated {
        debug!("Database already has data, skipping demo seed");
        return Ok(SeedOutcome::Skipped);
    }

    let mut assets = Assets::new(&mut tx);
    let fundo = assets
        .create(&AssetCreateDBRequest {
            name: "Fundo ABC".to_string(),
            value: Decimal::new(1000, 1),
        })
        .await?;
    let acao = assets
        .create(&AssetCreateDBRequest {
            name: "Ação XYZ".to_string(),
            value: Decimal::new(505, 1),
        })
        .await?;

    let mut clients = Clients::new(&mut tx);
    let joao = clients
        .create(&ClientCreateDBRequest {
            name: "João Marcos Silva".to_string(),
            email: "joaomarcos@example.com".to_string(),
            status: true,
        })
        .await?;
    let maria = clients
        .create(&ClientCreateDBRequest {
            name: "Maria Eduarda Souza".to_string(),
            email: "mariaeduarda@example.com".to_string(),
            status: true,
        })
        .await?;

    let mut allocations = Allocations::new(&mut tx);
    for (client_id, asset_id, amount) in [(joao.id, fundo.id, 10), (joao.id, acao.id, 5), (maria.id, acao.id, 20)] {
        allocations
            .create(&AllocationCreateDBRequest {
                client_id,
                asset_id,
                amount: Decimal::from(amount),
            })
            .await?;
    }

    tx.commit().await?;
    info!("Seeded demo clients, assets and allocations");
    Ok(SeedOutcome::Seeded)
}

/// Connect the pool, run migrations, and seed demo data if configured
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let settings = &config.database.pool;
    let optional_secs = |secs: u64| (secs > 0).then(|| Duration::from_secs(secs));

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(optional_secs(settings.idle_timeout_secs))
        .max_lifetime(optional_secs(settings.max_lifetime_secs))
        .connect(&config.database.url)
        .await?;

    migrator().run(&pool).await?;

    if config.seed_demo_data {
        seed_database(&pool).await?;
    }

    Ok(pool)
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    // tower-http refuses `*` inside an origin list
    let allow_origin = if config.cors.allowed_origins.contains(&CorsOrigin::Wildcard) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &config.cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.origin().ascii_serialization().parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::any());

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// Both `POST /clients/{client_id}/allocations` and `.../allocations/by-name` route to the same
/// handler.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    use api::handlers::{allocations, assets, clients, health};

    let cors = create_cors_layer(&state.config)?;

    let router = Router::new()
        .route("/health", get(health::health))
        .route("/clients", get(clients::list_clients).post(clients::create_client))
        .route(
            "/clients/{client_id}",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
        .route(
            "/clients/{client_id}/allocations",
            get(allocations::list_client_allocations).post(allocations::create_allocation_by_name),
        )
        .route(
            "/clients/{client_id}/allocations/by-name",
            post(allocations::create_allocation_by_name),
        )
        .route("/assets", get(assets::list_assets).post(assets::create_asset))
        .route("/assets/{asset_id}", put(assets::update_asset).delete(assets::delete_asset))
        .route("/assets/allocations/{allocation_id}", put(assets::update_allocation_amount))
        .with_state(state)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(cors),
        );

    Ok(router)
}

/// A configured server: database ready, router built, not yet listening.
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting portctl with configuration: {:#?}", config);

        let pool = setup_database(&config).await?;
        Self::new_with_pool(config, pool)
    }

    /// Build the application on an existing, already migrated pool
    pub fn new_with_pool(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "portctl listening on http://{}, API reference at http://localhost:{}/docs",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
