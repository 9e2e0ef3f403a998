//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//! - **[`validation`]**: JSON body extraction with field validation
//!
//! # API Structure
//!
//! - **Health** (`/health`): Liveness check
//! - **Clients** (`/clients/*`): Investor management
//! - **Assets** (`/assets/*`): Financial instruments, plus allocation amount updates
//! - **Allocations** (`/clients/{client_id}/allocations/*`): A client's holdings
//!
//! All endpoints are documented with `utoipa`; the rendered reference is served at `/docs`.

pub mod handlers;
pub mod models;
pub mod validation;
