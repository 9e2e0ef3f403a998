//! HTTP request handlers for all API endpoints.
//!
//! Handlers take [`crate::AppState`] through axum's `State` extractor, open a pooled
//! connection for reads or a transaction for writes, and drive the repositories in
//! [`crate::db::handlers`]. Request bodies arrive through
//! [`crate::api::validation::ValidatedJson`], so malformed input never reaches the database.
//!
//! - [`health`]: Liveness check
//! - [`clients`]: Client CRUD and the client summary listing
//! - [`assets`]: Asset CRUD and allocation amount updates
//! - [`allocations`]: Listing and creating a client's allocations

pub mod allocations;
pub mod assets;
pub mod clients;
pub mod health;
