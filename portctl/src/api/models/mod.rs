//! API request and response data models.
//!
//! These types define the public JSON contract. Field names are camelCase on the wire,
//! decimal quantities and prices are JSON numbers, and request bodies carry `validator`
//! rules that [`crate::api::validation::ValidatedJson`] enforces before a handler runs.
//!
//! - [`clients`]: Client payloads and the client summary listing
//! - [`assets`]: Asset payloads
//! - [`allocations`]: Allocation payloads, always carrying the joined asset
//! - [`health`]: Liveness payload

pub mod allocations;
pub mod assets;
pub mod clients;
pub mod health;
