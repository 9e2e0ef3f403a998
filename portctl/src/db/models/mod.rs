//! Database record models matching table schemas.
//!
//! Each struct in this module corresponds to a table row (deriving `sqlx::FromRow`) or to
//! the data a repository needs to write one. API payloads live in [`crate::api::models`]
//! and convert to and from these types, so storage and wire formats can evolve separately.
//!
//! - [`clients`]: Investor records
//! - [`assets`]: Financial instruments and their unit value
//! - [`allocations`]: How much of an asset a client holds, always read joined with its asset

pub mod allocations;
pub mod assets;
pub mod clients;
