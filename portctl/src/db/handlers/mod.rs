//! Repository implementations for database access.
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations
//! - Returns domain models from [`crate::db::models`]
//!
//! # Available Repositories
//!
//! - [`Clients`]: Investors and the summary of what they hold
//! - [`Assets`]: Financial instruments, including the name-freeze rule on update
//! - [`Allocations`]: Client holdings, always returned joined with their asset
//!
//! # Common Pattern
//!
//! ```ignore
//! use portctl::db::handlers::{Clients, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     // Writes go through a transaction
//!     let mut tx = pool.begin().await?;
//!     let mut repo = Clients::new(&mut tx);
//!
//!     let client = repo.create(&request).await?;
//!
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod allocations;
pub mod assets;
pub mod clients;
pub mod repository;

pub use allocations::Allocations;
pub use assets::Assets;
pub use clients::Clients;
pub use repository::Repository;
