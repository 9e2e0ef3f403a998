//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with PostgreSQL.
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries and write rules)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! # Transactions
//!
//! Repositories borrow a `PgConnection`, so the caller decides the transaction boundary:
//!
//! ```ignore
//! // Writes: one transaction per request
//! let mut tx = pool.begin().await?;
//! let mut repo = Assets::new(&mut tx);
//! // ... operations ...
//! tx.commit().await?;
//!
//! // Reads: a pooled connection is enough
//! let mut conn = pool.acquire().await?;
//! let mut repo = Assets::new(&mut conn);
//! ```
//!
//! # Migrations
//!
//! Migrations live in `migrations/` and are embedded by [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod models;
