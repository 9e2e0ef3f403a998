//! Common type definitions.
//!
//! All entity IDs are database identity columns (`BIGINT`) wrapped in type aliases so that
//! signatures say which table an id belongs to:
//!
//! - [`ClientId`]: Client (investor) identifier
//! - [`AssetId`]: Asset (financial instrument) identifier
//! - [`AllocationId`]: Allocation (client holding of an asset) identifier

// Type aliases for IDs
pub type ClientId = i64;
pub type AssetId = i64;
pub type AllocationId = i64;

/// The kind of write being applied to an entity, used in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}
