//! Document storage boundary.
//!
//! One repository interface per entity, plus the append-only audit logs.
//! The workflow depends only on these traits and makes no storage
//! assumptions; the in-memory implementations back tests and dev.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::{
    InMemoryDiscrepancyLog, InMemoryRequests, InMemoryReturns, InMemoryTransferLog,
};
pub use r#trait::{
    DiscrepancyEntry, DiscrepancyLog, RequestRepository, ReturnRepository, StorageError,
    TransferItem, TransferLog, TransferLogEntry,
};
