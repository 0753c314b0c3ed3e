//! Workflow orchestration: the side-effectful layer of the material
//! tracking core.
//!
//! Domain crates stay pure; this crate composes the warehouse ledger, the
//! reservation manager, document repositories, and the append-only logs
//! into the request/return/transfer operations. Each operation is one
//! synchronous unit of work, serialized per request id.

pub mod error;
pub mod locks;
pub mod service;
pub mod settings;
pub mod store;

pub use error::WorkflowError;
pub use service::MaterialFlowService;
pub use settings::StockSettings;
pub use store::{
    DiscrepancyEntry, DiscrepancyLog, InMemoryDiscrepancyLog, InMemoryRequests, InMemoryReturns,
    InMemoryTransferLog, RequestRepository, ReturnRepository, StorageError, TransferItem,
    TransferLog, TransferLogEntry,
};
