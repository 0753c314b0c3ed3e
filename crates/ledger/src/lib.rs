//! Warehouse ledger contract.
//!
//! The ledger is an external collaborator: it records quantity movements
//! between warehouses and tracks per-(item, warehouse) reserved counters.
//! The workflow core depends only on the [`WarehouseLedger`] trait; the
//! in-memory implementation is intended for tests and dev.

pub mod in_memory;
pub mod ledger;

pub use in_memory::{InMemoryLedger, Movement, ReservationRecord};
pub use ledger::{BatchLine, LedgerError, WarehouseLedger};
