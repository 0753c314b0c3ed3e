//! Per-item reservation bookkeeping with graceful degradation.
//!
//! Prefers first-class reservation records; falls back to the per-bin
//! reserved counter when the ledger does not support records. The strategy
//! is resolved once at construction by a capability probe, never by
//! catching errors at call time.

pub mod manager;

pub use manager::{ReleaseFailure, ReservationHandle, ReservationManager};
