use serde::{Deserialize, Serialize};
use thiserror::Error;

use chantier_core::{ItemCode, MovementId, RequestId, ReservationId, Warehouse};

/// Failure of a ledger operation.
///
/// Fatal for shipment and return reconciliation; `ReservationsUnsupported`
/// is expected and consumed by the reservation capability probe.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient stock of {item_code} in {warehouse}: have {available}, need {requested}")]
    InsufficientStock {
        item_code: ItemCode,
        warehouse: Warehouse,
        available: i64,
        requested: i64,
    },

    #[error("no bin for {item_code} in {warehouse}")]
    UnknownBin {
        item_code: ItemCode,
        warehouse: Warehouse,
    },

    #[error("first-class reservation records are not supported by this ledger")]
    ReservationsUnsupported,

    #[error("ledger backend failure: {0}")]
    Backend(String),
}

/// One line of a multi-line movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchLine {
    pub item_code: ItemCode,
    pub qty: i64,
    pub uom: String,
}

/// Quantity movements and reservation bookkeeping between warehouses.
///
/// Implementations serialize their own counter updates for a given
/// (item, warehouse) pair; callers pass non-negative quantities.
pub trait WarehouseLedger: Send + Sync {
    /// Move `qty` of one item between warehouses. Returns the movement id.
    fn transfer(
        &self,
        from: &Warehouse,
        to: &Warehouse,
        item_code: &ItemCode,
        qty: i64,
        uom: &str,
    ) -> Result<MovementId, LedgerError>;

    /// Move several lines between the same pair of warehouses as one
    /// movement, all-or-nothing.
    fn transfer_batch(
        &self,
        from: &Warehouse,
        to: &Warehouse,
        lines: &[BatchLine],
    ) -> Result<MovementId, LedgerError>;

    /// Adjust the reserved counter on the (item, warehouse) bin by `delta`.
    ///
    /// Fails when the bin does not exist. Implementations clamp the counter
    /// at zero, so over-releasing is a no-op rather than a negative balance.
    fn adjust_reserved(
        &self,
        item_code: &ItemCode,
        warehouse: &Warehouse,
        delta: i64,
    ) -> Result<(), LedgerError>;

    /// Create a first-class reservation record tied to a request.
    ///
    /// Fails with [`LedgerError::ReservationsUnsupported`] when the
    /// environment lacks reservation records.
    fn create_reservation(
        &self,
        request_id: RequestId,
        item_code: &ItemCode,
        qty: i64,
        warehouse: &Warehouse,
    ) -> Result<ReservationId, LedgerError>;

    /// Delete every reservation record matching (request, item).
    ///
    /// Returns the number of records deleted; zero matches is a no-op.
    fn delete_reservations(
        &self,
        request_id: RequestId,
        item_code: &ItemCode,
    ) -> Result<usize, LedgerError>;

    /// Capability probe: whether `create_reservation` can succeed at all.
    ///
    /// Resolved once at startup by the reservation manager; call-time
    /// dispatch never depends on catching `ReservationsUnsupported`.
    fn supports_reservations(&self) -> bool;
}
