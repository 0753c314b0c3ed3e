use std::sync::Arc;

use thiserror::Error;

use chantier_core::{ItemCode, RequestId, ReservationId, Warehouse};
use chantier_ledger::{LedgerError, WarehouseLedger};

/// How a reservation was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationHandle {
    /// First-class ledger reservation record.
    Record(ReservationId),
    /// Increment of the per-(item, warehouse) reserved counter.
    Counter {
        item_code: ItemCode,
        warehouse: Warehouse,
        qty: i64,
    },
}

/// Reservation cleanup could not complete.
///
/// Non-fatal: callers log it and proceed. Blocking a shipment on
/// bookkeeping cleanup is worse than a stale reservation counter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("could not release reservation of {item_code} for request {request_id}: {source}")]
pub struct ReleaseFailure {
    pub request_id: RequestId,
    pub item_code: ItemCode,
    pub source: LedgerError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Record,
    Counter,
}

/// Creates and releases per-item reservations against the ledger.
pub struct ReservationManager {
    ledger: Arc<dyn WarehouseLedger>,
    strategy: Strategy,
}

impl ReservationManager {
    /// Probes the ledger once and fixes the strategy for the manager's
    /// lifetime.
    pub fn new(ledger: Arc<dyn WarehouseLedger>) -> Self {
        let strategy = if ledger.supports_reservations() {
            Strategy::Record
        } else {
            Strategy::Counter
        };
        tracing::debug!(?strategy, "reservation strategy selected");
        Self { ledger, strategy }
    }

    /// Reserve `qty` of an item for a request.
    ///
    /// Never fails: when the preferred record cannot be created, or the
    /// counter adjustment is rejected, the degradation is logged and the
    /// operation proceeds.
    pub fn reserve(
        &self,
        request_id: RequestId,
        item_code: &ItemCode,
        qty: i64,
        warehouse: &Warehouse,
    ) -> ReservationHandle {
        if self.strategy == Strategy::Record {
            match self
                .ledger
                .create_reservation(request_id, item_code, qty, warehouse)
            {
                Ok(id) => return ReservationHandle::Record(id),
                Err(err) => {
                    tracing::warn!(
                        request_id = %request_id,
                        item_code = %item_code,
                        warehouse = %warehouse,
                        error = %err,
                        "reservation record rejected, falling back to reserved counter"
                    );
                }
            }
        }

        if let Err(err) = self.ledger.adjust_reserved(item_code, warehouse, qty) {
            tracing::warn!(
                request_id = %request_id,
                item_code = %item_code,
                warehouse = %warehouse,
                error = %err,
                "reserved counter adjustment failed; reservation not recorded"
            );
        }
        ReservationHandle::Counter {
            item_code: item_code.clone(),
            warehouse: warehouse.clone(),
            qty,
        }
    }

    /// Release a reservation previously taken with [`reserve`].
    ///
    /// Deletes every matching record; when none exist (counter fallback, or
    /// already released) the reserved counter is decremented instead,
    /// clamped at zero, making double release a no-op.
    ///
    /// [`reserve`]: ReservationManager::reserve
    pub fn release(
        &self,
        request_id: RequestId,
        item_code: &ItemCode,
        qty: i64,
        warehouse: &Warehouse,
    ) -> Result<(), ReleaseFailure> {
        if self.strategy == Strategy::Record {
            match self.ledger.delete_reservations(request_id, item_code) {
                Ok(deleted) if deleted > 0 => return Ok(()),
                Ok(_) => {} // nothing recorded; fall through to the counter
                Err(err) => {
                    tracing::debug!(
                        request_id = %request_id,
                        item_code = %item_code,
                        error = %err,
                        "record deletion failed, trying reserved counter"
                    );
                }
            }
        }

        match self.ledger.adjust_reserved(item_code, warehouse, -qty) {
            Ok(()) => Ok(()),
            Err(source) => Err(ReleaseFailure {
                request_id,
                item_code: item_code.clone(),
                source,
            }),
        }
    }
}
