use std::sync::Arc;

use chrono::Utc;

use chantier_core::{ItemCode, MovementId, RequestId, ReturnId, Warehouse, DEFAULT_UOM};
use chantier_ledger::{BatchLine, WarehouseLedger};
use chantier_requests::{MaterialRequest, RequestStatus};
use chantier_reservations::ReservationManager;
use chantier_returns::{ReturnCount, ReturnStatus};

use crate::error::WorkflowError;
use crate::locks::{hold, RequestLocks};
use crate::settings::StockSettings;
use crate::store::{
    DiscrepancyEntry, DiscrepancyLog, RequestRepository, ReturnRepository, TransferItem,
    TransferLog, TransferLogEntry,
};

/// Orchestrates the material workflow: request submission and shipment,
/// return counting and reconciliation, and direct site-to-site transfers.
///
/// Every operation is one synchronous unit of work. Operations on the same
/// request id are serialized by a per-id lock; different ids proceed in
/// parallel, constrained only by the ledger's own consistency guarantees.
pub struct MaterialFlowService {
    ledger: Arc<dyn WarehouseLedger>,
    reservations: ReservationManager,
    requests: Arc<dyn RequestRepository>,
    returns: Arc<dyn ReturnRepository>,
    discrepancies: Arc<dyn DiscrepancyLog>,
    transfers: Arc<dyn TransferLog>,
    settings: StockSettings,
    locks: RequestLocks,
}

impl MaterialFlowService {
    pub fn new(
        ledger: Arc<dyn WarehouseLedger>,
        requests: Arc<dyn RequestRepository>,
        returns: Arc<dyn ReturnRepository>,
        discrepancies: Arc<dyn DiscrepancyLog>,
        transfers: Arc<dyn TransferLog>,
        settings: StockSettings,
    ) -> Self {
        let reservations = ReservationManager::new(ledger.clone());
        Self {
            ledger,
            reservations,
            requests,
            returns,
            discrepancies,
            transfers,
            settings,
            locks: RequestLocks::new(),
        }
    }

    /// Persist a validated draft request.
    pub fn create_request(&self, request: MaterialRequest) -> Result<RequestId, WorkflowError> {
        request.validate()?;
        request.ensure_status(RequestStatus::Draft, "create")?;
        let id = request.id;
        self.requests.insert(request)?;
        tracing::info!(request_id = %id, "material request created");
        Ok(id)
    }

    /// Draft → Reserved: creates a reservation for every line.
    ///
    /// One line's reservation degrading does not roll back the others;
    /// degradation never blocks the submission.
    pub fn submit_request(&self, id: RequestId) -> Result<(), WorkflowError> {
        let lock = self.locks.acquire(id);
        let _guard = hold(&lock);

        let mut request = self.load_request(id)?;
        request.validate()?;
        request.ensure_status(RequestStatus::Draft, "submit")?;

        let warehouse = self.reservation_warehouse(&request);
        for line in &request.lines {
            let reservation =
                self.reservations
                    .reserve(id, &line.item_code, line.qty_requested, &warehouse);
            tracing::debug!(
                request_id = %id,
                item_code = %line.item_code,
                qty = line.qty_requested,
                ?reservation,
                "reservation recorded"
            );
        }
        request.mark_reserved()?;
        self.requests.update(&request)?;
        tracing::info!(
            request_id = %id,
            lines = request.lines.len(),
            warehouse = %warehouse,
            "reservations created"
        );
        Ok(())
    }

    /// Reserved → Shipped: one ledger transfer per line from the source
    /// warehouse to the request's destination, releasing each line's
    /// reservation as it goes.
    ///
    /// A ledger failure mid-loop is fatal: remaining lines are abandoned,
    /// already-shipped lines stay applied and persisted, and the error
    /// names the failing item for manual remediation.
    pub fn ship_request(&self, id: RequestId) -> Result<Vec<MovementId>, WorkflowError> {
        let lock = self.locks.acquire(id);
        let _guard = hold(&lock);

        let mut request = self.load_request(id)?;
        request.ensure_status(RequestStatus::Reserved, "ship")?;

        let source = self.reservation_warehouse(&request);
        let destination = request.destination_warehouse();

        let mut movements = Vec::with_capacity(request.lines.len());
        for index in 0..request.lines.len() {
            let (item_code, uom, qty) = {
                let line = &request.lines[index];
                (line.item_code.clone(), line.uom.clone(), line.shippable_qty())
            };
            match self
                .ledger
                .transfer(&source, &destination, &item_code, qty, &uom)
            {
                Ok(movement) => movements.push(movement),
                Err(source_err) => {
                    if let Err(store_err) = self.requests.update(&request) {
                        tracing::error!(
                            request_id = %id,
                            error = %store_err,
                            "failed to persist partial shipment state"
                        );
                    }
                    return Err(WorkflowError::Shipment {
                        request_id: id,
                        item_code,
                        lines_shipped: index,
                        source: source_err,
                    });
                }
            }
            request.record_line_shipped(index)?;
            if let Err(failure) = self.reservations.release(id, &item_code, qty, &source) {
                tracing::warn!(
                    request_id = %id,
                    item_code = %item_code,
                    error = %failure,
                    "reservation release failed; shipment proceeds"
                );
            }
        }

        request.mark_shipped()?;
        self.requests.update(&request)?;
        tracing::info!(
            request_id = %id,
            movements = movements.len(),
            destination = %destination,
            "shipment created"
        );
        Ok(movements)
    }

    /// Open a blind return count against a reserved or shipped request.
    pub fn start_return_count(&self, request_id: RequestId) -> Result<ReturnId, WorkflowError> {
        let lock = self.locks.acquire(request_id);
        let _guard = hold(&lock);

        let request = self.load_request(request_id)?;
        if !request.returnable() {
            return Err(WorkflowError::InvariantViolation(
                "return counting requires a reserved or shipped request".to_string(),
            ));
        }
        let ret = ReturnCount::for_request(ReturnId::new(), &request);
        let id = ret.id;
        self.returns.insert(ret)?;
        tracing::info!(request_id = %request_id, return_id = %id, "return count opened");
        Ok(id)
    }

    /// Record a counted quantity on an open return.
    pub fn record_count(
        &self,
        return_id: ReturnId,
        item_code: &ItemCode,
        qty: i64,
    ) -> Result<(), WorkflowError> {
        // The owning request id comes from the document itself; re-load
        // after taking the lock so the mutation serializes with submission.
        let probe = self.load_return(return_id)?;
        let lock = self.locks.acquire(probe.request_id);
        let _guard = hold(&lock);

        let mut ret = self.load_return(return_id)?;
        ret.record_count(item_code, qty)?;
        self.returns.update(&ret)?;
        Ok(())
    }

    /// Counting → Reconciled: moves counted stock back to the central
    /// warehouse as a single batch and records a discrepancy entry for
    /// every item whose count differs from the request's expectation.
    ///
    /// The batch is all-or-nothing: on ledger failure the return stays in
    /// Counting and the submission may be retried. Expected-quantity lookup
    /// failures skip that item's discrepancy check, non-fatally.
    pub fn submit_return(&self, return_id: ReturnId) -> Result<MovementId, WorkflowError> {
        let probe = self.load_return(return_id)?;
        let lock = self.locks.acquire(probe.request_id);
        let _guard = hold(&lock);

        let mut ret = self.load_return(return_id)?;
        ret.validate()?;
        ret.ensure_status(ReturnStatus::Counting, "submit")?;

        let request = self.requests.find(ret.request_id)?;
        let staging = ret.staging_warehouse();
        let central = self.settings.default_warehouse.clone();

        let lines: Vec<BatchLine> = ret
            .lines
            .iter()
            .map(|line| BatchLine {
                item_code: line.item_code.clone(),
                qty: line.counted(),
                uom: request
                    .as_ref()
                    .and_then(|r| r.uom_for(&line.item_code))
                    .unwrap_or_else(|| DEFAULT_UOM.to_string()),
            })
            .collect();

        let movement = self
            .ledger
            .transfer_batch(&staging, &central, &lines)
            .map_err(|source| WorkflowError::ReturnSubmit { return_id, source })?;

        match &request {
            Some(req) => {
                for line in &ret.lines {
                    match req.expected_qty(&line.item_code) {
                        Some(expected) => {
                            let counted = line.counted();
                            if counted != expected {
                                self.discrepancies.append(DiscrepancyEntry {
                                    request_id: ret.request_id,
                                    item_code: line.item_code.clone(),
                                    expected_qty: expected,
                                    counted_qty: counted,
                                    recorded_at: Utc::now(),
                                })?;
                                tracing::info!(
                                    request_id = %ret.request_id,
                                    item_code = %line.item_code,
                                    expected,
                                    counted,
                                    "count discrepancy recorded"
                                );
                            }
                        }
                        None => tracing::warn!(
                            request_id = %ret.request_id,
                            item_code = %line.item_code,
                            "no matching request line; discrepancy check skipped"
                        ),
                    }
                }
            }
            None => tracing::warn!(
                request_id = %ret.request_id,
                return_id = %return_id,
                "originating request not found; discrepancy checks skipped"
            ),
        }

        ret.mark_reconciled()?;
        self.returns.update(&ret)?;
        tracing::info!(return_id = %return_id, movement = %movement, "return reconciled");
        Ok(movement)
    }

    /// Direct site-to-site transfer, bypassing the central warehouse.
    ///
    /// An out-of-band adjustment: reservation and shipped-quantity state on
    /// the request stay untouched. Exactly one transfer-log entry is
    /// written per successful call, whatever the number of items.
    pub fn direct_transfer(
        &self,
        request_id: RequestId,
        target_project: &str,
        items: Vec<TransferItem>,
    ) -> Result<Vec<MovementId>, WorkflowError> {
        if target_project.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "target project is required".to_string(),
            ));
        }
        if items.is_empty() {
            return Err(WorkflowError::Validation(
                "transfer requires at least one item".to_string(),
            ));
        }

        let lock = self.locks.acquire(request_id);
        let _guard = hold(&lock);

        let request = self.load_request(request_id)?;
        let from = request
            .warehouse
            .clone()
            .unwrap_or_else(|| Warehouse::site_default(&request.project));
        let to = Warehouse::site_default(target_project);

        let mut movements = Vec::with_capacity(items.len());
        for (moved, item) in items.iter().enumerate() {
            let uom = request
                .uom_for(&item.item_code)
                .unwrap_or_else(|| DEFAULT_UOM.to_string());
            match self
                .ledger
                .transfer(&from, &to, &item.item_code, item.qty, &uom)
            {
                Ok(movement) => movements.push(movement),
                Err(source) => {
                    return Err(WorkflowError::Transfer {
                        request_id,
                        item_code: item.item_code.clone(),
                        items_moved: moved,
                        source,
                    });
                }
            }
        }

        self.transfers.append(TransferLogEntry {
            request_id,
            target_project: target_project.to_string(),
            items,
            recorded_at: Utc::now(),
        })?;
        tracing::info!(
            request_id = %request_id,
            target_project,
            movements = movements.len(),
            "site-to-site transfer recorded"
        );
        Ok(movements)
    }

    fn load_request(&self, id: RequestId) -> Result<MaterialRequest, WorkflowError> {
        self.requests
            .find(id)?
            .ok_or(WorkflowError::RequestNotFound(id))
    }

    fn load_return(&self, id: ReturnId) -> Result<ReturnCount, WorkflowError> {
        self.returns
            .find(id)?
            .ok_or(WorkflowError::ReturnNotFound(id))
    }

    /// Warehouse reservations live in: the request's own warehouse, else
    /// the configured central default.
    fn reservation_warehouse(&self, request: &MaterialRequest) -> Warehouse {
        request
            .warehouse
            .clone()
            .unwrap_or_else(|| self.settings.default_warehouse.clone())
    }
}
