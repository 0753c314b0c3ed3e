use thiserror::Error;

use chantier_core::{DomainError, ItemCode, RequestId, ReturnId};
use chantier_ledger::LedgerError;

use crate::store::StorageError;

/// Caller-facing error of a workflow operation.
///
/// Validation and guard failures block the transition before any mutation.
/// Ledger failures during shipment and direct transfer surface with the
/// operation's partial progress intact; there is no automatic compensation.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("request {0} not found")]
    RequestNotFound(RequestId),

    #[error("return count {0} not found")]
    ReturnNotFound(ReturnId),

    /// Fatal mid-loop ledger failure while shipping. Lines shipped before
    /// the failure stay applied and visible for manual remediation.
    #[error(
        "shipment of request {request_id} failed at {item_code} \
         after {lines_shipped} shipped line(s): {source}"
    )]
    Shipment {
        request_id: RequestId,
        item_code: ItemCode,
        lines_shipped: usize,
        source: LedgerError,
    },

    /// The return batch transfer failed; the return stays in Counting and
    /// may be resubmitted.
    #[error("return count {return_id} could not be reconciled: {source}")]
    ReturnSubmit {
        return_id: ReturnId,
        source: LedgerError,
    },

    /// Fatal mid-loop ledger failure during a site-to-site transfer.
    /// Items moved before the failure stay applied; no log entry is written.
    #[error(
        "site transfer from request {request_id} failed at {item_code} \
         after {items_moved} moved item(s): {source}"
    )]
    Transfer {
        request_id: RequestId,
        item_code: ItemCode,
        items_moved: usize,
        source: LedgerError,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<DomainError> for WorkflowError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => WorkflowError::Validation(msg),
            DomainError::InvariantViolation(msg) => WorkflowError::InvariantViolation(msg),
            DomainError::InvalidId(msg) => WorkflowError::Validation(msg),
            DomainError::NotFound => WorkflowError::Validation("referenced line not found".into()),
        }
    }
}
