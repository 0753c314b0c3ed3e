use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use chantier_core::{ItemCode, RequestId, ReturnId};
use chantier_requests::MaterialRequest;
use chantier_returns::ReturnCount;

/// Storage-layer failure (infrastructure, not domain).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("duplicate document id")]
    DuplicateId,
}

/// Material request persistence.
pub trait RequestRepository: Send + Sync {
    fn insert(&self, request: MaterialRequest) -> Result<(), StorageError>;
    fn find(&self, id: RequestId) -> Result<Option<MaterialRequest>, StorageError>;
    fn update(&self, request: &MaterialRequest) -> Result<(), StorageError>;
}

/// Return-count persistence.
pub trait ReturnRepository: Send + Sync {
    fn insert(&self, ret: ReturnCount) -> Result<(), StorageError>;
    fn find(&self, id: ReturnId) -> Result<Option<ReturnCount>, StorageError>;
    fn update(&self, ret: &ReturnCount) -> Result<(), StorageError>;
}

/// Audit record of a count mismatch found at return reconciliation.
/// Append-only; entries are never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscrepancyEntry {
    pub request_id: RequestId,
    pub item_code: ItemCode,
    pub expected_qty: i64,
    pub counted_qty: i64,
    pub recorded_at: DateTime<Utc>,
}

pub trait DiscrepancyLog: Send + Sync {
    fn append(&self, entry: DiscrepancyEntry) -> Result<(), StorageError>;
    fn entries_for(&self, request_id: RequestId) -> Result<Vec<DiscrepancyEntry>, StorageError>;
}

/// One item of a site-to-site transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferItem {
    pub item_code: ItemCode,
    pub qty: i64,
}

/// Audit record of a direct site-to-site transfer. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLogEntry {
    pub request_id: RequestId,
    pub target_project: String,
    pub items: Vec<TransferItem>,
    pub recorded_at: DateTime<Utc>,
}

pub trait TransferLog: Send + Sync {
    fn append(&self, entry: TransferLogEntry) -> Result<(), StorageError>;
    fn entries_for(&self, request_id: RequestId) -> Result<Vec<TransferLogEntry>, StorageError>;
}
