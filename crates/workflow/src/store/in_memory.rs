use std::collections::HashMap;
use std::sync::RwLock;

use chantier_core::{RequestId, ReturnId};
use chantier_requests::MaterialRequest;
use chantier_returns::ReturnCount;

use super::r#trait::{
    DiscrepancyEntry, DiscrepancyLog, RequestRepository, ReturnRepository, StorageError,
    TransferLog, TransferLogEntry,
};

fn poisoned() -> StorageError {
    StorageError::Unavailable("lock poisoned".to_string())
}

/// In-memory request repository. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRequests {
    inner: RwLock<HashMap<RequestId, MaterialRequest>>,
}

impl InMemoryRequests {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestRepository for InMemoryRequests {
    fn insert(&self, request: MaterialRequest) -> Result<(), StorageError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(&request.id) {
            return Err(StorageError::DuplicateId);
        }
        map.insert(request.id, request);
        Ok(())
    }

    fn find(&self, id: RequestId) -> Result<Option<MaterialRequest>, StorageError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    fn update(&self, request: &MaterialRequest) -> Result<(), StorageError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(request.id, request.clone());
        Ok(())
    }
}

/// In-memory return-count repository. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryReturns {
    inner: RwLock<HashMap<ReturnId, ReturnCount>>,
}

impl InMemoryReturns {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReturnRepository for InMemoryReturns {
    fn insert(&self, ret: ReturnCount) -> Result<(), StorageError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(&ret.id) {
            return Err(StorageError::DuplicateId);
        }
        map.insert(ret.id, ret);
        Ok(())
    }

    fn find(&self, id: ReturnId) -> Result<Option<ReturnCount>, StorageError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    fn update(&self, ret: &ReturnCount) -> Result<(), StorageError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(ret.id, ret.clone());
        Ok(())
    }
}

/// In-memory discrepancy audit trail.
#[derive(Debug, Default)]
pub struct InMemoryDiscrepancyLog {
    entries: RwLock<Vec<DiscrepancyEntry>>,
}

impl InMemoryDiscrepancyLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiscrepancyLog for InMemoryDiscrepancyLog {
    fn append(&self, entry: DiscrepancyEntry) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.push(entry);
        Ok(())
    }

    fn entries_for(&self, request_id: RequestId) -> Result<Vec<DiscrepancyEntry>, StorageError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries
            .iter()
            .filter(|e| e.request_id == request_id)
            .cloned()
            .collect())
    }
}

/// In-memory site-transfer audit trail.
#[derive(Debug, Default)]
pub struct InMemoryTransferLog {
    entries: RwLock<Vec<TransferLogEntry>>,
}

impl InMemoryTransferLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransferLog for InMemoryTransferLog {
    fn append(&self, entry: TransferLogEntry) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.push(entry);
        Ok(())
    }

    fn entries_for(&self, request_id: RequestId) -> Result<Vec<TransferLogEntry>, StorageError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries
            .iter()
            .filter(|e| e.request_id == request_id)
            .cloned()
            .collect())
    }
}
