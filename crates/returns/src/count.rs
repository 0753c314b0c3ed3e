use serde::{Deserialize, Serialize};

use chantier_core::{DomainError, DomainResult, ItemCode, RequestId, ReturnId, Warehouse};
use chantier_requests::MaterialRequest;

/// Return-count lifecycle (linear, terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnStatus {
    Counting,
    Reconciled,
}

/// Counted line: quantity stays unset until the counter records it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLine {
    pub item_code: ItemCode,
    pub qty_counted: Option<i64>,
}

impl ReturnLine {
    /// Counted quantity, treating an unset count as zero.
    pub fn counted(&self) -> i64 {
        self.qty_counted.unwrap_or(0)
    }
}

/// Return-count document tied to a material request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnCount {
    pub id: ReturnId,
    pub request_id: RequestId,
    pub project: String,
    pub status: ReturnStatus,
    pub lines: Vec<ReturnLine>,
}

impl ReturnCount {
    /// Blind-count document for a request: one line per distinct item code,
    /// no quantities visible to the counter.
    pub fn for_request(id: ReturnId, request: &MaterialRequest) -> Self {
        let lines = request
            .distinct_item_codes()
            .into_iter()
            .map(|item_code| ReturnLine {
                item_code,
                qty_counted: None,
            })
            .collect();
        Self {
            id,
            request_id: request.id,
            project: request.project.clone(),
            status: ReturnStatus::Counting,
            lines,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.project.trim().is_empty() {
            return Err(DomainError::validation("originating project is required"));
        }
        for line in &self.lines {
            if line.qty_counted.is_some_and(|q| q < 0) {
                return Err(DomainError::validation(format!(
                    "counted qty must be >= 0 for {}",
                    line.item_code
                )));
            }
        }
        Ok(())
    }

    pub fn ensure_status(&self, expected: ReturnStatus, action: &str) -> DomainResult<()> {
        if self.status != expected {
            return Err(DomainError::invariant(format!(
                "cannot {action} a return count in {:?} state",
                self.status
            )));
        }
        Ok(())
    }

    /// Warehouse the counted stock sits in before moving back to central.
    pub fn staging_warehouse(&self) -> Warehouse {
        Warehouse::return_staging(&self.project)
    }

    /// Record the counted quantity for an item while still counting.
    pub fn record_count(&mut self, item_code: &ItemCode, qty: i64) -> DomainResult<()> {
        self.ensure_status(ReturnStatus::Counting, "record a count on")?;
        if qty < 0 {
            return Err(DomainError::validation(format!(
                "counted qty must be >= 0 for {item_code}"
            )));
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| &l.item_code == item_code)
            .ok_or_else(DomainError::not_found)?;
        line.qty_counted = Some(qty);
        Ok(())
    }

    /// Counting → Reconciled.
    pub fn mark_reconciled(&mut self) -> DomainResult<()> {
        self.validate()?;
        self.ensure_status(ReturnStatus::Counting, "submit")?;
        self.status = ReturnStatus::Reconciled;
        Ok(())
    }
}
