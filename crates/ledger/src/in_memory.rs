use std::collections::HashMap;
use std::sync::RwLock;

use chantier_core::{ItemCode, MovementId, RequestId, ReservationId, Warehouse};

use crate::ledger::{BatchLine, LedgerError, WarehouseLedger};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BinKey {
    warehouse: Warehouse,
    item_code: ItemCode,
}

impl BinKey {
    fn new(warehouse: &Warehouse, item_code: &ItemCode) -> Self {
        Self {
            warehouse: warehouse.clone(),
            item_code: item_code.clone(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Bin {
    actual_qty: i64,
    reserved_qty: i64,
}

/// A recorded movement between two warehouses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movement {
    pub id: MovementId,
    pub from: Warehouse,
    pub to: Warehouse,
    pub lines: Vec<BatchLine>,
}

/// A first-class reservation record tied to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRecord {
    pub id: ReservationId,
    pub request_id: RequestId,
    pub item_code: ItemCode,
    pub warehouse: Warehouse,
    pub qty: i64,
}

#[derive(Debug, Default)]
struct LedgerState {
    bins: HashMap<BinKey, Bin>,
    reservations: Vec<ReservationRecord>,
    movements: Vec<Movement>,
}

/// In-memory warehouse ledger.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
    record_reservations: bool,
}

impl InMemoryLedger {
    /// Ledger with first-class reservation records available.
    pub fn new() -> Self {
        Self {
            state: RwLock::default(),
            record_reservations: true,
        }
    }

    /// Ledger without reservation records, forcing the counter fallback.
    pub fn without_reservation_records() -> Self {
        Self {
            state: RwLock::default(),
            record_reservations: false,
        }
    }

    /// Seed stock for an item in a warehouse (creates the bin).
    pub fn set_stock(&self, warehouse: &Warehouse, item_code: &ItemCode, qty: i64) {
        let mut state = self.state.write().unwrap_or_else(|p| p.into_inner());
        state
            .bins
            .entry(BinKey::new(warehouse, item_code))
            .or_default()
            .actual_qty = qty;
    }

    pub fn stock(&self, warehouse: &Warehouse, item_code: &ItemCode) -> i64 {
        // A poisoned lock still holds consistent data for assertions.
        let state = self.state.read().unwrap_or_else(|p| p.into_inner());
        state
            .bins
            .get(&BinKey::new(warehouse, item_code))
            .map(|b| b.actual_qty)
            .unwrap_or(0)
    }

    pub fn reserved_qty(&self, warehouse: &Warehouse, item_code: &ItemCode) -> i64 {
        let state = self.state.read().unwrap_or_else(|p| p.into_inner());
        state
            .bins
            .get(&BinKey::new(warehouse, item_code))
            .map(|b| b.reserved_qty)
            .unwrap_or(0)
    }

    pub fn movements(&self) -> Vec<Movement> {
        let state = self.state.read().unwrap_or_else(|p| p.into_inner());
        state.movements.clone()
    }

    pub fn reservation_records(&self, request_id: RequestId) -> Vec<ReservationRecord> {
        let state = self.state.read().unwrap_or_else(|p| p.into_inner());
        state
            .reservations
            .iter()
            .filter(|r| r.request_id == request_id)
            .cloned()
            .collect()
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.state
            .write()
            .map_err(|_| LedgerError::Backend("lock poisoned".to_string()))
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl WarehouseLedger for InMemoryLedger {
    fn transfer(
        &self,
        from: &Warehouse,
        to: &Warehouse,
        item_code: &ItemCode,
        qty: i64,
        uom: &str,
    ) -> Result<MovementId, LedgerError> {
        self.transfer_batch(
            from,
            to,
            &[BatchLine {
                item_code: item_code.clone(),
                qty,
                uom: uom.to_string(),
            }],
        )
    }

    fn transfer_batch(
        &self,
        from: &Warehouse,
        to: &Warehouse,
        lines: &[BatchLine],
    ) -> Result<MovementId, LedgerError> {
        let mut state = self.write()?;

        // All-or-nothing: verify every line before moving anything.
        for line in lines {
            let available = state
                .bins
                .get(&BinKey::new(from, &line.item_code))
                .map(|b| b.actual_qty)
                .unwrap_or(0);
            if line.qty > available {
                return Err(LedgerError::InsufficientStock {
                    item_code: line.item_code.clone(),
                    warehouse: from.clone(),
                    available,
                    requested: line.qty,
                });
            }
        }

        for line in lines {
            state
                .bins
                .entry(BinKey::new(from, &line.item_code))
                .or_default()
                .actual_qty -= line.qty;
            state
                .bins
                .entry(BinKey::new(to, &line.item_code))
                .or_default()
                .actual_qty += line.qty;
        }

        let id = MovementId::new();
        state.movements.push(Movement {
            id,
            from: from.clone(),
            to: to.clone(),
            lines: lines.to_vec(),
        });
        Ok(id)
    }

    fn adjust_reserved(
        &self,
        item_code: &ItemCode,
        warehouse: &Warehouse,
        delta: i64,
    ) -> Result<(), LedgerError> {
        let mut state = self.write()?;
        let bin = state
            .bins
            .get_mut(&BinKey::new(warehouse, item_code))
            .ok_or_else(|| LedgerError::UnknownBin {
                item_code: item_code.clone(),
                warehouse: warehouse.clone(),
            })?;
        // Clamped at zero: over-releasing is a no-op.
        bin.reserved_qty = (bin.reserved_qty + delta).max(0);
        Ok(())
    }

    fn create_reservation(
        &self,
        request_id: RequestId,
        item_code: &ItemCode,
        qty: i64,
        warehouse: &Warehouse,
    ) -> Result<ReservationId, LedgerError> {
        if !self.record_reservations {
            return Err(LedgerError::ReservationsUnsupported);
        }
        let mut state = self.write()?;
        let id = ReservationId::new();
        state.reservations.push(ReservationRecord {
            id,
            request_id,
            item_code: item_code.clone(),
            warehouse: warehouse.clone(),
            qty,
        });
        Ok(id)
    }

    fn delete_reservations(
        &self,
        request_id: RequestId,
        item_code: &ItemCode,
    ) -> Result<usize, LedgerError> {
        let mut state = self.write()?;
        let before = state.reservations.len();
        state
            .reservations
            .retain(|r| !(r.request_id == request_id && &r.item_code == item_code));
        Ok(before - state.reservations.len())
    }

    fn supports_reservations(&self) -> bool {
        self.record_reservations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wh(name: &str) -> Warehouse {
        Warehouse::new(name)
    }

    fn item(code: &str) -> ItemCode {
        ItemCode::new(code)
    }

    #[test]
    fn transfer_moves_stock_and_records_movement() {
        let ledger = InMemoryLedger::new();
        ledger.set_stock(&wh("Central"), &item("X"), 10);

        let id = ledger
            .transfer(&wh("Central"), &wh("Site1 - Warehouse"), &item("X"), 4, "Unit")
            .unwrap();

        assert_eq!(ledger.stock(&wh("Central"), &item("X")), 6);
        assert_eq!(ledger.stock(&wh("Site1 - Warehouse"), &item("X")), 4);
        let movements = ledger.movements();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].id, id);
        assert_eq!(movements[0].lines.len(), 1);
    }

    #[test]
    fn transfer_fails_on_insufficient_stock() {
        let ledger = InMemoryLedger::new();
        ledger.set_stock(&wh("Central"), &item("X"), 2);

        let err = ledger
            .transfer(&wh("Central"), &wh("Site1 - Warehouse"), &item("X"), 4, "Unit")
            .unwrap_err();

        match err {
            LedgerError::InsufficientStock {
                available, requested, ..
            } => {
                assert_eq!(available, 2);
                assert_eq!(requested, 4);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(ledger.stock(&wh("Central"), &item("X")), 2);
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let ledger = InMemoryLedger::new();
        ledger.set_stock(&wh("Central"), &item("A"), 10);
        // no stock for B

        let err = ledger
            .transfer_batch(
                &wh("Central"),
                &wh("Site1 - Warehouse"),
                &[
                    BatchLine {
                        item_code: item("A"),
                        qty: 5,
                        uom: "Unit".to_string(),
                    },
                    BatchLine {
                        item_code: item("B"),
                        qty: 1,
                        uom: "Unit".to_string(),
                    },
                ],
            )
            .unwrap_err();

        assert!(matches!(err, LedgerError::InsufficientStock { .. }));
        // First line untouched despite passing its own check.
        assert_eq!(ledger.stock(&wh("Central"), &item("A")), 10);
        assert!(ledger.movements().is_empty());
    }

    #[test]
    fn zero_qty_lines_transfer_without_stock() {
        let ledger = InMemoryLedger::new();
        let id = ledger
            .transfer_batch(
                &wh("Site1 - Return"),
                &wh("Central"),
                &[BatchLine {
                    item_code: item("X"),
                    qty: 0,
                    uom: "Unit".to_string(),
                }],
            )
            .unwrap();
        assert_eq!(ledger.movements()[0].id, id);
    }

    #[test]
    fn adjust_reserved_clamps_at_zero() {
        let ledger = InMemoryLedger::new();
        ledger.set_stock(&wh("Central"), &item("X"), 10);

        ledger.adjust_reserved(&item("X"), &wh("Central"), 4).unwrap();
        assert_eq!(ledger.reserved_qty(&wh("Central"), &item("X")), 4);

        ledger.adjust_reserved(&item("X"), &wh("Central"), -4).unwrap();
        ledger.adjust_reserved(&item("X"), &wh("Central"), -4).unwrap();
        assert_eq!(ledger.reserved_qty(&wh("Central"), &item("X")), 0);
    }

    #[test]
    fn adjust_reserved_requires_bin() {
        let ledger = InMemoryLedger::new();
        let err = ledger
            .adjust_reserved(&item("X"), &wh("Central"), 1)
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnknownBin { .. }));
    }

    #[test]
    fn reservation_records_round_trip() {
        let ledger = InMemoryLedger::new();
        let request_id = RequestId::new();

        ledger
            .create_reservation(request_id, &item("X"), 4, &wh("Central"))
            .unwrap();
        assert_eq!(ledger.reservation_records(request_id).len(), 1);

        let deleted = ledger.delete_reservations(request_id, &item("X")).unwrap();
        assert_eq!(deleted, 1);
        assert!(ledger.reservation_records(request_id).is_empty());

        // Deleting again matches zero records.
        let deleted = ledger.delete_reservations(request_id, &item("X")).unwrap();
        assert_eq!(deleted, 0);
    }

    #[test]
    fn reservation_records_can_be_disabled() {
        let ledger = InMemoryLedger::without_reservation_records();
        assert!(!ledger.supports_reservations());
        let err = ledger
            .create_reservation(RequestId::new(), &item("X"), 4, &wh("Central"))
            .unwrap_err();
        assert_eq!(err, LedgerError::ReservationsUnsupported);
    }
}
