use serde::{Deserialize, Serialize};

use chantier_core::{DomainError, DomainResult, ItemCode, RequestId, Warehouse};

/// Material request lifecycle (linear; no back-transitions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Draft,
    Reserved,
    Shipped,
}

/// Request line: item, unit of measure, requested/reserved/shipped quantities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLine {
    pub item_code: ItemCode,
    pub uom: String,
    pub qty_requested: i64,
    /// Set at submission; equals `qty_requested` under current policy.
    pub qty_reserved: Option<i64>,
    /// Set at shipment only.
    pub qty_shipped: Option<i64>,
}

impl RequestLine {
    pub fn new(item_code: ItemCode, uom: impl Into<String>, qty_requested: i64) -> Self {
        Self {
            item_code,
            uom: uom.into(),
            qty_requested,
            qty_reserved: None,
            qty_shipped: None,
        }
    }

    /// Quantity a shipment moves for this line: reserved, else requested.
    pub fn shippable_qty(&self) -> i64 {
        self.qty_reserved.unwrap_or(self.qty_requested)
    }

    /// Quantity expected back at return counting: shipped, else reserved,
    /// else requested, in that precedence order.
    pub fn expected_return_qty(&self) -> i64 {
        self.qty_shipped
            .or(self.qty_reserved)
            .unwrap_or(self.qty_requested)
    }
}

/// Material request document (DMC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRequest {
    pub id: RequestId,
    pub project: String,
    /// Explicit target warehouse; when unset the `"{project} - Warehouse"`
    /// convention applies.
    pub warehouse: Option<Warehouse>,
    pub status: RequestStatus,
    pub lines: Vec<RequestLine>,
}

impl MaterialRequest {
    pub fn new(
        id: RequestId,
        project: impl Into<String>,
        warehouse: Option<Warehouse>,
        lines: Vec<RequestLine>,
    ) -> Self {
        Self {
            id,
            project: project.into(),
            warehouse,
            status: RequestStatus::Draft,
            lines,
        }
    }

    /// Entry guard: runs before any transition that persists the request.
    pub fn validate(&self) -> DomainResult<()> {
        if self.project.trim().is_empty() {
            return Err(DomainError::validation("project is required"));
        }
        for line in &self.lines {
            if line.qty_requested <= 0 {
                return Err(DomainError::validation(format!(
                    "requested qty must be > 0 for {}",
                    line.item_code
                )));
            }
        }
        Ok(())
    }

    pub fn ensure_status(&self, expected: RequestStatus, action: &str) -> DomainResult<()> {
        if self.status != expected {
            return Err(DomainError::invariant(format!(
                "cannot {action} a request in {:?} state",
                self.status
            )));
        }
        Ok(())
    }

    /// Shipment destination, falling back to the project convention.
    pub fn destination_warehouse(&self) -> Warehouse {
        self.warehouse
            .clone()
            .unwrap_or_else(|| Warehouse::site_default(&self.project))
    }

    /// Whether a return count may be opened against this request.
    pub fn returnable(&self) -> bool {
        matches!(self.status, RequestStatus::Reserved | RequestStatus::Shipped)
    }

    /// Draft → Reserved: fixes `qty_reserved = qty_requested` on every line
    /// (no partial reservation under current policy).
    pub fn mark_reserved(&mut self) -> DomainResult<()> {
        self.validate()?;
        self.ensure_status(RequestStatus::Draft, "submit")?;
        for line in &mut self.lines {
            line.qty_reserved = Some(line.qty_requested);
        }
        self.status = RequestStatus::Reserved;
        Ok(())
    }

    /// Record one line as shipped, moving its shippable quantity.
    pub fn record_line_shipped(&mut self, index: usize) -> DomainResult<i64> {
        self.ensure_status(RequestStatus::Reserved, "ship")?;
        let line = self
            .lines
            .get_mut(index)
            .ok_or_else(DomainError::not_found)?;
        let qty = line.shippable_qty();
        line.qty_shipped = Some(qty);
        Ok(qty)
    }

    /// Reserved → Shipped, once every line has been processed.
    pub fn mark_shipped(&mut self) -> DomainResult<()> {
        self.ensure_status(RequestStatus::Reserved, "ship")?;
        self.status = RequestStatus::Shipped;
        Ok(())
    }

    /// Distinct item codes in line order (first occurrence wins).
    pub fn distinct_item_codes(&self) -> Vec<ItemCode> {
        let mut seen = Vec::new();
        for line in &self.lines {
            if !seen.contains(&line.item_code) {
                seen.push(line.item_code.clone());
            }
        }
        seen
    }

    /// Expected return quantity for an item, from its first matching line.
    pub fn expected_qty(&self, item_code: &ItemCode) -> Option<i64> {
        self.lines
            .iter()
            .find(|l| &l.item_code == item_code)
            .map(RequestLine::expected_return_qty)
    }

    /// Unit of measure of an item's first matching line.
    pub fn uom_for(&self, item_code: &ItemCode) -> Option<String> {
        self.lines
            .iter()
            .find(|l| &l.item_code == item_code)
            .map(|l| l.uom.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(code: &str, qty: i64) -> RequestLine {
        RequestLine::new(ItemCode::new(code), "Unit", qty)
    }

    fn draft(lines: Vec<RequestLine>) -> MaterialRequest {
        MaterialRequest::new(RequestId::new(), "Site1", None, lines)
    }

    #[test]
    fn validate_rejects_missing_project() {
        let request = MaterialRequest::new(RequestId::new(), "  ", None, vec![line("X", 4)]);
        let err = request.validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn validate_rejects_non_positive_qty() {
        let request = draft(vec![line("X", 4), line("Y", 0)]);
        let err = request.validate().unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("Y")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn mark_reserved_fixes_reserved_to_requested() {
        let mut request = draft(vec![line("X", 4), line("Y", 2)]);
        request.mark_reserved().unwrap();

        assert_eq!(request.status, RequestStatus::Reserved);
        assert!(request.lines.iter().all(|l| l.qty_reserved == Some(l.qty_requested)));
    }

    #[test]
    fn mark_reserved_rejects_non_draft() {
        let mut request = draft(vec![line("X", 4)]);
        request.mark_reserved().unwrap();
        let err = request.mark_reserved().unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn validation_failure_leaves_state_untouched() {
        let mut request = draft(vec![line("X", -1)]);
        let before = request.clone();
        assert!(request.mark_reserved().is_err());
        assert_eq!(request, before);
    }

    #[test]
    fn shippable_qty_falls_back_to_requested() {
        let mut l = line("X", 4);
        assert_eq!(l.shippable_qty(), 4);
        l.qty_reserved = Some(3);
        assert_eq!(l.shippable_qty(), 3);
    }

    #[test]
    fn record_line_shipped_requires_reserved_status() {
        let mut request = draft(vec![line("X", 4)]);
        let err = request.record_line_shipped(0).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn ship_transition_sets_shipped_qty() {
        let mut request = draft(vec![line("X", 4)]);
        request.mark_reserved().unwrap();

        let qty = request.record_line_shipped(0).unwrap();
        request.mark_shipped().unwrap();

        assert_eq!(qty, 4);
        assert_eq!(request.lines[0].qty_shipped, Some(4));
        assert_eq!(request.status, RequestStatus::Shipped);
    }

    #[test]
    fn expected_qty_precedence_is_shipped_then_reserved_then_requested() {
        let mut l = line("X", 10);
        assert_eq!(l.expected_return_qty(), 10);
        l.qty_reserved = Some(8);
        assert_eq!(l.expected_return_qty(), 8);
        l.qty_shipped = Some(6);
        assert_eq!(l.expected_return_qty(), 6);
    }

    #[test]
    fn destination_warehouse_uses_project_convention_when_unset() {
        let request = draft(vec![line("X", 4)]);
        assert_eq!(request.destination_warehouse().as_str(), "Site1 - Warehouse");

        let explicit = MaterialRequest::new(
            RequestId::new(),
            "Site1",
            Some(Warehouse::new("Depot A")),
            vec![line("X", 4)],
        );
        assert_eq!(explicit.destination_warehouse().as_str(), "Depot A");
    }

    #[test]
    fn distinct_item_codes_dedups_in_order() {
        let request = draft(vec![line("X", 1), line("Y", 2), line("X", 3)]);
        let codes = request.distinct_item_codes();
        assert_eq!(codes, vec![ItemCode::new("X"), ItemCode::new("Y")]);
    }

    #[test]
    fn persisted_shape_round_trips() {
        let mut request = draft(vec![line("X", 4)]);
        request.mark_reserved().unwrap();

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["status"], "reserved");
        assert_eq!(json["lines"][0]["qty_reserved"], 4);

        let back: MaterialRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, request);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: any request carrying a non-positive line fails
            /// validation, whatever the other lines look like.
            #[test]
            fn non_positive_line_always_fails_validation(
                good_qtys in proptest::collection::vec(1i64..1_000, 0..5),
                bad_qty in -1_000i64..=0,
                position in 0usize..5,
            ) {
                let mut lines: Vec<RequestLine> = good_qtys
                    .iter()
                    .enumerate()
                    .map(|(i, q)| RequestLine::new(ItemCode::new(format!("I{i}")), "Unit", *q))
                    .collect();
                let at = position.min(lines.len());
                lines.insert(at, RequestLine::new(ItemCode::new("BAD"), "Unit", bad_qty));

                let request = MaterialRequest::new(RequestId::new(), "Site1", None, lines);
                prop_assert!(request.validate().is_err());
            }

            /// Property: submission reserves exactly the requested qty on
            /// every line.
            #[test]
            fn reservation_matches_request(qtys in proptest::collection::vec(1i64..1_000, 1..6)) {
                let lines: Vec<RequestLine> = qtys
                    .iter()
                    .enumerate()
                    .map(|(i, q)| RequestLine::new(ItemCode::new(format!("I{i}")), "Unit", *q))
                    .collect();
                let mut request = MaterialRequest::new(RequestId::new(), "Site1", None, lines);
                request.mark_reserved().unwrap();
                for line in &request.lines {
                    prop_assert_eq!(line.qty_reserved, Some(line.qty_requested));
                }
            }
        }
    }
}
