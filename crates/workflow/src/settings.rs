use serde::{Deserialize, Serialize};

use chantier_core::Warehouse;

/// Central stock configuration shared by the workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSettings {
    /// Central warehouse: shipment source and return destination, and the
    /// default reservation warehouse when a request carries none.
    pub default_warehouse: Warehouse,
}

impl StockSettings {
    pub fn new(default_warehouse: Warehouse) -> Self {
        Self { default_warehouse }
    }
}
