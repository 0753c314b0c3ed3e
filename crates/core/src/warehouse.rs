//! Warehouse naming.
//!
//! Project warehouses follow a naming convention rather than a registry:
//! `"{project} - Warehouse"` for the site store and `"{project} - Return"`
//! for the return staging area. The convention is isolated here so a real
//! warehouse registry can later replace it without touching workflow logic.

use serde::{Deserialize, Serialize};

/// Name of a warehouse (value object, compared by value).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Warehouse(String);

impl Warehouse {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Site store of a project: `"{project} - Warehouse"`.
    pub fn site_default(project: &str) -> Self {
        Self(format!("{project} - Warehouse"))
    }

    /// Return staging area of a project: `"{project} - Return"`.
    pub fn return_staging(project: &str) -> Self {
        Self(format!("{project} - Return"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Warehouse {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Warehouse {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
