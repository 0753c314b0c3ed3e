//! Item value types.

use serde::{Deserialize, Serialize};

/// Unit of measure used when a line does not carry one of its own.
pub const DEFAULT_UOM: &str = "Unit";

/// Catalogue code of a stock item (value object, compared by value).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemCode(String);

impl ItemCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ItemCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemCode {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemCode {
    fn from(value: String) -> Self {
        Self(value)
    }
}
