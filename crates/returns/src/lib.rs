//! Return-count domain module.
//!
//! A return count is opened against a material request with its quantities
//! hidden (blind count), then reconciled against the request's expected
//! quantities at submission. Pure domain logic; the ledger transfer and
//! discrepancy logging are orchestrated elsewhere.

pub mod count;

pub use count::{ReturnCount, ReturnLine, ReturnStatus};
