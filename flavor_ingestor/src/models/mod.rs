//! Raw upstream record shapes.
//!
//! These mirror the external formats byte for byte (including upstream
//! field-name quirks) and do no validation beyond JSON typing. Identity
//! reconciliation happens in `pairing_engine`.

pub mod flavordb;
pub mod foodb;
