//! Upstream plumbing for the ingredient pairing engine.
//!
//! - [`providers`]: fetch FlavorDB entities by id (REST, cached replay, fakes).
//! - [`io`]: stream FooDB NDJSON dumps record by record.
//! - [`models`]: raw upstream record shapes, decoded but not validated.

pub mod errors;
pub mod io;
pub mod models;
pub mod providers;
