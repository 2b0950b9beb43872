//! Readers for upstream data dumps.

pub mod ndjson;
