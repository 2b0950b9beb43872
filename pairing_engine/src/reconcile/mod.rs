//! Identity reconciliation: FlavorDB entities and FooDB foods onto canonical
//! ingredients and molecules.
//!
//! ## Passes
//! - [`flavordb::sync_flavordb`] walks FlavorDB entity ids, upserting one
//!   ingredient per entity (keyed by `flavordb_id`) with its names,
//!   molecules (keyed by PubChem id) and `flavordb_found` occurrences.
//! - [`foodb::reconcile_foods`] matches FooDB foods onto those ingredients by
//!   mangled name (see [`names`]) and inserts the rest as FooDB-only
//!   ingredients. It returns the FooDB row id → public id map the content
//!   pass resolves against.
//!
//! ## Failure model
//! Every entity/record is written in its own transaction. A failing record is
//! logged, counted in [`SyncReport::failed`] and rolled back; earlier records
//! stay committed. Only errors outside a record (opening the input, resetting
//! flags) abort a pass.

pub mod flavordb;
pub mod foodb;
pub mod names;
pub mod repo;

use std::fmt;

use serde::Serialize;

use crate::ids::IdError;

/// Per-pass counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// New rows.
    pub created: usize,
    /// Existing rows written again.
    pub updated: usize,
    /// Records ignored by design (not found, skip rules, unresolved references).
    pub skipped: usize,
    /// Records rejected by an error.
    pub failed: usize,
}

impl SyncReport {
    /// Records looked at.
    pub fn total(&self) -> usize {
        self.created + self.updated + self.skipped + self.failed
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created={} updated={} skipped={} failed={}",
            self.created, self.updated, self.skipped, self.failed
        )
    }
}

/// Errors raised while reconciling a record or running a pass.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Storage failure.
    #[error(transparent)]
    Db(#[from] diesel::result::Error),
    /// A malformed upstream identifier.
    #[error(transparent)]
    Id(#[from] IdError),
    /// Reading an input file failed.
    #[error(transparent)]
    Input(#[from] flavor_ingestor::errors::Error),
    /// Entity JSON did not have the expected shape.
    #[error("malformed entity {entity_id}: {source}")]
    MalformedEntity {
        /// FlavorDB entity id.
        entity_id: u32,
        /// Decode error.
        source: serde_json::Error,
    },
    /// Entity id does not fit the `flavordb_id` column.
    #[error("entity id {0} out of range")]
    EntityIdOutOfRange(u32),
    /// The PubChem and FooDB ids are already bound to different molecules.
    #[error(
        "molecule identifiers conflict: PubChem {pubchem_id} and FooDB {foodb_id} belong to different molecules"
    )]
    MoleculeIdConflict {
        /// PubChem id from the entity.
        pubchem_id: i64,
        /// FooDB compound id from the entity.
        foodb_id: String,
    },
}
