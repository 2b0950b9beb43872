//! FlavorDB pass: one ingredient per entity id.
//!
//! ```no_run
//! # async fn run(conn: &mut diesel::SqliteConnection) -> anyhow::Result<()> {
//! use flavor_ingestor::providers::flavordb_rest::FlavorDbRestProvider;
//! use pairing_engine::reconcile::flavordb::sync_flavordb;
//!
//! let provider = FlavorDbRestProvider::new()?;
//! let report = sync_flavordb(conn, &provider, 0..1000).await?;
//! println!("{report}");
//! # Ok(()) }
//! ```

use std::ops::Range;

use diesel::{Connection, SqliteConnection};
use flavor_ingestor::models::flavordb::FlavorDbEntity;
use flavor_ingestor::providers::{EntityPayload, EntitySource};
use tracing::{debug, error, info, warn};

use crate::category::{Category, remap_flavordb};
use crate::ids::{FoodbCompoundId, validate_pubchem};
use crate::reconcile::{ReconcileError, SyncReport, names, repo};

/// URL prefix of an English Wikipedia article.
pub const WIKIPEDIA_PREFIX: &str = "https://en.wikipedia.org/wiki/";

/// Article title of a Wikipedia URL, or empty for anything else.
pub fn wikipedia_title(url: &str) -> &str {
    url.strip_prefix(WIKIPEDIA_PREFIX).unwrap_or("")
}

/// Runs a FlavorDB pass over `ids`.
///
/// Clears every `flavordb_found` flag first, so molecules FlavorDB no longer
/// lists for an entity stop counting as FlavorDB evidence. Missing ids are
/// skipped; fetch errors and malformed entities are logged and counted as
/// failed without stopping the pass.
pub async fn sync_flavordb<S>(
    conn: &mut SqliteConnection,
    source: &S,
    ids: Range<u32>,
) -> Result<SyncReport, ReconcileError>
where
    S: EntitySource + ?Sized,
{
    let cleared = repo::reset_flavordb_found(conn)?;
    debug!(rows = cleared, "cleared flavordb_found flags");

    let mut report = SyncReport::default();
    for entity_id in ids {
        let body = match source.fetch_entity(entity_id).await {
            Ok(EntityPayload::Found(body)) => body,
            Ok(EntityPayload::NotFound) => {
                warn!(entity_id, "entity not found");
                report.skipped += 1;
                continue;
            }
            Err(e) => {
                error!(entity_id, error = %e, "fetching entity failed");
                report.failed += 1;
                continue;
            }
        };

        match apply_entity(conn, entity_id, body) {
            Ok(true) => {
                info!(entity_id, "created new ingredient");
                report.created += 1;
            }
            Ok(false) => {
                debug!(entity_id, "updated existing ingredient");
                report.updated += 1;
            }
            Err(e) => {
                error!(entity_id, error = %e, "entity rejected");
                report.failed += 1;
            }
        }
    }

    info!(%report, "FlavorDB pass finished");
    Ok(report)
}

/// Reconciles one entity payload in a single transaction.
///
/// Returns true when the ingredient row was created.
pub fn apply_entity(
    conn: &mut SqliteConnection,
    entity_id: u32,
    body: serde_json::Value,
) -> Result<bool, ReconcileError> {
    let entity = FlavorDbEntity::from_json(body)
        .map_err(|source| ReconcileError::MalformedEntity { entity_id, source })?;
    let flavordb_id =
        i32::try_from(entity_id).map_err(|_| ReconcileError::EntityIdOutOfRange(entity_id))?;

    let category = remap_flavordb(&entity.category).unwrap_or_else(|e| {
        warn!(entity_id, error = %e, "falling back to uncategorized");
        Category::Uncategorized
    });
    let title = wikipedia_title(&entity.entity_alias_url);

    let mut molecules = Vec::with_capacity(entity.molecules.len());
    for m in &entity.molecules {
        let pubchem_id = validate_pubchem(m.pubchem_id)?;
        let foodb_id = match m.foodb_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<FoodbCompoundId>() {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(entity_id, pubchem_id, error = %e, "ignoring FooDB id");
                    None
                }
            },
        };
        molecules.push((pubchem_id, foodb_id));
    }

    let labels = names::prioritized_names(
        &entity.entity_alias_readable,
        &entity.entity_alias_synonyms,
    );

    conn.transaction(|conn| {
        let (ingredient_id, created) =
            repo::upsert_ingredient_by_flavordb_id(conn, flavordb_id, category, title)?;

        for (pubchem_id, foodb_id) in &molecules {
            let molecule_id = repo::upsert_flavordb_molecule(conn, *pubchem_id, foodb_id.as_ref())?;
            repo::mark_flavordb_found(conn, ingredient_id, molecule_id)?;
        }

        for (priority, label) in &labels {
            repo::upsert_name(conn, ingredient_id, label, *priority)?;
        }

        Ok(created)
    })
}
