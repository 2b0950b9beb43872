//! FooDB content pass: accumulate measured samples onto occurrences.
//!
//! The pass starts by zeroing every `foodb_content_sum` /
//! `foodb_content_sample_count`, then re-adds each compound sample, so
//! running it twice over the same input yields the same totals as running it
//! once.
//!
//! Resolution per sample:
//! - `food_id` → public food id through the [`FoodIndex`] from the foods
//!   pass → ingredient by `foodb_id` (cached, misses included).
//! - `source_id` → public compound id through the [`CompoundIndex`] →
//!   molecule by `foodb_id`, created when missing (cached once committed).
//!
//! Samples for unknown foods or compounds are expected and skipped quietly.

use std::collections::HashMap;

use diesel::prelude::*;
use flavor_ingestor::io::ndjson::NdjsonLine;
use flavor_ingestor::models::foodb::{CompoundRecord, ContentRecord};
use tracing::{debug, error, info, warn};

use crate::ids::FoodbCompoundId;
use crate::reconcile::foodb::FoodIndex;
use crate::reconcile::{ReconcileError, SyncReport, repo};
use crate::schema::ingredient;

/// FooDB internal compound row id → public compound id.
pub type CompoundIndex = HashMap<i64, FoodbCompoundId>;

/// Builds the compound index from `Compound.json`; bad lines are logged.
pub fn load_compound_index<I>(lines: I) -> CompoundIndex
where
    I: IntoIterator<Item = NdjsonLine<CompoundRecord>>,
{
    let mut index = CompoundIndex::new();
    for NdjsonLine { line, record } in lines {
        if line % 1000 == 0 {
            debug!(line, "processed compound lines");
        }
        match record.map(|c| (c.id, c.public_id.parse::<FoodbCompoundId>())) {
            Ok((id, Ok(public_id))) => {
                index.insert(id, public_id);
            }
            Ok((_, Err(e))) => error!(line, error = %e, "compound record rejected"),
            Err(e) => error!(line, error = %e, "malformed compound record"),
        }
    }
    index
}

/// Why a content sample did not contribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    NotCompound,
    NoQuantity,
    UnknownFood,
    UnknownCompound,
}

enum Outcome {
    Created,
    Updated,
    Skipped(Skip),
}

#[derive(Clone, Copy)]
enum MoleculeRef<'a> {
    Cached(i32),
    Lookup(&'a FoodbCompoundId),
}

struct Resolver<'a> {
    foods: &'a FoodIndex,
    compounds: &'a CompoundIndex,
    ingredients: HashMap<i64, Option<i32>>,
    molecules: HashMap<i64, i32>,
}

impl Resolver<'_> {
    fn ingredient(&mut self, conn: &mut SqliteConnection, food_id: i64) -> QueryResult<Option<i32>> {
        if let Some(hit) = self.ingredients.get(&food_id) {
            return Ok(*hit);
        }
        let resolved = match self.foods.get(&food_id) {
            Some(public_id) => ingredient::table
                .filter(ingredient::foodb_id.eq(public_id.as_str()))
                .select(ingredient::id)
                .first(conn)
                .optional()?,
            None => None,
        };
        self.ingredients.insert(food_id, resolved);
        Ok(resolved)
    }
}

/// Runs the content pass over `lines` (typically `Content.json`).
///
/// Counters: `created` = samples that opened a new occurrence, `updated` =
/// samples added to an existing one, `skipped` = non-compound samples,
/// samples without a quantity and unresolvable references, `failed` =
/// malformed lines and storage errors.
pub fn aggregate_content<I>(
    conn: &mut SqliteConnection,
    lines: I,
    foods: &FoodIndex,
    compounds: &CompoundIndex,
) -> Result<SyncReport, ReconcileError>
where
    I: IntoIterator<Item = NdjsonLine<ContentRecord>>,
{
    let cleared = repo::reset_content_accumulators(conn)?;
    debug!(rows = cleared, "reset FooDB content accumulators");

    let mut resolver = Resolver {
        foods,
        compounds,
        ingredients: HashMap::new(),
        molecules: HashMap::new(),
    };
    let mut report = SyncReport::default();

    for NdjsonLine { line, record } in lines {
        if line % 1000 == 0 {
            debug!(line, "processed content lines");
        }
        let sample = match record {
            Ok(sample) => sample,
            Err(e) => {
                error!(line, error = %e, "malformed content record");
                report.failed += 1;
                continue;
            }
        };

        match apply_sample(conn, &mut resolver, &sample) {
            Ok(Outcome::Created) => report.created += 1,
            Ok(Outcome::Updated) => report.updated += 1,
            Ok(Outcome::Skipped(reason)) => {
                if reason == Skip::NoQuantity {
                    debug!(line, "content sample without quantity");
                }
                report.skipped += 1;
            }
            Err(e) => {
                error!(line, error = %e, "content sample failed");
                report.failed += 1;
            }
        }
    }

    if report.created + report.updated == 0 {
        warn!("content pass did not resolve any sample");
    }
    info!(%report, "FooDB content pass finished");
    Ok(report)
}

fn apply_sample(
    conn: &mut SqliteConnection,
    resolver: &mut Resolver<'_>,
    sample: &ContentRecord,
) -> Result<Outcome, ReconcileError> {
    if !sample.is_compound() {
        return Ok(Outcome::Skipped(Skip::NotCompound));
    }
    let Some(quantity) = sample.quantity() else {
        return Ok(Outcome::Skipped(Skip::NoQuantity));
    };
    let ingredient_id = match sample.food_id {
        Some(food_id) => resolver.ingredient(conn, food_id)?,
        None => None,
    };
    let Some(ingredient_id) = ingredient_id else {
        return Ok(Outcome::Skipped(Skip::UnknownFood));
    };
    let Some(compound_id) = sample.source_id else {
        return Ok(Outcome::Skipped(Skip::UnknownCompound));
    };

    let compounds = resolver.compounds;
    let molecule = match resolver.molecules.get(&compound_id) {
        Some(id) => MoleculeRef::Cached(*id),
        None => match compounds.get(&compound_id) {
            Some(public_id) => MoleculeRef::Lookup(public_id),
            None => return Ok(Outcome::Skipped(Skip::UnknownCompound)),
        },
    };

    let (molecule_id, created) = conn.transaction(|conn| -> Result<_, ReconcileError> {
        let molecule_id = match molecule {
            MoleculeRef::Cached(id) => id,
            MoleculeRef::Lookup(public_id) => repo::molecule_by_foodb_id_get_or_create(conn, public_id)?,
        };
        let created = repo::add_content_sample(conn, ingredient_id, molecule_id, quantity)?;
        Ok((molecule_id, created))
    })?;

    // Cached only after commit so a rolled-back insert is never reused.
    resolver.molecules.insert(compound_id, molecule_id);
    Ok(if created {
        Outcome::Created
    } else {
        Outcome::Updated
    })
}
