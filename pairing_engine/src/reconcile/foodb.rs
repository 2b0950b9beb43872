//! FooDB foods pass: match foods onto existing ingredients by name, insert
//! the rest.
//!
//! ## Phases
//! 1. Snapshot the existing names into a [`NameIndex`].
//! 2. For each food record: validate the public id, remember it in the
//!    [`FoodIndex`], apply the skip rules, then try the mangled-name
//!    candidates in order. The first candidate matches unconditionally;
//!    fallbacks only claim ingredients whose `foodb_id` is unset or equal.
//! 3. Foods no candidate matched are upserted as FooDB-only ingredients
//!    with their name at priority -1.

use std::collections::HashMap;

use diesel::{Connection, SqliteConnection};
use flavor_ingestor::io::ndjson::NdjsonLine;
use flavor_ingestor::models::foodb::FoodRecord;
use tracing::{debug, error, info, warn};

use crate::category::{Category, from_foodb_group};
use crate::ids::FoodbFoodId;
use crate::reconcile::names::{self, NameIndex};
use crate::reconcile::{ReconcileError, SyncReport, repo};

/// FooDB internal food row id → public food id.
pub type FoodIndex = HashMap<i64, FoodbFoodId>;

/// Result of [`reconcile_foods`].
#[derive(Debug, Default)]
pub struct FoodsOutcome {
    /// Every food with a valid public id, matched or not.
    pub food_index: FoodIndex,
    /// Counters: `updated` = matched onto an existing ingredient,
    /// `created`/`updated` in the second phase for FooDB-only ingredients.
    pub report: SyncReport,
}

/// Runs the foods pass over `lines` (typically `Food.json`).
pub fn reconcile_foods<I>(conn: &mut SqliteConnection, lines: I) -> Result<FoodsOutcome, ReconcileError>
where
    I: IntoIterator<Item = NdjsonLine<FoodRecord>>,
{
    let index = NameIndex::load(conn)?;
    debug!(names = index.len(), "loaded name index");

    let mut outcome = FoodsOutcome::default();
    let mut unmatched = Vec::new();

    for NdjsonLine { line, record } in lines {
        if line % 1000 == 0 {
            debug!(line, "processed food lines");
        }
        let food = match record {
            Ok(food) => food,
            Err(e) => {
                error!(line, error = %e, "malformed food record");
                outcome.report.failed += 1;
                continue;
            }
        };
        let foodb_id = match food.public_id.parse::<FoodbFoodId>() {
            Ok(id) => id,
            Err(e) => {
                error!(line, error = %e, "food record rejected");
                outcome.report.failed += 1;
                continue;
            }
        };
        outcome.food_index.insert(food.id, foodb_id.clone());

        if let Some(reason) = names::skip_reason(&food.name, food.export_to_foodb) {
            debug!(line, name = %food.name, ?reason, "food skipped");
            outcome.report.skipped += 1;
            continue;
        }

        match match_food(conn, &index, &food.name, &foodb_id) {
            Ok(true) => outcome.report.updated += 1,
            Ok(false) => unmatched.push((line, food, foodb_id)),
            Err(e) => {
                error!(line, %foodb_id, error = %e, "matching food failed");
                outcome.report.failed += 1;
            }
        }
    }

    info!(
        count = unmatched.len(),
        "unmatched foods will be inserted individually"
    );

    for (line, food, foodb_id) in unmatched {
        match insert_unmatched(conn, &food, &foodb_id) {
            Ok(true) => outcome.report.created += 1,
            Ok(false) => outcome.report.updated += 1,
            Err(e) => {
                error!(line, %foodb_id, error = %e, "inserting food failed");
                outcome.report.failed += 1;
            }
        }
    }

    info!(report = %outcome.report, "FooDB foods pass finished");
    Ok(outcome)
}

/// Tries each name candidate; true when some ingredient took the FooDB id.
pub fn match_food(
    conn: &mut SqliteConnection,
    index: &NameIndex,
    name: &str,
    foodb_id: &FoodbFoodId,
) -> Result<bool, ReconcileError> {
    conn.transaction(|conn| {
        for (position, candidate) in names::match_candidates(name).iter().enumerate() {
            let Some(targets) = index.targets(candidate) else {
                continue;
            };
            let fallback = position > 0;
            if repo::assign_ingredient_foodb_id(conn, &targets, foodb_id, fallback)? > 0 {
                debug!(%foodb_id, candidate = %candidate, fallback, "matched food");
                return Ok(true);
            }
        }
        Ok(false)
    })
}

/// Category of a FooDB food from its group pair; unknown pairs are
/// uncategorized.
pub fn food_category(food: &FoodRecord) -> Category {
    let group = food.food_group.as_deref().unwrap_or("");
    let subgroup = food.food_subgroup.as_deref().unwrap_or("");
    from_foodb_group(group, subgroup).unwrap_or_else(|| {
        warn!(group, subgroup, "could not map FooDB group");
        Category::Uncategorized
    })
}

/// Upserts a FooDB-only ingredient and its priority -1 name.
///
/// Returns true when the ingredient row was created.
pub fn insert_unmatched(
    conn: &mut SqliteConnection,
    food: &FoodRecord,
    foodb_id: &FoodbFoodId,
) -> Result<bool, ReconcileError> {
    let category = food_category(food);
    let title = food.wikipedia_id.as_deref().unwrap_or("");
    let label = names::normalize_label(&food.name);

    conn.transaction(|conn| {
        let (ingredient_id, created) =
            repo::upsert_ingredient_by_foodb_id(conn, foodb_id, category, title)?;
        if !label.is_empty() {
            repo::upsert_name(conn, ingredient_id, &label, -1)?;
        }
        Ok(created)
    })
}

/// Rebuilds the food index from `Food.json` without touching the store.
///
/// Used when the content pass runs on its own.
pub fn load_food_index<I>(lines: I) -> FoodIndex
where
    I: IntoIterator<Item = NdjsonLine<FoodRecord>>,
{
    let mut index = FoodIndex::new();
    for NdjsonLine { line, record } in lines {
        match record.map(|f| (f.id, f.public_id.parse::<FoodbFoodId>())) {
            Ok((id, Ok(public_id))) => {
                index.insert(id, public_id);
            }
            Ok((_, Err(e))) => warn!(line, error = %e, "food id ignored"),
            Err(e) => warn!(line, error = %e, "malformed food record"),
        }
    }
    index
}
