//! Ingredient library: display names, the "has data" predicate and the
//! per-category shelves.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use diesel::dsl::exists;
use diesel::prelude::*;
use serde::Serialize;
use tracing::warn;

use crate::category::Category;
use crate::schema::{ingredient, ingredient_name, occurrence};

/// Ids per `IN (...)` query; stays below SQLite's bound-parameter limit.
const ID_CHUNK: usize = 900;

/// Ids of every ingredient with at least one qualifying occurrence.
pub fn has_data_ids(conn: &mut SqliteConnection) -> QueryResult<BTreeSet<i32>> {
    let ids: Vec<i32> = occurrence::table
        .filter(
            occurrence::foodb_content_sample_count
                .gt(0)
                .or(occurrence::flavordb_found.eq(true)),
        )
        .select(occurrence::ingredient_id)
        .distinct()
        .load(conn)?;
    Ok(ids.into_iter().collect())
}

/// True if `ingredient_id` has at least one qualifying occurrence.
pub fn has_data(conn: &mut SqliteConnection, ingredient_id: i32) -> QueryResult<bool> {
    diesel::select(exists(
        occurrence::table
            .filter(occurrence::ingredient_id.eq(ingredient_id))
            .filter(
                occurrence::foodb_content_sample_count
                    .gt(0)
                    .or(occurrence::flavordb_found.eq(true)),
            ),
    ))
    .get_result(conn)
}

/// Display name of each id: its lowest `(priority, id)` name.
///
/// Ids without any name are absent from the map.
pub fn display_names(
    conn: &mut SqliteConnection,
    ingredient_ids: &[i32],
) -> QueryResult<HashMap<i32, String>> {
    let mut names = HashMap::with_capacity(ingredient_ids.len());
    for chunk in ingredient_ids.chunks(ID_CHUNK) {
        let rows: Vec<(i32, String)> = ingredient_name::table
            .filter(ingredient_name::ingredient_id.eq_any(chunk.to_vec()))
            .order((
                ingredient_name::ingredient_id,
                ingredient_name::priority,
                ingredient_name::id,
            ))
            .select((ingredient_name::ingredient_id, ingredient_name::label))
            .load(conn)?;
        for (id, label) in rows {
            names.entry(id).or_insert(label);
        }
    }
    Ok(names)
}

/// One ingredient on a shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryEntry {
    /// Ingredient id.
    pub ingredient_id: i32,
    /// Primary name.
    pub display_name: String,
    /// Has at least one qualifying occurrence.
    pub has_data: bool,
}

/// All library entries of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shelf {
    /// Category.
    pub category: Category,
    /// Category label.
    pub label: &'static str,
    /// Entries sorted by name (case-insensitive), then id.
    pub ingredients: Vec<LibraryEntry>,
}

/// Groups named ingredients into shelves ordered by category code.
///
/// With `with_data_only`, ingredients without qualifying occurrences are
/// left out, and so are shelves that end up empty.
pub fn ingredient_library(
    conn: &mut SqliteConnection,
    with_data_only: bool,
) -> QueryResult<Vec<Shelf>> {
    let ingredients: Vec<(i32, String)> = ingredient::table
        .select((ingredient::id, ingredient::category))
        .order(ingredient::id)
        .load(conn)?;

    let rows: Vec<(i32, String)> = ingredient_name::table
        .order((
            ingredient_name::ingredient_id,
            ingredient_name::priority,
            ingredient_name::id,
        ))
        .select((ingredient_name::ingredient_id, ingredient_name::label))
        .load(conn)?;
    let mut names: HashMap<i32, String> = HashMap::new();
    for (id, label) in rows {
        names.entry(id).or_insert(label);
    }

    let with_data = has_data_ids(conn)?;

    let mut shelves: BTreeMap<&'static str, Shelf> = BTreeMap::new();
    for (id, code) in ingredients {
        let Some(display_name) = names.remove(&id) else {
            continue;
        };
        let has_data = with_data.contains(&id);
        if with_data_only && !has_data {
            continue;
        }
        let category = code.parse::<Category>().unwrap_or_else(|e| {
            warn!(ingredient_id = id, error = %e, "unknown stored category");
            Category::Uncategorized
        });
        shelves
            .entry(category.code())
            .or_insert_with(|| Shelf {
                category,
                label: category.label(),
                ingredients: Vec::new(),
            })
            .ingredients
            .push(LibraryEntry {
                ingredient_id: id,
                display_name,
                has_data,
            });
    }

    Ok(shelves
        .into_values()
        .map(|mut shelf| {
            shelf.ingredients.sort_by(|a, b| {
                a.display_name
                    .to_lowercase()
                    .cmp(&b.display_name.to_lowercase())
                    .then(a.ingredient_id.cmp(&b.ingredient_id))
            });
            shelf
        })
        .collect())
}
