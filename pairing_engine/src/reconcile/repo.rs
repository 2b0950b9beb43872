//! Upsert statements used by the reconciliation and aggregation passes.
//!
//! All functions expect to run inside the caller's per-record transaction.
use diesel::prelude::*;
use diesel::{SqliteConnection, insert_into};

use crate::category::Category;
use crate::ids::{FoodbCompoundId, FoodbFoodId};
use crate::models::{Molecule, NewIngredient, NewIngredientName, NewMolecule, NewOccurrence, Occurrence};
use crate::reconcile::ReconcileError;
use crate::schema::{ingredient, ingredient_name, molecule, occurrence};

/// upsert ingredient keyed by FlavorDB entity id; returns `(id, created)`
pub fn upsert_ingredient_by_flavordb_id(
    conn: &mut SqliteConnection,
    flavordb_id: i32,
    category: Category,
    wikipedia_title: &str,
) -> QueryResult<(i32, bool)> {
    let existing: Option<i32> = ingredient::table
        .filter(ingredient::flavordb_id.eq(flavordb_id))
        .select(ingredient::id)
        .first(conn)
        .optional()?;

    match existing {
        Some(id) => {
            diesel::update(ingredient::table.find(id))
                .set((
                    ingredient::category.eq(category.code()),
                    ingredient::wikipedia_title.eq(wikipedia_title),
                ))
                .execute(conn)?;
            Ok((id, false))
        }
        None => {
            let id = insert_into(ingredient::table)
                .values(&NewIngredient {
                    category: category.code(),
                    flavordb_id: Some(flavordb_id),
                    foodb_id: None,
                    wikipedia_title,
                })
                .returning(ingredient::id)
                .get_result(conn)?;
            Ok((id, true))
        }
    }
}

/// upsert ingredient keyed by FooDB public food id; returns `(id, created)`
pub fn upsert_ingredient_by_foodb_id(
    conn: &mut SqliteConnection,
    foodb_id: &FoodbFoodId,
    category: Category,
    wikipedia_title: &str,
) -> QueryResult<(i32, bool)> {
    let existing: Option<i32> = ingredient::table
        .filter(ingredient::foodb_id.eq(foodb_id.as_str()))
        .select(ingredient::id)
        .first(conn)
        .optional()?;

    match existing {
        Some(id) => {
            diesel::update(ingredient::table.find(id))
                .set((
                    ingredient::category.eq(category.code()),
                    ingredient::wikipedia_title.eq(wikipedia_title),
                ))
                .execute(conn)?;
            Ok((id, false))
        }
        None => {
            let id = insert_into(ingredient::table)
                .values(&NewIngredient {
                    category: category.code(),
                    flavordb_id: None,
                    foodb_id: Some(foodb_id.as_str()),
                    wikipedia_title,
                })
                .returning(ingredient::id)
                .get_result(conn)?;
            Ok((id, true))
        }
    }
}

/// Sets `foodb_id` on the target ingredients and returns how many were updated.
///
/// With `only_unset_or_equal`, ingredients already carrying a different
/// FooDB id are left alone.
pub fn assign_ingredient_foodb_id(
    conn: &mut SqliteConnection,
    targets: &[i32],
    foodb_id: &FoodbFoodId,
    only_unset_or_equal: bool,
) -> QueryResult<usize> {
    let base = ingredient::table.filter(ingredient::id.eq_any(targets.to_vec()));
    if only_unset_or_equal {
        diesel::update(base.filter(
            ingredient::foodb_id
                .is_null()
                .or(ingredient::foodb_id.eq(foodb_id.as_str())),
        ))
        .set(ingredient::foodb_id.eq(foodb_id.as_str()))
        .execute(conn)
    } else {
        diesel::update(base)
            .set(ingredient::foodb_id.eq(foodb_id.as_str()))
            .execute(conn)
    }
}

/// name upsert keyed by `(ingredient, label)`; an existing name only gets its priority updated
pub fn upsert_name(
    conn: &mut SqliteConnection,
    ingredient_id: i32,
    label: &str,
    priority: i32,
) -> QueryResult<usize> {
    insert_into(ingredient_name::table)
        .values(&NewIngredientName {
            ingredient_id,
            priority,
            label,
        })
        .on_conflict((ingredient_name::ingredient_id, ingredient_name::label))
        .do_update()
        .set(ingredient_name::priority.eq(priority))
        .execute(conn)
}

fn molecule_by_pubchem(conn: &mut SqliteConnection, pubchem_id: i64) -> QueryResult<Option<Molecule>> {
    molecule::table
        .filter(molecule::pubchem_id.eq(pubchem_id))
        .select(Molecule::as_select())
        .first(conn)
        .optional()
}

fn molecule_by_foodb(
    conn: &mut SqliteConnection,
    foodb_id: &FoodbCompoundId,
) -> QueryResult<Option<Molecule>> {
    molecule::table
        .filter(molecule::foodb_id.eq(foodb_id.as_str()))
        .select(Molecule::as_select())
        .first(conn)
        .optional()
}

/// Resolves a FlavorDB molecule reference onto one molecule row.
///
/// Lookup order: PubChem id, then FooDB id, then insert. A missing
/// identifier is attached to the row found. When both ids exist on two
/// separate rows, the FooDB-only row is merged into the PubChem row.
pub fn upsert_flavordb_molecule(
    conn: &mut SqliteConnection,
    pubchem_id: i64,
    foodb_id: Option<&FoodbCompoundId>,
) -> Result<i32, ReconcileError> {
    let by_pubchem = molecule_by_pubchem(conn, pubchem_id)?;
    let Some(f) = foodb_id else {
        return match by_pubchem {
            Some(p) => Ok(p.id),
            None => Ok(insert_molecule(conn, Some(pubchem_id), None)?),
        };
    };
    let conflict = || ReconcileError::MoleculeIdConflict {
        pubchem_id,
        foodb_id: f.to_string(),
    };

    match (by_pubchem, molecule_by_foodb(conn, f)?) {
        (Some(p), None) => {
            // Nothing else holds `f`, so a set FooDB id here is a different one.
            if p.foodb_id.is_some() {
                return Err(conflict());
            }
            diesel::update(molecule::table.find(p.id))
                .set(molecule::foodb_id.eq(f.as_str()))
                .execute(conn)?;
            Ok(p.id)
        }
        (Some(p), Some(m)) if p.id == m.id => Ok(p.id),
        (Some(p), Some(m)) => {
            if p.foodb_id.is_some() || m.pubchem_id.is_some() {
                return Err(conflict());
            }
            merge_molecules(conn, p.id, m.id)?;
            diesel::update(molecule::table.find(p.id))
                .set(molecule::foodb_id.eq(f.as_str()))
                .execute(conn)?;
            Ok(p.id)
        }
        (None, Some(m)) => {
            if m.pubchem_id.is_some() {
                return Err(conflict());
            }
            diesel::update(molecule::table.find(m.id))
                .set(molecule::pubchem_id.eq(pubchem_id))
                .execute(conn)?;
            Ok(m.id)
        }
        (None, None) => Ok(insert_molecule(conn, Some(pubchem_id), Some(f))?),
    }
}

fn insert_molecule(
    conn: &mut SqliteConnection,
    pubchem_id: Option<i64>,
    foodb_id: Option<&FoodbCompoundId>,
) -> QueryResult<i32> {
    insert_into(molecule::table)
        .values(&NewMolecule {
            pubchem_id,
            foodb_id: foodb_id.map(|f| f.as_str()),
        })
        .returning(molecule::id)
        .get_result(conn)
}

/// Folds every occurrence of `absorb` into `keep`, then deletes `absorb`.
///
/// Flags are OR-ed and FooDB accumulators added where both molecules occur
/// in the same ingredient.
pub fn merge_molecules(conn: &mut SqliteConnection, keep: i32, absorb: i32) -> QueryResult<()> {
    let moved: Vec<Occurrence> = occurrence::table
        .filter(occurrence::molecule_id.eq(absorb))
        .select(Occurrence::as_select())
        .load(conn)?;

    for occ in moved {
        let target: Option<Occurrence> = occurrence::table
            .filter(occurrence::ingredient_id.eq(occ.ingredient_id))
            .filter(occurrence::molecule_id.eq(keep))
            .select(Occurrence::as_select())
            .first(conn)
            .optional()?;

        match target {
            Some(t) => {
                diesel::update(occurrence::table.find(t.id))
                    .set((
                        occurrence::flavordb_found.eq(t.flavordb_found || occ.flavordb_found),
                        occurrence::foodb_content_sum
                            .eq(t.foodb_content_sum + occ.foodb_content_sum),
                        occurrence::foodb_content_sample_count
                            .eq(t.foodb_content_sample_count + occ.foodb_content_sample_count),
                    ))
                    .execute(conn)?;
                diesel::delete(occurrence::table.find(occ.id)).execute(conn)?;
            }
            None => {
                diesel::update(occurrence::table.find(occ.id))
                    .set(occurrence::molecule_id.eq(keep))
                    .execute(conn)?;
            }
        }
    }

    diesel::delete(molecule::table.find(absorb)).execute(conn)?;
    Ok(())
}

/// Molecule id for a FooDB compound, inserting a FooDB-only row when missing.
pub fn molecule_by_foodb_id_get_or_create(
    conn: &mut SqliteConnection,
    foodb_id: &FoodbCompoundId,
) -> QueryResult<i32> {
    match molecule_by_foodb(conn, foodb_id)? {
        Some(m) => Ok(m.id),
        None => insert_molecule(conn, None, Some(foodb_id)),
    }
}

/// Marks `(ingredient, molecule)` as present in FlavorDB.
pub fn mark_flavordb_found(
    conn: &mut SqliteConnection,
    ingredient_id: i32,
    molecule_id: i32,
) -> QueryResult<usize> {
    insert_into(occurrence::table)
        .values(&NewOccurrence {
            ingredient_id,
            molecule_id,
            flavordb_found: true,
            foodb_content_sum: 0.0,
            foodb_content_sample_count: 0,
        })
        .on_conflict((occurrence::ingredient_id, occurrence::molecule_id))
        .do_update()
        .set(occurrence::flavordb_found.eq(true))
        .execute(conn)
}

/// Adds one FooDB content sample to `(ingredient, molecule)`.
///
/// The increment happens in SQL so concurrent or repeated runs never lose a
/// sample. Returns true when the occurrence row was created.
pub fn add_content_sample(
    conn: &mut SqliteConnection,
    ingredient_id: i32,
    molecule_id: i32,
    quantity: f64,
) -> QueryResult<bool> {
    let existing: Option<i32> = occurrence::table
        .filter(occurrence::ingredient_id.eq(ingredient_id))
        .filter(occurrence::molecule_id.eq(molecule_id))
        .select(occurrence::id)
        .first(conn)
        .optional()?;

    match existing {
        Some(id) => {
            diesel::update(occurrence::table.find(id))
                .set((
                    occurrence::foodb_content_sum.eq(occurrence::foodb_content_sum + quantity),
                    occurrence::foodb_content_sample_count
                        .eq(occurrence::foodb_content_sample_count + 1),
                ))
                .execute(conn)?;
            Ok(false)
        }
        None => {
            insert_into(occurrence::table)
                .values(&NewOccurrence {
                    ingredient_id,
                    molecule_id,
                    flavordb_found: false,
                    foodb_content_sum: quantity,
                    foodb_content_sample_count: 1,
                })
                .execute(conn)?;
            Ok(true)
        }
    }
}

/// Clears `flavordb_found` on every occurrence.
pub fn reset_flavordb_found(conn: &mut SqliteConnection) -> QueryResult<usize> {
    diesel::update(occurrence::table)
        .set(occurrence::flavordb_found.eq(false))
        .execute(conn)
}

/// Zeroes the FooDB accumulators on every occurrence.
pub fn reset_content_accumulators(conn: &mut SqliteConnection) -> QueryResult<usize> {
    diesel::update(occurrence::table)
        .set((
            occurrence::foodb_content_sum.eq(0.0),
            occurrence::foodb_content_sample_count.eq(0),
        ))
        .execute(conn)
}
