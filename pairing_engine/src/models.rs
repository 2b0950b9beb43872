//! Diesel models mapping to the database schema.
//!
//! These types mirror the tables defined in the embedded migrations and in
//! [`crate::schema`]:
//! - [`crate::schema::ingredient`]: canonical food items
//! - [`crate::schema::ingredient_name`]: display labels, ordered by `(priority, id)`
//! - [`crate::schema::molecule`]: canonical compounds, keyed by PubChem and/or FooDB id
//! - [`crate::schema::occurrence`]: ingredient↔molecule evidence from both sources
//!
//! See migrations for constraints (identifier `GLOB` checks, the molecule
//! "at least one identifier" check, and `ON DELETE CASCADE` FKs).

use diesel::prelude::*;

use crate::schema::*;

/// A row in [`crate::schema::ingredient`].
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = ingredient, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Ingredient {
    /// Database primary key.
    pub id: i32,
    /// Canonical category code (see [`crate::category::Category`]).
    pub category: String,
    /// FlavorDB entity id; unique when present.
    pub flavordb_id: Option<i32>,
    /// FooDB public food id (`FOOD#####`); unique when present.
    pub foodb_id: Option<String>,
    /// Wikipedia article title, or empty.
    pub wikipedia_title: String,
}

/// Insertable form of [`Ingredient`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ingredient)]
pub struct NewIngredient<'a> {
    /// Canonical category code.
    pub category: &'a str,
    /// FlavorDB entity id.
    pub flavordb_id: Option<i32>,
    /// FooDB public food id.
    pub foodb_id: Option<&'a str>,
    /// Wikipedia article title, or empty.
    pub wikipedia_title: &'a str,
}

/// A row in [`crate::schema::ingredient_name`].
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = ingredient_name, check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(belongs_to(Ingredient, foreign_key = ingredient_id))]
pub struct IngredientName {
    /// Database primary key; doubles as insertion order.
    pub id: i32,
    /// FK to [`Ingredient::id`].
    pub ingredient_id: i32,
    /// Lower sorts first. FlavorDB names use their list position, unmatched
    /// FooDB names use -1.
    pub priority: i32,
    /// Display label, unique per ingredient.
    pub label: String,
}

/// Insertable form of [`IngredientName`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ingredient_name)]
pub struct NewIngredientName<'a> {
    /// FK to [`Ingredient::id`].
    pub ingredient_id: i32,
    /// Sort priority.
    pub priority: i32,
    /// Display label.
    pub label: &'a str,
}

/// A row in [`crate::schema::molecule`].
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = molecule, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Molecule {
    /// Database primary key.
    pub id: i32,
    /// PubChem compound id.
    pub pubchem_id: Option<i64>,
    /// FooDB public compound id (`FDB######`).
    pub foodb_id: Option<String>,
}

/// Insertable form of [`Molecule`]. At least one identifier must be set.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = molecule)]
pub struct NewMolecule<'a> {
    /// PubChem compound id.
    pub pubchem_id: Option<i64>,
    /// FooDB public compound id.
    pub foodb_id: Option<&'a str>,
}

/// A row in [`crate::schema::occurrence`].
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = occurrence, check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(belongs_to(Ingredient, foreign_key = ingredient_id))]
#[diesel(belongs_to(Molecule, foreign_key = molecule_id))]
pub struct Occurrence {
    /// Database primary key.
    pub id: i32,
    /// FK to [`Ingredient::id`].
    pub ingredient_id: i32,
    /// FK to [`Molecule::id`].
    pub molecule_id: i32,
    /// FlavorDB lists the molecule for this ingredient.
    pub flavordb_found: bool,
    /// Sum of FooDB content samples (mg/100g).
    pub foodb_content_sum: f64,
    /// Number of samples in `foodb_content_sum`.
    pub foodb_content_sample_count: i32,
}

/// Insertable form of [`Occurrence`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = occurrence)]
pub struct NewOccurrence {
    /// FK to [`Ingredient::id`].
    pub ingredient_id: i32,
    /// FK to [`Molecule::id`].
    pub molecule_id: i32,
    /// FlavorDB presence flag.
    pub flavordb_found: bool,
    /// Initial content sum.
    pub foodb_content_sum: f64,
    /// Initial sample count.
    pub foodb_content_sample_count: i32,
}
