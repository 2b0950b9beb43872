//! Presence scores for occurrences.
//!
//! An occurrence's score is the mean of its FooDB samples when it has any.
//! Otherwise, if FlavorDB lists the molecule, it borrows the median of all
//! positive FooDB-derived scores in the table. Otherwise it is 0.
//!
//! The median is recomputed from the current rows on every query.

use diesel::prelude::*;
use serde::Serialize;

use crate::schema::occurrence;

/// The evidence columns of an occurrence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccurrenceEvidence {
    /// FlavorDB lists the molecule for the ingredient.
    pub flavordb_found: bool,
    /// Sum of FooDB samples.
    pub foodb_content_sum: f64,
    /// Number of FooDB samples.
    pub foodb_content_sample_count: i32,
}

impl OccurrenceEvidence {
    /// Has evidence from either source.
    pub fn is_qualifying(&self) -> bool {
        self.foodb_content_sample_count > 0 || self.flavordb_found
    }

    /// Mean of the FooDB samples, if there are any.
    pub fn foodb_score(&self) -> Option<f64> {
        (self.foodb_content_sample_count > 0)
            .then(|| self.foodb_content_sum / f64::from(self.foodb_content_sample_count))
    }

    /// Presence score given the current FooDB median.
    pub fn score(&self, median: f64) -> f64 {
        match self.foodb_score() {
            Some(score) => score,
            None if self.flavordb_found => median,
            None => 0.0,
        }
    }
}

/// Median of `values`: the mean of the two middle values for an even count,
/// 0 for an empty slice.
pub fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Median of every positive FooDB-derived score currently stored.
pub fn foodb_median(conn: &mut SqliteConnection) -> QueryResult<f64> {
    let rows: Vec<(f64, i32)> = occurrence::table
        .filter(occurrence::foodb_content_sample_count.gt(0))
        .select((
            occurrence::foodb_content_sum,
            occurrence::foodb_content_sample_count,
        ))
        .load(conn)?;

    let mut scores: Vec<f64> = rows
        .into_iter()
        .map(|(sum, count)| sum / f64::from(count))
        .filter(|s| *s > 0.0)
        .collect();
    Ok(median(&mut scores))
}

/// One scored `(ingredient, molecule)` occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredOccurrence {
    /// Ingredient id.
    pub ingredient_id: i32,
    /// Molecule id.
    pub molecule_id: i32,
    /// Presence score.
    pub score: f64,
    /// Has evidence from either source.
    pub qualifying: bool,
}

/// Builder for loading scored occurrences.
///
/// ```no_run
/// # fn run(conn: &mut diesel::SqliteConnection) -> diesel::QueryResult<()> {
/// use pairing_engine::scoring::ScoreQuery;
///
/// let rows = ScoreQuery::new().ingredients(vec![1, 2]).filter_zero(true).load(conn)?;
/// # Ok(()) }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScoreQuery {
    ingredients: Option<Vec<i32>>,
    molecules: Option<Vec<i32>>,
    qualifying_only: bool,
    filter_zero: bool,
}

impl ScoreQuery {
    /// All occurrences, zero scores included.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to these ingredients.
    pub fn ingredients(mut self, ids: Vec<i32>) -> Self {
        self.ingredients = Some(ids);
        self
    }

    /// Restrict to these molecules.
    pub fn molecules(mut self, ids: Vec<i32>) -> Self {
        self.molecules = Some(ids);
        self
    }

    /// Drop rows without evidence from either source.
    pub fn qualifying_only(mut self, yes: bool) -> Self {
        self.qualifying_only = yes;
        self
    }

    /// Drop rows whose score is 0.
    pub fn filter_zero(mut self, yes: bool) -> Self {
        self.filter_zero = yes;
        self
    }

    /// Loads and scores the rows, computing the median first.
    pub fn load(self, conn: &mut SqliteConnection) -> QueryResult<Vec<ScoredOccurrence>> {
        let median = foodb_median(conn)?;
        self.load_with_median(conn, median)
    }

    /// Loads and scores the rows against a known median.
    pub fn load_with_median(
        self,
        conn: &mut SqliteConnection,
        median: f64,
    ) -> QueryResult<Vec<ScoredOccurrence>> {
        let filter_zero = self.filter_zero;
        let mut query = occurrence::table
            .select((
                occurrence::ingredient_id,
                occurrence::molecule_id,
                occurrence::flavordb_found,
                occurrence::foodb_content_sum,
                occurrence::foodb_content_sample_count,
            ))
            .order((occurrence::ingredient_id, occurrence::molecule_id))
            .into_boxed();

        if let Some(ids) = self.ingredients {
            query = query.filter(occurrence::ingredient_id.eq_any(ids));
        }
        if let Some(ids) = self.molecules {
            query = query.filter(occurrence::molecule_id.eq_any(ids));
        }
        if self.qualifying_only {
            query = query.filter(
                occurrence::foodb_content_sample_count
                    .gt(0)
                    .or(occurrence::flavordb_found.eq(true)),
            );
        }

        let rows: Vec<(i32, i32, bool, f64, i32)> = query.load(conn)?;
        Ok(rows
            .into_iter()
            .map(|(ingredient_id, molecule_id, found, sum, count)| {
                let evidence = OccurrenceEvidence {
                    flavordb_found: found,
                    foodb_content_sum: sum,
                    foodb_content_sample_count: count,
                };
                ScoredOccurrence {
                    ingredient_id,
                    molecule_id,
                    score: evidence.score(median),
                    qualifying: evidence.is_qualifying(),
                }
            })
            .filter(|o| !filter_zero || o.score != 0.0)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(found: bool, sum: f64, count: i32) -> OccurrenceEvidence {
        OccurrenceEvidence {
            flavordb_found: found,
            foodb_content_sum: sum,
            foodb_content_sample_count: count,
        }
    }

    #[test]
    fn foodb_samples_win_over_flag() {
        assert_eq!(ev(true, 300.0, 3).score(7.0), 100.0);
        assert_eq!(ev(false, 300.0, 3).score(7.0), 100.0);
    }

    #[test]
    fn flag_only_borrows_median() {
        assert_eq!(ev(true, 0.0, 0).score(7.0), 7.0);
        assert!(ev(true, 0.0, 0).is_qualifying());
    }

    #[test]
    fn no_evidence_scores_zero() {
        let e = ev(false, 0.0, 0);
        assert_eq!(e.score(7.0), 0.0);
        assert!(!e.is_qualifying());
    }

    #[test]
    fn median_of_odd_even_and_empty() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&mut []), 0.0);
    }
}
