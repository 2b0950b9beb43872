//! Pairing ranker.
//!
//! Given a selection `S` of ingredients:
//! - **match score**: share of the selection's total presence score that
//!   sits on molecules every selected ingredient has (0–100, 0 when the
//!   selection has no score at all);
//! - **molecule weights**: per molecule, the summed score over `S`
//!   (zero weights dropped), normalized by the largest weight `M`;
//! - **weighted score** of every other ingredient with evidence:
//!   `Σ weight(m) / M` over its qualifying occurrences.
//!
//! Two lists come out of the same weighted scores: *matching* (descending)
//! and *contrasting* (ascending). Ties are broken by ingredient id
//! ascending. Ingredients without a display name are left out.
//!
//! The pure steps ([`match_percentage`], [`molecule_weights`],
//! [`weighted_scores`], [`rank`]) work on loaded [`ScoredOccurrence`] rows;
//! [`suggest_pairings`] wires them to the store.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt,
    str::FromStr,
};

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::library::display_names;
use crate::scoring::{ScoreQuery, ScoredOccurrence};

/// Errors surfaced by the ranking path.
#[derive(Debug, thiserror::Error)]
pub enum RankerError {
    /// No ingredient was selected.
    #[error("selection is empty")]
    EmptySelection,
    /// An id that is not a positive 32-bit integer.
    #[error("invalid ingredient id {0:?}")]
    InvalidIngredientId(String),
    /// Storage failure.
    #[error(transparent)]
    Db(#[from] diesel::result::Error),
    /// No pooled connection available.
    #[error(transparent)]
    Pool(#[from] diesel::r2d2::PoolError),
}

/// A de-duplicated, non-empty set of selected ingredient ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection(BTreeSet<i32>);

impl Selection {
    /// Validates ids: each must be a positive `i32`. Duplicates collapse.
    pub fn new<I>(ids: I) -> Result<Self, RankerError>
    where
        I: IntoIterator<Item = i64>,
    {
        let mut set = BTreeSet::new();
        for id in ids {
            match i32::try_from(id) {
                Ok(v) if v > 0 => {
                    set.insert(v);
                }
                _ => return Err(RankerError::InvalidIngredientId(id.to_string())),
            }
        }
        if set.is_empty() {
            return Err(RankerError::EmptySelection);
        }
        Ok(Self(set))
    }

    /// Parses raw ids as received from a caller.
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Result<Self, RankerError> {
        let ids = raw
            .iter()
            .map(|s| {
                let s = s.as_ref().trim();
                s.parse::<i64>()
                    .map_err(|_| RankerError::InvalidIngredientId(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(ids)
    }

    /// True if `ingredient_id` is selected.
    pub fn contains(&self, ingredient_id: i32) -> bool {
        self.0.contains(&ingredient_id)
    }

    /// Selected ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.iter().copied()
    }

    /// Number of distinct selected ids.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Comma-separated ids, e.g. `"3,1,3"`.
impl FromStr for Selection {
    type Err = RankerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').filter(|p| !p.trim().is_empty()).collect();
        Self::parse(&parts)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.0.iter().map(i32::to_string).collect();
        f.write_str(&ids.join(","))
    }
}

/// Caps on the suggestion lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct RankingLimits {
    /// Length of the matching list.
    pub matching: usize,
    /// Length of the contrasting list.
    pub contrasting: usize,
}

impl Default for RankingLimits {
    fn default() -> Self {
        Self {
            matching: 30,
            contrasting: 10,
        }
    }
}

/// One suggested ingredient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    /// Ingredient id.
    pub ingredient_id: i32,
    /// Primary name.
    pub display_name: String,
    /// Normalized molecular overlap with the selection.
    pub weighted_score: f64,
}

/// Ranker output for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairingResult {
    /// The selection, de-duplicated and sorted.
    pub selection: Vec<i32>,
    /// Match percentage, 0–100.
    pub match_score: f64,
    /// Most similar candidates first.
    pub matching: Vec<Suggestion>,
    /// Least similar candidates first.
    pub contrasting: Vec<Suggestion>,
}

/// Molecules with a qualifying occurrence in every selected ingredient.
pub fn shared_molecules(selection: &Selection, occurrences: &[ScoredOccurrence]) -> BTreeSet<i32> {
    let mut per_ingredient: HashMap<i32, BTreeSet<i32>> = HashMap::new();
    for o in occurrences {
        if o.qualifying && selection.contains(o.ingredient_id) {
            per_ingredient
                .entry(o.ingredient_id)
                .or_default()
                .insert(o.molecule_id);
        }
    }

    let mut shared: Option<BTreeSet<i32>> = None;
    for id in selection.ids() {
        let Some(molecules) = per_ingredient.get(&id) else {
            return BTreeSet::new();
        };
        shared = Some(match shared {
            None => molecules.clone(),
            Some(acc) => acc.intersection(molecules).copied().collect(),
        });
    }
    shared.unwrap_or_default()
}

/// `100 × shared score / total score` over the selection; 0 when the total is 0.
pub fn match_percentage(selection: &Selection, occurrences: &[ScoredOccurrence]) -> f64 {
    let shared = shared_molecules(selection, occurrences);
    let (mut shared_sum, mut total) = (0.0, 0.0);
    for o in occurrences.iter().filter(|o| selection.contains(o.ingredient_id)) {
        total += o.score;
        if shared.contains(&o.molecule_id) {
            shared_sum += o.score;
        }
    }
    if total == 0.0 {
        0.0
    } else {
        100.0 * shared_sum / total
    }
}

/// Per-molecule summed score over the selection, zero sums dropped.
pub fn molecule_weights(selection: &Selection, occurrences: &[ScoredOccurrence]) -> HashMap<i32, f64> {
    let mut weights: HashMap<i32, f64> = HashMap::new();
    for o in occurrences.iter().filter(|o| selection.contains(o.ingredient_id)) {
        *weights.entry(o.molecule_id).or_insert(0.0) += o.score;
    }
    weights.retain(|_, w| *w != 0.0);
    weights
}

/// Weighted score of every unselected ingredient with a qualifying occurrence.
///
/// Molecules without a weight contribute 0, and everything is 0 when no
/// molecule carries a positive weight.
pub fn weighted_scores(
    selection: &Selection,
    occurrences: &[ScoredOccurrence],
    weights: &HashMap<i32, f64>,
) -> BTreeMap<i32, f64> {
    let max = weights.values().copied().fold(0.0_f64, f64::max);
    let mut scores = BTreeMap::new();
    for o in occurrences
        .iter()
        .filter(|o| o.qualifying && !selection.contains(o.ingredient_id))
    {
        let entry = scores.entry(o.ingredient_id).or_insert(0.0);
        if max > 0.0 {
            if let Some(w) = weights.get(&o.molecule_id) {
                *entry += w / max;
            }
        }
    }
    scores
}

fn by_score_then_id(a: &Suggestion, b: &Suggestion) -> Ordering {
    a.weighted_score
        .total_cmp(&b.weighted_score)
        .then(a.ingredient_id.cmp(&b.ingredient_id))
}

/// Builds the capped matching and contrasting lists.
pub fn rank(
    scores: &BTreeMap<i32, f64>,
    names: &HashMap<i32, String>,
    limits: &RankingLimits,
) -> (Vec<Suggestion>, Vec<Suggestion>) {
    let candidates: Vec<Suggestion> = scores
        .iter()
        .filter_map(|(id, score)| {
            names.get(id).map(|name| Suggestion {
                ingredient_id: *id,
                display_name: name.clone(),
                weighted_score: *score,
            })
        })
        .collect();

    let mut matching = candidates.clone();
    matching.sort_by(|a, b| {
        b.weighted_score
            .total_cmp(&a.weighted_score)
            .then(a.ingredient_id.cmp(&b.ingredient_id))
    });
    matching.truncate(limits.matching);

    let mut contrasting = candidates;
    contrasting.sort_by(by_score_then_id);
    contrasting.truncate(limits.contrasting);

    (matching, contrasting)
}

/// Computes the pairing result for `selection` from the current store.
///
/// Reads happen in one transaction so the median, the occurrences and the
/// names come from the same snapshot.
pub fn suggest_pairings(
    conn: &mut SqliteConnection,
    selection: &Selection,
    limits: &RankingLimits,
) -> Result<PairingResult, RankerError> {
    conn.transaction(|conn| {
        let occurrences = ScoreQuery::new().qualifying_only(true).load(conn)?;

        let match_score = match_percentage(selection, &occurrences);
        let weights = molecule_weights(selection, &occurrences);
        let scores = weighted_scores(selection, &occurrences, &weights);

        let candidate_ids: Vec<i32> = scores.keys().copied().collect();
        let names = display_names(conn, &candidate_ids)?;
        let (matching, contrasting) = rank(&scores, &names, limits);

        Ok(PairingResult {
            selection: selection.ids().collect(),
            match_score,
            matching,
            contrasting,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occ(ingredient_id: i32, molecule_id: i32, score: f64) -> ScoredOccurrence {
        ScoredOccurrence {
            ingredient_id,
            molecule_id,
            score,
            qualifying: true,
        }
    }

    #[test]
    fn selection_dedupes_and_validates() {
        let s = Selection::parse(&["3", " 1", "3"]).unwrap();
        assert_eq!(s.ids().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(s.to_string(), "1,3");

        assert!(matches!(
            Selection::parse(&["1", "x"]),
            Err(RankerError::InvalidIngredientId(v)) if v == "x"
        ));
        assert!(matches!(
            Selection::parse(&["0"]),
            Err(RankerError::InvalidIngredientId(_))
        ));
        assert!(matches!(
            Selection::parse(&["4294967297"]),
            Err(RankerError::InvalidIngredientId(_))
        ));
        assert!(matches!(
            Selection::parse::<&str>(&[]),
            Err(RankerError::EmptySelection)
        ));
        assert_eq!("2,5,".parse::<Selection>().unwrap().len(), 2);
    }

    #[test]
    fn shared_molecules_need_every_ingredient() {
        let s = Selection::new([1, 2]).unwrap();
        let rows = [occ(1, 10, 1.0), occ(1, 11, 1.0), occ(2, 10, 1.0)];
        assert_eq!(shared_molecules(&s, &rows), BTreeSet::from([10]));

        let s = Selection::new([1, 3]).unwrap();
        assert!(shared_molecules(&s, &rows).is_empty());
    }

    #[test]
    fn zero_total_gives_zero_match() {
        let s = Selection::new([7]).unwrap();
        assert_eq!(match_percentage(&s, &[]), 0.0);
        assert_eq!(match_percentage(&s, &[occ(7, 1, 0.0)]), 0.0);
    }

    #[test]
    fn zero_weights_are_dropped() {
        let s = Selection::new([1]).unwrap();
        let w = molecule_weights(&s, &[occ(1, 10, 2.0), occ(1, 11, 0.0), occ(2, 12, 5.0)]);
        assert_eq!(w, HashMap::from([(10, 2.0)]));
    }

    #[test]
    fn ties_break_by_id() {
        let scores = BTreeMap::from([(5, 1.0), (3, 1.0), (9, 0.5)]);
        let names: HashMap<i32, String> = [(3, "c"), (5, "e"), (9, "i")]
            .into_iter()
            .map(|(id, n)| (id, n.to_string()))
            .collect();
        let (matching, contrasting) = rank(&scores, &names, &RankingLimits::default());
        let m: Vec<i32> = matching.iter().map(|s| s.ingredient_id).collect();
        let c: Vec<i32> = contrasting.iter().map(|s| s.ingredient_id).collect();
        assert_eq!(m, vec![3, 5, 9]);
        assert_eq!(c, vec![9, 3, 5]);
    }

    #[test]
    fn nameless_candidates_are_omitted_and_lists_capped() {
        let scores = BTreeMap::from([(1, 3.0), (2, 2.0), (3, 1.0), (4, 0.0)]);
        let names: HashMap<i32, String> =
            [(1, "a"), (3, "c"), (4, "d")].into_iter().map(|(i, n)| (i, n.into())).collect();
        let limits = RankingLimits {
            matching: 2,
            contrasting: 1,
        };
        let (matching, contrasting) = rank(&scores, &names, &limits);
        assert_eq!(
            matching.iter().map(|s| s.ingredient_id).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(contrasting[0].ingredient_id, 4);
        assert_eq!(contrasting.len(), 1);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn selected_ingredients_never_suggested(
            rows in proptest::collection::vec((1i32..8, 1i32..6, 0.0f64..50.0), 0..40),
            picked in proptest::collection::btree_set(1i64..8, 1..4),
        ) {
            let occurrences: Vec<ScoredOccurrence> =
                rows.iter().map(|(i, m, s)| occ(*i, *m, *s)).collect();
            let selection = Selection::new(picked).unwrap();
            let weights = molecule_weights(&selection, &occurrences);
            let scores = weighted_scores(&selection, &occurrences, &weights);
            let names: HashMap<i32, String> = (1..8).map(|i| (i, format!("n{i}"))).collect();
            let (matching, contrasting) = rank(&scores, &names, &RankingLimits::default());

            for s in matching.iter().chain(contrasting.iter()) {
                prop_assert!(!selection.contains(s.ingredient_id));
                prop_assert!(s.weighted_score >= 0.0);
            }
            let pct = match_percentage(&selection, &occurrences);
            prop_assert!((0.0..=100.0 + 1e-9).contains(&pct));
        }
    }
}
