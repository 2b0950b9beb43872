//! Name normalization for cross-source matching.
//!
//! FooDB foods are matched onto FlavorDB-derived ingredients by their
//! *mangled* name: lower-cased, with every non-word character removed.
//! Mangled names are a matching key only and are never displayed.

use std::collections::{BTreeMap, HashMap};

use diesel::prelude::*;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::schema::ingredient_name;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("valid non-word regex"));

/// Prefixes FooDB puts in front of names FlavorDB lists bare.
const STRIPPED_PREFIXES: [&str; 2] = ["common", "garden"];

/// Lower-case `name` and strip all non-word characters.
pub fn mangle(name: &str) -> String {
    NON_WORD.replace_all(&name.to_lowercase(), "").into_owned()
}

/// Mangled forms to try for a FooDB name, strongest first.
///
/// The first entry is the plain mangled name (with `eggs` corrected to
/// `egg`); fallbacks strip a `common`/`garden` prefix.
pub fn match_candidates(name: &str) -> Vec<String> {
    let mangled = mangle(name);
    let mut out = vec![mangled.clone()];
    for prefix in STRIPPED_PREFIXES {
        if let Some(rest) = mangled.strip_prefix(prefix) {
            if !rest.is_empty() {
                out.push(rest.to_string());
            }
        }
    }
    if mangled == "eggs" {
        out[0] = "egg".to_string();
    }
    out
}

/// Why a FooDB food is not matched against existing ingredients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// "Other alcoholic beverage" and similar catch-alls.
    GenericCatchAll,
    /// Botanical variant (`var.`).
    Variant,
    /// Subspecies (`ssp.`).
    Subspecies,
    /// `export_to_foodb` is not `true`.
    NotExported,
    /// Parenthesized qualifiers are not parsed.
    Parenthesized,
}

/// Applies the skip rules in order; `None` means the food should be matched.
pub fn skip_reason(name: &str, export_to_foodb: Option<bool>) -> Option<SkipReason> {
    let lower = name.to_lowercase();
    if mangle(&lower).starts_with("other") {
        Some(SkipReason::GenericCatchAll)
    } else if lower.contains("var.") {
        Some(SkipReason::Variant)
    } else if lower.contains("ssp.") {
        Some(SkipReason::Subspecies)
    } else if export_to_foodb != Some(true) {
        Some(SkipReason::NotExported)
    } else if lower.contains('(') {
        Some(SkipReason::Parenthesized)
    } else {
        None
    }
}

/// NFC-normalize a trimmed label.
pub fn normalize_label(label: &str) -> String {
    label.trim().nfc().collect()
}

/// Splits `main` plus the comma-joined `synonyms` into NFC labels.
///
/// Order is kept and empty tokens are kept as well, so positions line up
/// with priorities.
pub fn split_entity_names(main: &str, synonyms: &str) -> Vec<String> {
    format!("{main},{synonyms}")
        .split(',')
        .map(normalize_label)
        .collect()
}

/// Drops the first label when it equals the second.
///
/// FlavorDB often repeats the main name as the first synonym. Only that
/// leading pair is checked.
pub fn drop_leading_duplicate(names: &mut Vec<String>) {
    if names.len() >= 2 && names[0] == names[1] {
        names.remove(0);
    }
}

/// `(priority, label)` pairs for an entity: position in the de-duplicated
/// list, empty labels skipped, repeated labels keep their first position.
pub fn prioritized_names(main: &str, synonyms: &str) -> Vec<(i32, String)> {
    let mut names = split_entity_names(main, synonyms);
    drop_leading_duplicate(&mut names);

    // label -> first position, in first-seen order
    let mut first: IndexMap<String, i32> = IndexMap::new();
    for (i, label) in names.into_iter().enumerate() {
        if !label.is_empty() {
            first.entry(label).or_insert(i as i32);
        }
    }
    first.into_iter().map(|(label, i)| (i, label)).collect()
}

/// Snapshot of existing names, keyed by mangled form.
///
/// A mangled form is eligible when it belongs to exactly one ingredient or
/// is a primary (priority 0) name of at least one. For primary names only
/// the ingredients holding it at priority 0 are targets.
#[derive(Debug, Default, Clone)]
pub struct NameIndex {
    // mangled -> ingredient id -> holds it at priority 0
    entries: HashMap<String, BTreeMap<i32, bool>>,
}

impl NameIndex {
    /// Builds the index from `(ingredient_id, priority, label)` rows.
    pub fn build<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (i32, i32, S)>,
        S: AsRef<str>,
    {
        let mut entries: HashMap<String, BTreeMap<i32, bool>> = HashMap::new();
        for (ingredient_id, priority, label) in rows {
            let key = mangle(label.as_ref());
            if key.is_empty() {
                continue;
            }
            let primary = entries.entry(key).or_default().entry(ingredient_id).or_insert(false);
            *primary |= priority == 0;
        }
        Self { entries }
    }

    /// Loads every stored name.
    pub fn load(conn: &mut SqliteConnection) -> QueryResult<Self> {
        let rows: Vec<(i32, i32, String)> = ingredient_name::table
            .select((
                ingredient_name::ingredient_id,
                ingredient_name::priority,
                ingredient_name::label,
            ))
            .load(conn)?;
        Ok(Self::build(rows))
    }

    /// Ingredients a mangled name may be matched onto, or `None` when the
    /// name is unknown or ambiguous.
    pub fn targets(&self, mangled: &str) -> Option<Vec<i32>> {
        let holders = self.entries.get(mangled)?;
        if holders.values().any(|primary| *primary) {
            Some(
                holders
                    .iter()
                    .filter(|(_, primary)| **primary)
                    .map(|(id, _)| *id)
                    .collect(),
            )
        } else if holders.len() == 1 {
            Some(holders.keys().copied().collect())
        } else {
            None
        }
    }

    /// Number of distinct mangled names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no names are indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mangle_strips_case_and_punctuation() {
        assert_eq!(mangle("Garden Onion"), "gardenonion");
        assert_eq!(mangle("  Crème-fraîche, (light)"), "crèmefraîchelight");
        assert_eq!(mangle("snake_case"), "snake_case");
    }

    #[test]
    fn candidates_strip_known_prefixes() {
        assert_eq!(match_candidates("Garden Onion"), vec!["gardenonion", "onion"]);
        assert_eq!(match_candidates("Common Sage"), vec!["commonsage", "sage"]);
        assert_eq!(match_candidates("Eggs"), vec!["egg"]);
        assert_eq!(match_candidates("Garden"), vec!["garden"]);
    }

    #[test]
    fn skip_rules_apply_in_order() {
        assert_eq!(
            skip_reason("Other bread", Some(false)),
            Some(SkipReason::GenericCatchAll)
        );
        assert_eq!(
            skip_reason("Brassica oleracea var. capitata", Some(true)),
            Some(SkipReason::Variant)
        );
        assert_eq!(skip_reason("Prunus ssp.", Some(true)), Some(SkipReason::Subspecies));
        assert_eq!(skip_reason("Fruits", None), Some(SkipReason::NotExported));
        assert_eq!(
            skip_reason("Salt (table)", Some(true)),
            Some(SkipReason::Parenthesized)
        );
        assert_eq!(skip_reason("Garden onion", Some(true)), None);
    }

    #[test]
    fn entity_names_keep_order_and_normalize() {
        // "e" + combining acute composes to a single code point.
        let names = split_entity_names("Cafe\u{301}", " coffee ,, java");
        assert_eq!(names, vec!["Café", "coffee", "", "java"]);
    }

    #[test]
    fn leading_duplicate_is_dropped_once() {
        let mut names = vec!["Lemon".to_string(), "Lemon".to_string(), "Lemon".to_string()];
        drop_leading_duplicate(&mut names);
        assert_eq!(names, vec!["Lemon", "Lemon"]);

        let mut names = vec!["Lemon".to_string(), "Citron".to_string(), "Lemon".to_string()];
        drop_leading_duplicate(&mut names);
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn priorities_follow_positions_after_dedupe() {
        let names = prioritized_names("Lemon", "Lemon, citron,, Citron, citron");
        assert_eq!(
            names,
            vec![
                (0, "Lemon".to_string()),
                (1, "citron".to_string()),
                (3, "Citron".to_string()),
            ]
        );
    }

    #[test]
    fn index_eligibility() {
        let index = NameIndex::build(vec![
            (1, 0, "Onion"),
            (2, 3, "onion"),
            (3, 2, "Scallion"),
            (4, 1, "Scallion"),
            (5, 1, "Leek"),
        ]);
        // Primary name wins over a secondary alias elsewhere.
        assert_eq!(index.targets("onion"), Some(vec![1]));
        // Secondary on two ingredients: ambiguous.
        assert_eq!(index.targets("scallion"), None);
        // Secondary on a single ingredient: unique.
        assert_eq!(index.targets("leek"), Some(vec![5]));
        assert_eq!(index.targets("garlic"), None);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn mangle_is_idempotent(name in "[a-zA-Z0-9 éÉçÇ,.()'_-]{0,24}") {
            let once = mangle(&name);
            prop_assert_eq!(mangle(&once), once.clone());
            prop_assert!(once.chars().all(|c| !c.is_uppercase() && !c.is_whitespace()));
        }

        #[test]
        fn candidates_are_never_empty(name in "[a-zA-Z ]{0,16}") {
            let c = match_candidates(&name);
            prop_assert!(!c.is_empty());
            prop_assert!(c.iter().skip(1).all(|s| !s.is_empty()));
        }
    }
}
