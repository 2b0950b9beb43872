//! FlavorDB entity payload (`entities_json?id=<n>`).

use serde::{Deserialize, Serialize};

/// One food entity as served by FlavorDB.
///
/// Only the fields the reconciliation needs are decoded; the real payload
/// carries many more, which are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FlavorDbEntity {
    /// Upstream category string, e.g. "fruit-citrus" (may be a legacy duplicate).
    pub category: String,
    /// Usually a Wikipedia article URL; anything else is not a title.
    pub entity_alias_url: String,
    /// Main display name.
    pub entity_alias_readable: String,
    /// Comma-joined list of synonyms (may be empty).
    pub entity_alias_synonyms: String,
    /// Molecules FlavorDB records as present in the entity.
    pub molecules: Vec<FlavorDbMolecule>,
}

/// Molecule reference inside a [`FlavorDbEntity`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FlavorDbMolecule {
    /// PubChem compound id; FlavorDB's primary key for molecules.
    pub pubchem_id: i64,
    /// FooDB compound id. Upstream spells the key `fooddb_id`.
    #[serde(rename = "fooddb_id", default)]
    pub foodb_id: Option<String>,
}

impl FlavorDbEntity {
    /// Decode an entity from an already-parsed JSON body.
    pub fn from_json(body: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_misspelled_foodb_key() {
        let entity = FlavorDbEntity::from_json(json!({
            "category": "fruit-citrus",
            "entity_alias_url": "https://en.wikipedia.org/wiki/Lemon",
            "entity_alias_readable": "Lemon",
            "entity_alias_synonyms": "lemons, citron",
            "entity_id": 12,
            "molecules": [
                {"pubchem_id": 440917, "fooddb_id": "FDB001234", "common_name": "limonene"},
                {"pubchem_id": 7, "fooddb_id": null}
            ]
        }))
        .unwrap();

        assert_eq!(entity.molecules.len(), 2);
        assert_eq!(entity.molecules[0].foodb_id.as_deref(), Some("FDB001234"));
        assert_eq!(entity.molecules[1].foodb_id, None);
    }

    #[test]
    fn rejects_non_integer_pubchem_id() {
        let err = FlavorDbEntity::from_json(json!({
            "category": "fruit",
            "entity_alias_url": "",
            "entity_alias_readable": "Apple",
            "entity_alias_synonyms": "",
            "molecules": [{"pubchem_id": "abc", "fooddb_id": ""}]
        }));
        assert!(err.is_err());
    }
}
