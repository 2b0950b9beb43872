//! FooDB JSON dump records (`Food.json`, `Compound.json`, `Content.json`).
//!
//! Each file is newline-delimited JSON, one record per line. Fields that are
//! frequently null upstream are optional here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A line of `Food.json`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FoodRecord {
    /// Internal FooDB row id, referenced by `Content.json`.
    pub id: i64,
    /// Public id, e.g. "FOOD00648".
    pub public_id: String,
    /// English name, e.g. "Garden onion".
    pub name: String,
    /// Coarse group, e.g. "Vegetables".
    #[serde(default)]
    pub food_group: Option<String>,
    /// Finer group, e.g. "Onion-family vegetables".
    #[serde(default)]
    pub food_subgroup: Option<String>,
    /// Wikipedia article title, if known.
    #[serde(default)]
    pub wikipedia_id: Option<String>,
    /// False for generic entries that merely repeat their group name.
    #[serde(default)]
    pub export_to_foodb: Option<bool>,
}

/// A line of `Compound.json`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CompoundRecord {
    /// Internal FooDB row id, referenced by `Content.json`.
    pub id: i64,
    /// Public id, e.g. "FDB012345".
    pub public_id: String,
}

/// A line of `Content.json`: one measured sample.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ContentRecord {
    /// "Compound" or "Nutrient"; only compounds are of interest.
    #[serde(default)]
    pub source_type: Option<String>,
    /// Internal food id.
    #[serde(default)]
    pub food_id: Option<i64>,
    /// Internal compound (or nutrient) id, depending on `source_type`.
    #[serde(default)]
    pub source_id: Option<i64>,
    /// Measured amount in mg/100g. Upstream mixes numbers, numeric strings and nulls.
    #[serde(default)]
    pub orig_content: Option<Value>,
}

impl ContentRecord {
    /// Source type marking compound samples.
    pub const COMPOUND: &'static str = "Compound";

    /// True if this sample measures a compound.
    pub fn is_compound(&self) -> bool {
        self.source_type.as_deref() == Some(Self::COMPOUND)
    }

    /// The sample quantity, if it is present and numeric.
    pub fn quantity(&self) -> Option<f64> {
        let q = match self.orig_content.as_ref()? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        q.is_finite().then_some(q)
    }
}
