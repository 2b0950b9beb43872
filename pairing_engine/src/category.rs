//! Canonical ingredient categories and the upstream remapping tables.
//!
//! [`Category`] is the closed taxonomy stored in `ingredient.category`. Two
//! immutable lookup tables translate upstream values into it:
//! - [`remap_flavordb`]: FlavorDB still ships some categories under two
//!   spellings; known aliases are folded onto the canonical code.
//! - [`from_foodb_group`]: FooDB classifies foods by `(food_group, food_subgroup)`.
//!
//! Some categories (`aquatic`, `nutseed`) are presentational parents with no
//! upstream data of their own. They still exist so shelves can be grouped.

use std::{collections::HashMap, fmt, str::FromStr};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

macro_rules! categories {
    ($($variant:ident => ($code:literal, $label:literal),)+) => {
        /// Closed ingredient taxonomy.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Category {
            $(
                #[doc = $label]
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl Category {
            /// Every category, in declaration order.
            pub const ALL: &'static [Category] = &[$(Category::$variant,)+];

            /// Stored code, e.g. `"fruit-citrus"`.
            pub const fn code(self) -> &'static str {
                match self {
                    $(Category::$variant => $code,)+
                }
            }

            /// Human-readable label, e.g. `"Citrus"`.
            pub const fn label(self) -> &'static str {
                match self {
                    $(Category::$variant => $label,)+
                }
            }
        }

        impl FromStr for Category {
            type Err = UnknownCategory;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok(Category::$variant),)+
                    _ => Err(UnknownCategory(s.to_string())),
                }
            }
        }
    };
}

categories! {
    Uncategorized => ("uncategorized", "Uncategorized"),
    Additive => ("additive", "Additive"),
    AnimalProduct => ("animalproduct", "Animal products"),
    Bakery => ("bakery", "Bakery"),
    BakeryCandies => ("bakery-candies", "Candies"),
    Beverage => ("beverage", "Beverages"),
    BeverageAlcoholic => ("beverage-alcoholic", "Alcohol"),
    BeverageCaffeinated => ("beverage-caffeinated", "Caffeine"),
    Cereals => ("cerealcrop", "Cereals"),
    CerealsCereal => ("cerealcrop-cereal", "Cereal"),
    CerealsMaize => ("cerealcrop-maize", "Maize"),
    Dairy => ("dairy", "Dairy"),
    Dish => ("dish", "Dishes"),
    EssentialOil => ("essentialoil", "Essential oils"),
    Aquatic => ("aquatic", "Aquatic"),
    AquaticFish => ("aquatic-fish", "Fish"),
    AquaticSeafood => ("aquatic-seafood", "Seafood"),
    AquaticSeaweed => ("aquatic-seaweed", "Seaweed"),
    Flower => ("flower", "Flowers"),
    Fruit => ("fruit", "Fruit"),
    FruitBerry => ("fruit-berry", "Berries"),
    FruitCitrus => ("fruit-citrus", "Citrus"),
    FruitEssence => ("fruit-essence", "Fruit essences"),
    Fungus => ("fungus", "Fungi"),
    Herb => ("herb", "Herbs"),
    Meat => ("meat", "Meat"),
    Nutseed => ("nutseed", "Nuts & seeds"),
    NutseedLegume => ("nutseed-legume", "Legumes"),
    NutseedNut => ("nutseed-nut", "Nuts"),
    NutseedSeed => ("nutseed-seed", "Seeds"),
    Plant => ("plant", "Plants"),
    PlantDerivative => ("plant-derivative", "Plant derivatives"),
    Spice => ("spice", "Spices"),
    Vegetable => ("vegetable", "Vegetables"),
    VegetableCabbage => ("vegetable-cabbage", "Cabbage"),
    VegetableFruit => ("vegetable-fruit", "Vegetable Fruit"),
    VegetableGourd => ("vegetable-gourd", "Gourds"),
    VegetableRoot => ("vegetable-root", "Root Vegetables"),
    VegetableStem => ("vegetable-stem", "Vegetable Stems"),
    VegetableTuber => ("vegetable-tuber", "Tuber Vegetables"),
}

impl Default for Category {
    fn default() -> Self {
        Category::Uncategorized
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A category string outside the closed taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category {0:?}")]
pub struct UnknownCategory(pub String);

static FLAVORDB_CATEGORY_MAPPINGS: Lazy<HashMap<&'static str, Category>> = Lazy::new(|| {
    HashMap::from([
        ("cereal", Category::CerealsCereal),
        ("seed", Category::NutseedSeed),
        ("Plant", Category::Plant),
        ("Vegetable", Category::Vegetable),
        ("fishseafood-fish", Category::AquaticFish),
        ("fishseafood-seafood", Category::AquaticSeafood),
        ("cerealcrop", Category::Cereals),
        ("cerealcrop-cereal", Category::CerealsCereal),
        ("cerealcrop-maize", Category::CerealsMaize),
        ("plantderivative", Category::PlantDerivative),
    ])
});

static FOODB_GROUP_MAPPINGS: Lazy<HashMap<(&'static str, &'static str), Category>> =
    Lazy::new(|| {
        use Category::*;
        HashMap::from([
            (("Animal foods", "Caprae"), Meat),
            (("Animal foods", "Poultry"), Meat),
            (("Animal foods", "Swine"), Meat),
            (("Aquatic foods", "Crustaceans"), AquaticSeafood),
            (("Aquatic foods", "Fishes"), AquaticFish),
            (("Aquatic foods", "Mollusks"), AquaticSeafood),
            (("Aquatic foods", "Other aquatic foods"), Aquatic),
            (("Aquatic foods", "Seaweed"), AquaticSeaweed),
            (("Baking goods", "Substitutes"), Additive),
            (("Beverages", "Alcoholic beverages"), BeverageAlcoholic),
            (("Beverages", "Beverages"), Beverage),
            (("Beverages", "Fermented beverages"), BeverageAlcoholic),
            (("Cereals and cereal products", "Cereals"), CerealsCereal),
            (("Cereals and cereal products", "Leavened breads"), Cereals),
            (("Cocoa and cocoa products", "Cocoa products"), PlantDerivative),
            (("Cocoa and cocoa products", "Cocoa"), PlantDerivative),
            (("Coffee and coffee products", "Coffee"), BeverageCaffeinated),
            (("Confectioneries", "Candies"), BakeryCandies),
            (("Eggs", "Eggs"), AnimalProduct),
            (("Fats and oils", "Animal fats"), AnimalProduct),
            (("Fruits", "Berries"), FruitBerry),
            (("Fruits", "Citrus"), FruitCitrus),
            (("Fruits", "Drupes"), Fruit),
            (("Fruits", "Other fruits"), Fruit),
            (("Fruits", "Pomes"), Fruit),
            (("Fruits", "Tropical fruits"), Fruit),
            (("Gourds", "Gourds"), VegetableGourd),
            (("Herbs and Spices", "Herb and spice mixtures"), Additive),
            (("Herbs and Spices", "Herbs"), Herb),
            (("Herbs and Spices", "Oilseed crops"), Flower),
            (("Herbs and Spices", "Spices"), Spice),
            (("Herbs and spices", "Oilseed crops"), Flower),
            (("Milk and milk products", "Fermented milk products"), Dairy),
            (("Milk and milk products", "Other milk products"), Dairy),
            (("Milk and milk products", "Unfermented milks"), Dairy),
            (("Nuts", "Nuts"), NutseedNut),
            (("Pulses", "Beans"), NutseedLegume),
            (("Pulses", "Peas"), NutseedLegume),
            (("Pulses", "Pulses"), NutseedLegume),
            // Only soy sauce lands here.
            (("Soy", "Soy products"), Additive),
            (("Teas", "Teas"), Beverage),
            (("Vegetables", ""), Vegetable),
            (("Vegetables", "Cabbages"), VegetableCabbage),
            (("Vegetables", "Fruit vegetables"), VegetableFruit),
            (("Vegetables", "Leaf vegetables"), Vegetable),
            (("Vegetables", "Mushrooms"), Fungus),
            (("Vegetables", "Onion-family vegetables"), Vegetable),
            (("Vegetables", "Other vegetables"), Vegetable),
            (("Vegetables", "Root vegetables"), VegetableRoot),
            (("Vegetables", "Stalk vegetables"), Vegetable),
        ])
    });

/// Resolves a raw FlavorDB category string.
///
/// Known aliases are remapped first, then the result must be a canonical code.
pub fn remap_flavordb(raw: &str) -> Result<Category, UnknownCategory> {
    match FLAVORDB_CATEGORY_MAPPINGS.get(raw) {
        Some(c) => Ok(*c),
        None => raw.parse(),
    }
}

/// Looks up a FooDB `(food_group, food_subgroup)` pair. A missing subgroup
/// is looked up as the empty string.
pub fn from_foodb_group(group: &str, subgroup: &str) -> Option<Category> {
    FOODB_GROUP_MAPPINGS.get(&(group, subgroup)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_parses_back() {
        for c in Category::ALL {
            assert_eq!(c.code().parse::<Category>(), Ok(*c));
        }
        assert_eq!(Category::ALL.len(), 40);
    }

    #[test]
    fn flavordb_aliases_fold_onto_canonical_codes() {
        assert_eq!(remap_flavordb("cereal"), Ok(Category::CerealsCereal));
        assert_eq!(remap_flavordb("fishseafood-fish"), Ok(Category::AquaticFish));
        assert_eq!(remap_flavordb("Vegetable"), Ok(Category::Vegetable));
        assert_eq!(remap_flavordb("fruit-citrus"), Ok(Category::FruitCitrus));
        assert!(remap_flavordb("Fruit-Citrus").is_err());
    }

    #[test]
    fn foodb_groups_map_exact_pairs_only() {
        assert_eq!(
            from_foodb_group("Vegetables", "Root vegetables"),
            Some(Category::VegetableRoot)
        );
        assert_eq!(from_foodb_group("Vegetables", ""), Some(Category::Vegetable));
        assert_eq!(from_foodb_group("Vegetables", "Tubers"), None);
    }

    #[test]
    fn serde_uses_codes() {
        let json = serde_json::to_string(&Category::NutseedLegume).unwrap();
        assert_eq!(json, "\"nutseed-legume\"");
    }
}
