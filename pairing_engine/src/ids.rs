//! Validated upstream identifiers.
//!
//! FooDB public ids are bit-exact contracts (`FOOD` + 5 digits for foods,
//! `FDB` + 6 digits for compounds). The newtypes here can only be built
//! through validation, so a malformed id never reaches the store.
//!
//! ```
//! use pairing_engine::ids::{FoodbFoodId, FoodbCompoundId};
//!
//! let food: FoodbFoodId = "FOOD00042".parse().unwrap();
//! assert_eq!(food.as_str(), "FOOD00042");
//! assert!("FDB12345".parse::<FoodbCompoundId>().is_err());
//! ```

use std::{fmt, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;

static FOOD_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^FOOD[0-9]{5}$").expect("valid food id regex"));
static COMPOUND_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^FDB[0-9]{6}$").expect("valid compound id regex"));

/// Identifier validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// Not of the form `FOOD#####`.
    #[error("invalid FooDB food id {0:?} (expected FOOD + 5 digits)")]
    Food(String),
    /// Not of the form `FDB######`.
    #[error("invalid FooDB compound id {0:?} (expected FDB + 6 digits)")]
    Compound(String),
    /// Negative PubChem id.
    #[error("invalid PubChem id {0} (must be non-negative)")]
    Pubchem(i64),
}

macro_rules! validated_id {
    ($(#[$meta:meta])* $name:ident, $re:ident, $err:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// The validated identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = IdError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if $re.is_match(s) {
                    Ok(Self(s.to_string()))
                } else {
                    Err(IdError::$err(s.to_string()))
                }
            }
        }

        impl TryFrom<&str> for $name {
            type Error = IdError;
            fn try_from(s: &str) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

validated_id!(
    /// FooDB public food id, e.g. `FOOD00001`.
    FoodbFoodId,
    FOOD_ID_RE,
    Food
);

validated_id!(
    /// FooDB public compound id, e.g. `FDB000004`.
    FoodbCompoundId,
    COMPOUND_ID_RE,
    Compound
);

/// Checks a PubChem compound id.
pub fn validate_pubchem(id: i64) -> Result<i64, IdError> {
    if id < 0 {
        Err(IdError::Pubchem(id))
    } else {
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn food_ids_need_exactly_five_digits() {
        assert!("FOOD00001".parse::<FoodbFoodId>().is_ok());
        assert!("FOOD0001".parse::<FoodbFoodId>().is_err());
        assert!("FOOD000001".parse::<FoodbFoodId>().is_err());
        assert!("food00001".parse::<FoodbFoodId>().is_err());
        assert!(" FOOD00001".parse::<FoodbFoodId>().is_err());
        assert!("".parse::<FoodbFoodId>().is_err());
    }

    #[test]
    fn compound_ids_need_exactly_six_digits() {
        assert!("FDB000004".parse::<FoodbCompoundId>().is_ok());
        assert!("FDB00004".parse::<FoodbCompoundId>().is_err());
        assert!("FDB0000040".parse::<FoodbCompoundId>().is_err());
        assert!("FDBX00004".parse::<FoodbCompoundId>().is_err());
    }

    #[test]
    fn error_names_the_offending_value() {
        let err = FoodbCompoundId::try_from("FOOD00001").unwrap_err();
        assert_eq!(err, IdError::Compound("FOOD00001".into()));
        assert!(err.to_string().contains("FDB + 6 digits"));
    }

    #[test]
    fn pubchem_must_be_non_negative() {
        assert_eq!(validate_pubchem(0), Ok(0));
        assert_eq!(validate_pubchem(-3), Err(IdError::Pubchem(-3)));
    }
}
