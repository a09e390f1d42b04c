//! Blood type enumeration.
//!
//! # Responsibility
//! - Define the eight ABO/Rh blood groups.
//! - Keep the storage form (symbolic name) apart from the display form (glyph).
//!
//! # Invariants
//! - `from_db_name(as_db_name(x)) == Some(x)` for every variant.
//! - Display symbols are never written to storage.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// ABO group combined with Rh sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BloodType {
    APos,
    ANeg,
    BPos,
    BNeg,
    AbPos,
    AbNeg,
    OPos,
    ONeg,
}

impl BloodType {
    /// Every variant, in declaration order.
    pub const ALL: [BloodType; 8] = [
        BloodType::APos,
        BloodType::ANeg,
        BloodType::BPos,
        BloodType::BNeg,
        BloodType::AbPos,
        BloodType::AbNeg,
        BloodType::OPos,
        BloodType::ONeg,
    ];

    /// Symbolic name persisted in `historia_clinica.grupo_sanguineo`.
    pub fn as_db_name(self) -> &'static str {
        match self {
            Self::APos => "A_POS",
            Self::ANeg => "A_NEG",
            Self::BPos => "B_POS",
            Self::BNeg => "B_NEG",
            Self::AbPos => "AB_POS",
            Self::AbNeg => "AB_NEG",
            Self::OPos => "O_POS",
            Self::ONeg => "O_NEG",
        }
    }

    /// Exact inverse of [`BloodType::as_db_name`].
    ///
    /// Matching is case-sensitive; anything else returns `None`.
    pub fn from_db_name(value: &str) -> Option<Self> {
        match value {
            "A_POS" => Some(Self::APos),
            "A_NEG" => Some(Self::ANeg),
            "B_POS" => Some(Self::BPos),
            "B_NEG" => Some(Self::BNeg),
            "AB_POS" => Some(Self::AbPos),
            "AB_NEG" => Some(Self::AbNeg),
            "O_POS" => Some(Self::OPos),
            "O_NEG" => Some(Self::ONeg),
            _ => None,
        }
    }

    /// Short human-facing glyph, e.g. `AB-`.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::APos => "A+",
            Self::ANeg => "A-",
            Self::BPos => "B+",
            Self::BNeg => "B-",
            Self::AbPos => "AB+",
            Self::AbNeg => "AB-",
            Self::OPos => "O+",
            Self::ONeg => "O-",
        }
    }
}

impl Display for BloodType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}
