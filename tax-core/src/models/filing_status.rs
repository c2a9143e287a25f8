use std::fmt;

use serde::{Deserialize, Serialize};

/// The four filing categories that select a bracket table and a standard
/// deduction.
///
/// Serialized keys match the reference-data documents (`single`,
/// `marriedJoint`, `marriedSeparate`, `headOfHousehold`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum FilingStatus {
    #[default]
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
}

impl FilingStatus {
    pub fn all() -> &'static [FilingStatus] {
        &[
            FilingStatus::Single,
            FilingStatus::MarriedJoint,
            FilingStatus::MarriedSeparate,
            FilingStatus::HeadOfHousehold,
        ]
    }

    /// Key used in reference-data documents and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::MarriedJoint => "marriedJoint",
            Self::MarriedSeparate => "marriedSeparate",
            Self::HeadOfHousehold => "headOfHousehold",
        }
    }

    /// Accepts the document keys (case-insensitive) or the short IRS codes.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .or_else(|| match s.to_ascii_uppercase().as_str() {
                "S" => Some(Self::Single),
                "MFJ" => Some(Self::MarriedJoint),
                "MFS" => Some(Self::MarriedSeparate),
                "HOH" => Some(Self::HeadOfHousehold),
                _ => None,
            })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::MarriedJoint => "Married Filing Jointly",
            Self::MarriedSeparate => "Married Filing Separately",
            Self::HeadOfHousehold => "Head of Household",
        }
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
