//! Coffee taste-profile model.
//!
//! A [`TasteProfile`] describes one customizable blend: four 1-5 taste
//! scores plus a roast level and grind type. Two profiles are considered
//! the same blend exactly when every field matches, which is what the
//! derived `PartialEq`/`Eq` give us. Cart merging and saved-profile
//! deduplication both rely on that equality.

use serde::{Deserialize, Serialize};

/// Error returned when a taste score is outside the 1-5 range.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("taste score must be between 1 and 5, got {0}")]
pub struct TasteScoreError(pub u8);

/// A single taste dimension score on the 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TasteScore(u8);

impl TasteScore {
    /// Lowest allowed score.
    pub const MIN: u8 = 1;
    /// Highest allowed score.
    pub const MAX: u8 = 5;

    /// Create a score, validating the 1-5 range.
    ///
    /// # Errors
    ///
    /// Returns [`TasteScoreError`] if `value` is outside 1-5.
    pub const fn new(value: u8) -> Result<Self, TasteScoreError> {
        if value >= Self::MIN && value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(TasteScoreError(value))
        }
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for TasteScore {
    type Error = TasteScoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i16> for TasteScore {
    type Error = TasteScoreError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        let byte = u8::try_from(value).map_err(|_| TasteScoreError(0))?;
        Self::new(byte)
    }
}

impl From<TasteScore> for u8 {
    fn from(score: TasteScore) -> Self {
        score.0
    }
}

impl From<TasteScore> for i16 {
    fn from(score: TasteScore) -> Self {
        Self::from(score.0)
    }
}

impl std::fmt::Display for TasteScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How dark the beans are roasted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoastLevel {
    Light,
    #[default]
    Medium,
    Dark,
}

impl std::fmt::Display for RoastLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Dark => "dark",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for RoastLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "medium" => Ok(Self::Medium),
            "dark" => Ok(Self::Dark),
            _ => Err(format!("unrecognized roast level: {s}")),
        }
    }
}

/// How the beans are ground before shipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GrindType {
    #[default]
    WholeBean,
    Espresso,
    Filter,
    FrenchPress,
}

impl std::fmt::Display for GrindType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::WholeBean => "whole_bean",
            Self::Espresso => "espresso",
            Self::Filter => "filter",
            Self::FrenchPress => "french_press",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for GrindType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whole_bean" => Ok(Self::WholeBean),
            "espresso" => Ok(Self::Espresso),
            "filter" => Ok(Self::Filter),
            "french_press" => Ok(Self::FrenchPress),
            _ => Err(format!("unrecognized grind type: {s}")),
        }
    }
}

/// A complete blend customization.
///
/// Field names serialize in camelCase to match the JSON the mobile and web
/// clients send.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasteProfile {
    pub bitterness: TasteScore,
    pub acidity: TasteScore,
    pub body: TasteScore,
    /// Free-form flavour note, e.g. "fruity" or "chocolatey".
    pub flavour: String,
    pub roast_level: RoastLevel,
    pub grind_type: GrindType,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile(bitterness: u8, flavour: &str) -> TasteProfile {
        TasteProfile {
            bitterness: TasteScore::new(bitterness).unwrap(),
            acidity: TasteScore::new(3).unwrap(),
            body: TasteScore::new(4).unwrap(),
            flavour: flavour.to_owned(),
            roast_level: RoastLevel::Medium,
            grind_type: GrindType::Espresso,
        }
    }

    #[test]
    fn test_score_range() {
        assert!(TasteScore::new(0).is_err());
        assert!(TasteScore::new(1).is_ok());
        assert!(TasteScore::new(5).is_ok());
        assert!(TasteScore::new(6).is_err());
    }

    #[test]
    fn test_score_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<TasteScore>("3").is_ok());
        assert!(serde_json::from_str::<TasteScore>("0").is_err());
        assert!(serde_json::from_str::<TasteScore>("9").is_err());
    }

    #[test]
    fn test_identical_profiles_are_equal() {
        assert_eq!(profile(2, "fruity"), profile(2, "fruity"));
    }

    #[test]
    fn test_any_field_difference_breaks_equality() {
        assert_ne!(profile(2, "fruity"), profile(3, "fruity"));
        assert_ne!(profile(2, "fruity"), profile(2, "nutty"));

        let mut darker = profile(2, "fruity");
        darker.roast_level = RoastLevel::Dark;
        assert_ne!(profile(2, "fruity"), darker);

        let mut ground = profile(2, "fruity");
        ground.grind_type = GrindType::Filter;
        assert_ne!(profile(2, "fruity"), ground);
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let json = serde_json::to_value(profile(2, "fruity")).unwrap();
        assert_eq!(json["bitterness"], 2);
        assert_eq!(json["roastLevel"], "medium");
        assert_eq!(json["grindType"], "espresso");
    }

    #[test]
    fn test_profile_json_roundtrip() {
        let original = profile(5, "smoky");
        let json = serde_json::to_string(&original).unwrap();
        let parsed: TasteProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_roast_and_grind_text_roundtrip() {
        for roast in [RoastLevel::Light, RoastLevel::Medium, RoastLevel::Dark] {
            let parsed: RoastLevel = roast.to_string().parse().unwrap();
            assert_eq!(parsed, roast);
        }
        for grind in [
            GrindType::WholeBean,
            GrindType::Espresso,
            GrindType::Filter,
            GrindType::FrenchPress,
        ] {
            let parsed: GrindType = grind.to_string().parse().unwrap();
            assert_eq!(parsed, grind);
        }
    }
}
