use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PredictorError;

/// Seat-allocation pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Quota {
    /// Home state
    HS,
    /// Other state
    OS,
    /// All India
    AI,
}

impl Quota {
    pub fn code(&self) -> &'static str {
        match self {
            Quota::HS => "HS",
            Quota::OS => "OS",
            Quota::AI => "AI",
        }
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Quota {
    type Err = PredictorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HS" | "HOME STATE" => Ok(Quota::HS),
            "OS" | "OTHER STATE" => Ok(Quota::OS),
            "AI" | "ALL INDIA" => Ok(Quota::AI),
            other => Err(PredictorError::validation("quota", format!("unknown quota '{}'", other))),
        }
    }
}

/// Seat gender pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Gender {
    GenderNeutral,
    FemaleOnly,
}

impl Gender {
    /// Token as it appears in counselling datasets
    pub fn dataset_label(&self) -> &'static str {
        match self {
            Gender::GenderNeutral => "Gender-Neutral",
            Gender::FemaleOnly => "Female-only (including Supernumerary)",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dataset_label())
    }
}

impl FromStr for Gender {
    type Err = PredictorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let compact: String = lowered.chars().filter(|c| c.is_alphanumeric()).collect();
        if compact == "genderneutral" || compact == "neutral" {
            Ok(Gender::GenderNeutral)
        } else if compact.starts_with("femaleonly") || compact == "female" {
            Ok(Gender::FemaleOnly)
        } else {
            Err(PredictorError::validation("gender", format!("unknown gender pool '{}'", s.trim())))
        }
    }
}

/// Dataset tokens go through `FromStr` so spelling and case match the form parser
fn deserialize_token<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: FromStr<Err = PredictorError>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

impl<'de> Deserialize<'de> for Quota {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_token(deserializer)
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_token(deserializer)
    }
}

/// Counselling allocation round: numbered, or the additional round ("AR")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Round {
    Numbered(u8),
    Additional,
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Round::Numbered(n) => write!(f, "{}", n),
            Round::Additional => f.write_str("AR"),
        }
    }
}

impl FromStr for Round {
    type Err = PredictorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("AR") {
            return Ok(Round::Additional);
        }
        match trimmed.parse::<u8>() {
            Ok(n) if n > 0 => Ok(Round::Numbered(n)),
            _ => Err(PredictorError::validation("round", format!("invalid round '{}'", trimmed))),
        }
    }
}

impl Serialize for Round {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Datasets carry rounds either as numbers or strings
impl<'de> Deserialize<'de> for Round {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RoundValue {
            Int(u8),
            String(String),
        }

        match RoundValue::deserialize(deserializer)? {
            RoundValue::Int(n) if n > 0 => Ok(Round::Numbered(n)),
            RoundValue::Int(n) => Err(Error::custom(format!("Invalid round number: {}", n))),
            RoundValue::String(s) => s.parse().map_err(|_| Error::custom(format!("Invalid round string: {}", s))),
        }
    }
}

/// One historical admission cutoff line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CutoffRecord {
    pub institute: String,
    pub program: String,
    pub quota: Quota,
    /// Seat-type / reservation category code (OPEN, OBC-NCL, EWS, ...)
    pub category: String,
    pub gender: Gender,
    pub opening_rank: u32,
    pub closing_rank: u32,
    pub round: Round,
    pub year: u16,
    pub authority: String,
    #[serde(default)]
    pub state: Option<String>,
}

impl CutoffRecord {
    /// Rank band is well formed: `0 < opening_rank <= closing_rank`
    pub fn has_valid_band(&self) -> bool {
        self.opening_rank > 0 && self.opening_rank <= self.closing_rank
    }

    /// Inclusive band membership
    pub fn admits(&self, rank: u32) -> bool {
        rank >= self.opening_rank && rank <= self.closing_rank
    }

    pub fn display_name(&self) -> String {
        format!("{} / {}", self.institute, self.program)
    }
}

/// Identifies one dataset held by the cutoff store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetKey {
    pub authority: String,
    pub year: u16,
    pub round: Round,
}

impl DatasetKey {
    pub fn new(authority: impl Into<String>, year: u16, round: Round) -> Self {
        Self {
            authority: authority.into(),
            year,
            round,
        }
    }

    /// Authority names compare case-insensitively
    pub fn normalized(&self) -> Self {
        Self {
            authority: self.authority.trim().to_ascii_uppercase(),
            year: self.year,
            round: self.round,
        }
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} round {}", self.authority, self.year, self.round)
    }
}

/// Case-insensitive, whitespace-trimmed token equality
pub fn tokens_equal(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
