use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;

/// Scores at or above this are hot leads
pub const HOT_THRESHOLD: u8 = 70;
/// Scores at or above this are warm leads
pub const WARM_THRESHOLD: u8 = 40;

/// Lead temperature. Declaration order is the sort ordinal.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LeadLevel {
    #[default]
    Desconhecido,
    Frio,
    Morno,
    Quente,
}

impl LeadLevel {
    pub const ALL: [LeadLevel; 4] = [
        LeadLevel::Desconhecido,
        LeadLevel::Frio,
        LeadLevel::Morno,
        LeadLevel::Quente,
    ];

    pub fn ordinal(self) -> u8 {
        match self {
            LeadLevel::Desconhecido => 0,
            LeadLevel::Frio => 1,
            LeadLevel::Morno => 2,
            LeadLevel::Quente => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LeadLevel::Desconhecido => "desconhecido",
            LeadLevel::Frio => "frio",
            LeadLevel::Morno => "morno",
            LeadLevel::Quente => "quente",
        }
    }

    pub fn is_known(self) -> bool {
        self != LeadLevel::Desconhecido
    }

    pub fn from_score(score: u8) -> Self {
        if score >= HOT_THRESHOLD {
            LeadLevel::Quente
        } else if score >= WARM_THRESHOLD {
            LeadLevel::Morno
        } else if score > 0 {
            LeadLevel::Frio
        } else {
            LeadLevel::Desconhecido
        }
    }

    /// Score reported when the level comes from a label rather than a number
    pub fn representative_score(self) -> u8 {
        match self {
            LeadLevel::Desconhecido => 0,
            LeadLevel::Frio => 20,
            LeadLevel::Morno => 55,
            LeadLevel::Quente => 85,
        }
    }
}

impl fmt::Display for LeadLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadLevel {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "desconhecido" => Ok(LeadLevel::Desconhecido),
            "frio" => Ok(LeadLevel::Frio),
            "morno" => Ok(LeadLevel::Morno),
            "quente" => Ok(LeadLevel::Quente),
            other => Err(SchemaError::invalid(
                "lead_level",
                format!("unknown level {:?}", other),
            )),
        }
    }
}

/// Which signal produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Override,
    Backend,
    Stage,
    Heuristic,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadClassification {
    pub level: LeadLevel,
    pub score: u8,
    pub source: LeadSource,
}

impl LeadClassification {
    pub fn new(level: LeadLevel, score: u8, source: LeadSource) -> Self {
        Self {
            level,
            score: score.min(100),
            source,
        }
    }

    pub fn unknown() -> Self {
        Self::new(LeadLevel::Desconhecido, 0, LeadSource::None)
    }

    /// Classification derived from a label only
    pub fn from_level(level: LeadLevel, source: LeadSource) -> Self {
        Self::new(level, level.representative_score(), source)
    }

    /// Classification derived from a 0..=100 score
    pub fn from_score(score: u8, source: LeadSource) -> Self {
        let score = score.min(100);
        Self::new(LeadLevel::from_score(score), score, source)
    }
}

impl Default for LeadClassification {
    fn default() -> Self {
        Self::unknown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_order() {
        assert!(LeadLevel::Frio < LeadLevel::Morno);
        assert!(LeadLevel::Morno < LeadLevel::Quente);
        assert!(LeadLevel::Desconhecido < LeadLevel::Frio);
    }

    #[test]
    fn test_from_score_thresholds() {
        assert_eq!(LeadLevel::from_score(0), LeadLevel::Desconhecido);
        assert_eq!(LeadLevel::from_score(1), LeadLevel::Frio);
        assert_eq!(LeadLevel::from_score(39), LeadLevel::Frio);
        assert_eq!(LeadLevel::from_score(40), LeadLevel::Morno);
        assert_eq!(LeadLevel::from_score(69), LeadLevel::Morno);
        assert_eq!(LeadLevel::from_score(70), LeadLevel::Quente);
        assert_eq!(LeadLevel::from_score(100), LeadLevel::Quente);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(" Quente ".parse::<LeadLevel>().unwrap(), LeadLevel::Quente);
        assert!("tepido".parse::<LeadLevel>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&LeadLevel::Morno).unwrap();
        assert_eq!(json, "\"morno\"");
    }
}
