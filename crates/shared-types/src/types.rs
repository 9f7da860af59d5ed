use std::collections::BTreeMap;
use std::fmt;

/// Opaque risk label attached to a compliance term ("Low", "High", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RiskLevel(String);

impl RiskLevel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the label carries no usable text
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RiskLevel {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for RiskLevel {
    fn from(label: String) -> Self {
        Self(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Term {
    pub word: String, // Original casing from the word list
    pub risk: RiskLevel,
}

impl Term {
    pub fn new(word: impl Into<String>, risk: impl Into<RiskLevel>) -> Self {
        Self {
            word: word.into(),
            risk: risk.into(),
        }
    }
}

/// One per matching term, not per occurrence
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MatchRecord {
    pub word: String,
    pub risk: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PositionEntry {
    pub word: String,
    pub risk: RiskLevel,
    pub length: usize, // Byte length of the matched span
}

/// Byte offset of each occurrence start -> annotation used for highlighting
pub type PositionIndex = BTreeMap<usize, PositionEntry>;

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Analysis {
    pub matches: Vec<MatchRecord>,
    pub positions: PositionIndex,
}

impl Analysis {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.positions.is_empty()
    }

    /// Total number of highlighted occurrences
    pub fn occurrence_count(&self) -> usize {
        self.positions.len()
    }
}
