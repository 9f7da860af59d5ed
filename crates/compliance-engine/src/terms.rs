//! Compliance word list loading
//!
//! The list is a CSV table with a header row. Two columns are used: the word
//! (default header `Name`) and its risk rating (default header `Risk Rating`).
//! Rows missing either value are dropped before they reach the matcher; order
//! and duplicates are preserved.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use shared_types::Term;
use tracing::{debug, info};

use crate::error::ComplianceError;

/// Column names used to locate terms in the CSV header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermListConfig {
    pub word_column: String,
    pub risk_column: String,
}

impl Default for TermListConfig {
    fn default() -> Self {
        Self {
            word_column: "Name".to_string(),
            risk_column: "Risk Rating".to_string(),
        }
    }
}

/// Ordered list of compliance terms for one analysis run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TermList {
    terms: Vec<Term>,
}

impl TermList {
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms }
    }

    /// Load a term list from a CSV file on disk
    pub fn from_path(
        path: impl AsRef<Path>,
        config: &TermListConfig,
    ) -> Result<Self, ComplianceError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let file = File::open(path).map_err(|e| ComplianceError::invalid_term_list(&origin, e))?;

        let list = Self::read_csv(file, &origin, config)?;
        info!("Loaded {} compliance terms from {}", list.len(), origin);
        Ok(list)
    }

    /// Load a term list from any CSV byte source
    pub fn from_reader<R: Read>(reader: R, config: &TermListConfig) -> Result<Self, ComplianceError> {
        Self::read_csv(reader, "<reader>", config)
    }

    fn read_csv<R: Read>(
        reader: R,
        origin: &str,
        config: &TermListConfig,
    ) -> Result<Self, ComplianceError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| ComplianceError::invalid_term_list(origin, e))?
            .clone();

        let column = |name: &str| -> Result<usize, ComplianceError> {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
                .ok_or_else(|| {
                    ComplianceError::invalid_term_list(
                        origin,
                        format!("missing required column '{}'", name),
                    )
                })
        };
        let word_idx = column(&config.word_column)?;
        let risk_idx = column(&config.risk_column)?;

        let mut terms = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let row = result.map_err(|e| {
                ComplianceError::invalid_term_list(origin, format!("row {}: {}", idx + 1, e))
            })?;

            let word = row.get(word_idx).map(str::trim).unwrap_or_default();
            let risk = row.get(risk_idx).map(str::trim).unwrap_or_default();
            if word.is_empty() || risk.is_empty() {
                debug!("Dropping incomplete term row {} in {}", idx + 1, origin);
                continue;
            }

            terms.push(Term::new(word, risk));
        }

        Ok(Self { terms })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Term> {
        self.terms.iter()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn as_slice(&self) -> &[Term] {
        &self.terms
    }
}

impl From<Vec<Term>> for TermList {
    fn from(terms: Vec<Term>) -> Self {
        Self::new(terms)
    }
}

impl FromIterator<Term> for TermList {
    fn from_iter<I: IntoIterator<Item = Term>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TermList {
    type Item = &'a Term;
    type IntoIter = std::slice::Iter<'a, Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}
