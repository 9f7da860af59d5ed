//! Error types for term list loading and term validation

use thiserror::Error;

/// Fatal errors surfaced to the caller
#[derive(Error, Debug)]
pub enum ComplianceError {
    /// The term source could not be read or parsed at all.
    /// Distinct from "no matches": callers must not treat this as an empty result.
    #[error("Invalid term list {origin}: {reason}")]
    InvalidTermList { origin: String, reason: String },
}

impl ComplianceError {
    pub(crate) fn invalid_term_list(origin: &str, reason: impl ToString) -> Self {
        ComplianceError::InvalidTermList {
            origin: origin.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Why a single term was skipped during analysis
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedTerm {
    #[error("word is empty or whitespace-only")]
    EmptyWord,

    #[error("risk rating is missing")]
    MissingRisk,
}
