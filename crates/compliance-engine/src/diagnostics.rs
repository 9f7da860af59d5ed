//! Data-quality reporting for the matcher
//!
//! The matcher never logs directly. It reports skipped terms to a
//! [`DiagnosticSink`] handed to [`ComplianceEngine`](crate::ComplianceEngine),
//! and the caller decides where those reports go.

use shared_types::Term;
use tracing::warn;

use crate::error::MalformedTerm;

pub trait DiagnosticSink {
    /// Called once for every term that was skipped; `index` is its position
    /// in the term list.
    fn term_skipped(&self, index: usize, term: &Term, reason: MalformedTerm);
}

/// Default sink: forwards reports to `tracing` at WARN level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn term_skipped(&self, index: usize, term: &Term, reason: MalformedTerm) {
        warn!(
            index,
            word = %term.word,
            risk = %term.risk,
            "Skipping malformed compliance term: {}",
            reason
        );
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn term_skipped(&self, index: usize, term: &Term, reason: MalformedTerm) {
        (**self).term_skipped(index, term, reason)
    }
}
