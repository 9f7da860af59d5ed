//! Compliance word matching for transcripts
//!
//! Flags every occurrence of words from a compliance list in a block of text,
//! case-insensitively, and produces:
//!
//! - one [`MatchRecord`] per term that occurs at least once (report table)
//! - a [`PositionIndex`] with one entry per occurrence (inline highlighting)
//!
//! Matching is plain substring containment. Overlapping occurrences are all
//! reported, and when two terms hit the same offset the later term in list
//! order owns that offset.

pub mod diagnostics;
pub mod error;
pub mod patterns;
pub mod terms;

pub use diagnostics::{DiagnosticSink, TracingSink};
pub use error::{ComplianceError, MalformedTerm};
pub use patterns::{find_all_occurrences, fold_case, FoldedText};
pub use shared_types::{Analysis, MatchRecord, PositionEntry, PositionIndex, RiskLevel, Term};
pub use terms::{TermList, TermListConfig};

use tracing::debug;

/// ComplianceEngine entry point
pub struct ComplianceEngine<S = TracingSink> {
    sink: S,
}

impl ComplianceEngine {
    pub fn new() -> Self {
        Self { sink: TracingSink }
    }
}

impl Default for ComplianceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DiagnosticSink> ComplianceEngine<S> {
    /// Build an engine that reports skipped terms to `sink`
    pub fn with_sink(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Match every term against the transcript.
    ///
    /// Never fails: empty inputs give an empty [`Analysis`], and malformed
    /// terms are skipped and reported to the sink.
    #[tracing::instrument(
        skip_all,
        fields(transcript_len = transcript.len(), term_count = terms.len())
    )]
    pub fn analyze(&self, transcript: &str, terms: &TermList) -> Analysis {
        let mut analysis = Analysis::default();
        let folded = FoldedText::new(transcript);

        for (index, term) in terms.iter().enumerate() {
            if let Err(reason) = validate(term) {
                self.sink.term_skipped(index, term, reason);
                continue;
            }

            let needle = fold_case(&term.word);
            let spans = folded.find_spans(&needle);
            if spans.is_empty() {
                continue;
            }

            analysis.matches.push(MatchRecord {
                word: term.word.clone(),
                risk: term.risk.clone(),
            });

            // Last write wins when terms share an offset
            for (offset, length) in spans {
                analysis.positions.insert(
                    offset,
                    PositionEntry {
                        word: term.word.clone(),
                        risk: term.risk.clone(),
                        length,
                    },
                );
            }
        }

        debug!(
            "Found {} matching terms, {} occurrences",
            analysis.matches.len(),
            analysis.occurrence_count()
        );
        analysis
    }
}

/// Analyze with the default tracing sink
pub fn analyze(transcript: &str, terms: &TermList) -> Analysis {
    ComplianceEngine::new().analyze(transcript, terms)
}

fn validate(term: &Term) -> Result<(), MalformedTerm> {
    if term.word.trim().is_empty() {
        return Err(MalformedTerm::EmptyWord);
    }
    if term.risk.is_blank() {
        return Err(MalformedTerm::MissingRisk);
    }
    Ok(())
}
