pub mod types;

pub use types::{Analysis, MatchRecord, PositionEntry, PositionIndex, RiskLevel, Term};
