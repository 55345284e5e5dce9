pub mod fills;
pub mod market;
pub mod snapshot;

pub use fills::ingest_fills;
pub use market::ingest_market_info;
pub use snapshot::{ingest_clearinghouse, summarize_account};

use std::fmt;

/// What happened to the records of one ingestion batch. A malformed record
/// never fails the batch: it is either skipped with a reason or parsed with
/// individual fields defaulted to zero, and both outcomes are reported here
/// rather than swallowed.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub parsed: usize,
    pub skipped: Vec<SkippedRecord>,
    pub defaulted: Vec<DefaultedField>,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.defaulted.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Coin if the record could be identified that far.
    pub coin: Option<String>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyRecord,
    MissingCoin,
    ZeroSize,
    MissingFillId,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyRecord => write!(f, "empty record"),
            SkipReason::MissingCoin => write!(f, "missing coin"),
            SkipReason::ZeroSize => write!(f, "zero net size"),
            SkipReason::MissingFillId => write!(f, "missing fill id"),
        }
    }
}

/// A numeric field that failed safe conversion and was defaulted to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultedField {
    pub coin: String,
    pub field: &'static str,
}
