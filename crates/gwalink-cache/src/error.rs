//! Cache and ledger errors.

use gwalink_schema::{Keyword, RecordError};
use thiserror::Error;

/// Errors raised by the translation ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Ledger entries are keyed by index; the record has none yet.
    #[error("{keyword} record has no index and cannot be translated")]
    UnindexedRecord { keyword: Keyword },
}

/// One record that failed during bulk hydration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record {position}: {error}")]
pub struct HydrateFailure {
    /// Zero-based position of the record in the input.
    pub position: usize,
    #[source]
    pub error: RecordError,
}
