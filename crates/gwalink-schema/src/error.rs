//! Record validation errors.

use crate::keyword::Keyword;

/// Reasons a native record is rejected as malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// Keyword text outside the catalogue.
    #[error("unknown keyword: {0}")]
    UnknownKeyword(String),

    /// Indices are positive.
    #[error("{keyword} record has index 0; indices start at 1")]
    ZeroIndex { keyword: Keyword },

    /// A field would break the line-oriented wire format.
    #[error("{keyword} record field {position} contains a tab or line break")]
    InvalidField { keyword: Keyword, position: usize },

    /// Application id with control characters or braces.
    #[error("{keyword} record application id {application_id:?} contains reserved characters")]
    InvalidApplicationId {
        keyword: Keyword,
        application_id: String,
    },

    /// Stream id containing whitespace.
    #[error("{keyword} record stream id {stream_id:?} contains whitespace")]
    InvalidStreamId { keyword: Keyword, stream_id: String },
}
