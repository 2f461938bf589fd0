// Errors raised while laying out alignment blocks
use thiserror::Error;

/// Errors that can occur while filtering or laying out one group of blocks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Zero-length or inverted coordinate range
    #[error("invalid range {start}-{end} on {query}")]
    InvalidRange { query: String, start: u64, end: u64 },

    /// Query range extends past the end of the query sequence
    #[error("range {start}-{end} exceeds length {len} of {query}")]
    RangeOutOfBounds {
        query: String,
        start: u64,
        end: u64,
        len: u64,
    },

    /// Level ceiling exceeded, usually pathological or corrupt input
    #[error("too many levels for {query} (limit {limit})")]
    TooManyLevels { query: String, limit: usize },

    /// A block was routed to a level it cannot belong to
    #[error("block {start}-{end} on {query} conflicts with level {level}")]
    InconsistentOrientation {
        query: String,
        level: usize,
        start: u64,
        end: u64,
    },
}
