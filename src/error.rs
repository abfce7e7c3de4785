//! Error types for the minimizer index and path-cover constructor.

use thiserror::Error;

/// Errors produced by this crate's fallible entry points.
///
/// Invalid DNA bases encountered while enumerating minimizers are *not*
/// represented here: they silently reset the kmer accumulator, per the
/// minimizer enumeration algorithm, and never surface as an error.
#[derive(Debug, Error)]
pub enum GraphIndexError {
    /// A constructor argument was out of range, e.g. `k == 0`, `k` larger
    /// than the packed-key width, `w == 0`, a path-cover window shorter
    /// than [`crate::path_cover::PATH_COVER_MIN_K`], or a graph whose
    /// minimum node id is less than 1.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The byte stream being deserialized did not start with the expected
    /// magic number and version, or was truncated mid-record.
    #[error("format error: {0}")]
    FormatError(String),

    /// The underlying byte sink failed during `serialize`/`deserialize`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GraphIndexError>;
