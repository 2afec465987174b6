//! Error types for doccov-core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using doccov-core's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the coverage engine.
///
/// Only `Validation` ever reaches a caller of
/// [`generate_report`](crate::CoverageAggregator::generate_report); every
/// other kind is absorbed at the stage that produces it and surfaces as a log
/// line plus its effect on the computed percentages.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller-supplied options are unusable (empty include list, threshold
    /// outside `[0, 100]`, malformed glob pattern). Raised before any I/O.
    #[error("invalid options: {0}")]
    Validation(String),

    /// A source-reference path failed the safety check (absolute, parent
    /// traversal, or NUL byte).
    #[error("unsafe source path {path:?}: {reason}")]
    UnsafePath { path: String, reason: &'static str },

    /// A source-reference string has malformed range syntax.
    #[error("malformed source reference {raw:?}: {reason}")]
    InvalidFormat { raw: String, reason: String },

    /// Filesystem traversal failed outright.
    #[error("file discovery failed under {root}: {message}")]
    Scan { root: PathBuf, message: String },

    /// The documentation store could not produce its reference owners.
    #[error("documentation store unavailable: {0}")]
    Store(String),
}
