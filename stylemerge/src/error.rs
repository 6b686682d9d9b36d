//! Error taxonomy of the style-merging engine
//!
//! Per-file errors ([`Error::UnsupportedFormat`], [`Error::Parse`]) never
//! abort a batch. Everything else is fatal for a single `process` call.

use crate::model::{ElementKind, SourceType};
use thiserror::Error;

/// Errors raised while decoding one input document
#[derive(Error, Debug)]
pub enum ParseError {
    /// The container is not a readable ZIP archive
    #[error("not a readable archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Reading an archive entry failed
    #[error("I/O error while reading archive: {0}")]
    Io(#[from] std::io::Error),

    /// A part the document cannot be read without is absent
    #[error("missing required part '{0}'")]
    MissingPart(String),

    /// An XML part is not UTF-8
    #[error("part '{part}' is not valid UTF-8")]
    Encoding {
        /// Name of the offending part
        part: String,
    },

    /// An XML part is not well-formed
    #[error("malformed XML in '{part}': {message}")]
    Xml {
        /// Name of the offending part
        part: String,
        /// Parser diagnostic
        message: String,
    },
}

/// Precondition failures of a merge invocation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// No document is marked as style authority
    #[error("no main document has been selected")]
    NoMainDocument,

    /// The style authority is not a container document
    #[error("main document '{name}' is {source_type}; only DOCX documents can provide styles")]
    InvalidMainDocument {
        /// Name of the main document
        name: String,
        /// Its source type
        source_type: SourceType,
    },

    /// Nothing to merge into the main document
    #[error("there are no documents to merge into the main document")]
    NoMergeableDocuments,
}

/// Failures while rebuilding an output archive
#[derive(Error, Debug)]
pub enum PackagingError {
    /// The style authority carries no container parts
    #[error("style authority '{0}' has no container parts to copy")]
    NotAContainer(String),

    /// A part of the style authority could not be spliced
    #[error("cannot update '{part}': {reason}")]
    Malformed {
        /// Name of the part
        part: String,
        /// What was missing
        reason: String,
    },

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error while writing the archive
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level engine error
#[derive(Error, Debug)]
pub enum Error {
    /// The input format is recognized as unsupported (per file)
    #[error("unsupported format: {0}")]
    UnsupportedFormat(SourceType),

    /// The input could not be decoded (per file)
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Merge preconditions failed (fatal)
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// An element kind resolved to no usable style (fatal, invariant violation)
    #[error("no usable style for {kind}")]
    StyleResolution {
        /// Kind that failed to resolve
        kind: ElementKind,
    },

    /// Output archive could not be produced (fatal)
    #[error("packaging failed: {0}")]
    Packaging(#[from] PackagingError),
}

impl Error {
    /// Whether the error aborts a `process` call rather than a single file
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::UnsupportedFormat(_) | Error::Parse(_))
    }
}

/// Result alias used across the engine
pub type Result<T, E = Error> = std::result::Result<T, E>;
