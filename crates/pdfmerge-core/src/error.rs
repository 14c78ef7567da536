// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Error types for pdfmerge.
//
// Two tiers: a `SourceError` belongs to one input and is recovered locally by
// dropping that input; a `MergeError` aborts the whole merge and no document
// is produced.

use thiserror::Error;

/// Failure to turn one source into a PDF. Recoverable: the source is dropped.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source is empty")]
    Empty,

    #[error("source could not be read: {0}")]
    Unreadable(#[from] std::io::Error),

    #[error("source is neither a PDF nor a recognised image")]
    Unrecognized,

    #[error("image could not be decoded: {0}")]
    ImageDecode(String),

    #[error("image page could not be rendered: {0}")]
    Render(String),
}

/// Failure to build or serialise the document metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("XMP serialisation failed: {0}")]
    Serialization(String),
}

/// Fatal failure of the merge step.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("no documents to merge")]
    NoSources,

    #[error("source document #{index} could not be loaded: {reason}")]
    LoadSource { index: usize, reason: String },

    #[error("source document #{index} is encrypted")]
    EncryptedSource { index: usize },

    #[error("PDF structure error: {0}")]
    Structure(String),

    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("failed to serialise merged PDF: {0}")]
    Serialize(#[from] std::io::Error),
}
