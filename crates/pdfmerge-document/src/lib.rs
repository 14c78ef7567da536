// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdfmerge-document — Document processing for the pdfmerge pipeline.
//
// Classifies sources (PDF or raster image) by content, converts images into
// single-page PDFs, and merges the results into one PDF/A-1b document with a
// consistent document-info dictionary and XMP packet.

pub mod classify;
pub mod image;
pub mod metadata;
pub mod normalize;
pub mod pdf;

use pdfmerge_core::{MergeConfig, MergeError, MergedDocument, NormalizedPdf, SourceItem};

// Re-export the primary structs so callers can use `pdfmerge_document::MergeEngine` etc.
pub use classify::{ClassifiedSource, classify, classify_source};
pub use metadata::{ClassicInfo, MergeMetadata, MetadataBuilder, XmpPacket};
pub use normalize::{SkippedSource, SourceNormalizer};
pub use pdf::merge::MergeEngine;
pub use pdf::reader::PdfReader;
pub use pdf::writer::ImageToPdfConverter;

/// Normalise `sources` on the configured paper size, dropping failures.
pub fn normalize_sources(sources: Vec<SourceItem>, config: &MergeConfig) -> Vec<NormalizedPdf> {
    SourceNormalizer::new(config.paper_size).normalize(sources)
}

/// Merge normalised PDFs under the configured metadata, stamped now.
pub fn merge(
    sources: Vec<NormalizedPdf>,
    config: &MergeConfig,
) -> Result<MergedDocument, MergeError> {
    MergeEngine::from_config(config).merge(sources)
}
